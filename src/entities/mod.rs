//! The content types managed through the admin area.

mod about;
mod blog;
mod contact;
mod product;
mod project;
mod skill;
mod theme;

pub use about::{AboutField, AboutRecord};
pub use blog::{BlogPost, BlogPostField};
pub use contact::{ContactMessage, ProductAccessRequest};
pub use product::{Product, ProductField};
pub use project::{Project, ProjectField};
pub use skill::{MAX_LEVEL, Skill, SkillField};
pub use theme::{ThemeController, ThemeField, ThemeSettings};
