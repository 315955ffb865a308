//! Generic CRUD list/form pair, instantiated once per entity type.

mod controller;
mod entity;
mod slug;
mod view;

pub use controller::{
    CrudController, DeleteConfirmation, FallbackPolicy, FormMode, FormState, ListSource,
};
pub use entity::Entity;
pub use slug::slugify;
pub use view::{ALL_CATEGORIES, Page, filter_by_category, paginate};
