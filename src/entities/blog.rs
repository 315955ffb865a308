//! Blog posts, keyed by slug.

use serde::{Deserialize, Serialize};

use crate::crud::{Entity, slugify};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlogPost {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
    pub published: bool,
    pub published_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BlogPostField {
    /// Also rewrites the slug while it still follows the title.
    Title(String),
    Slug(String),
    Excerpt(String),
    Content(String),
    Category(String),
    Tags(Vec<String>),
    CoverImage(Option<String>),
    Published(bool),
}

impl Entity for BlogPost {
    type Key = String;
    type Field = BlogPostField;

    const RESOURCE: &'static str = "blog";
    const LABEL: &'static str = "blog post";

    /// The slug, once there is one.
    fn key(&self) -> Option<String> {
        (!self.slug.is_empty()).then(|| self.slug.clone())
    }

    fn apply(&mut self, field: BlogPostField) {
        match field {
            BlogPostField::Title(title) => {
                if self.slug.is_empty() || self.slug == slugify(&self.title) {
                    self.slug = slugify(&title);
                }
                self.title = title;
            }
            BlogPostField::Slug(v) => self.slug = v,
            BlogPostField::Excerpt(v) => self.excerpt = v,
            BlogPostField::Content(v) => self.content = v,
            BlogPostField::Category(v) => self.category = v,
            BlogPostField::Tags(v) => self.tags = v,
            BlogPostField::CoverImage(v) => self.cover_image = v,
            BlogPostField::Published(v) => self.published = v,
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title);
        errors.max_len("title", &self.title, 160);
        errors.slug("slug", &self.slug);
        errors.max_len("excerpt", &self.excerpt, 300);
        errors.require("content", &self.content);
        errors.optional_url("coverImage", self.cover_image.as_deref());
        errors.into_result()
    }

    fn defaults() -> Vec<Self> {
        vec![
            BlogPost {
                slug: "hello-world".into(),
                title: "Hello World".into(),
                excerpt: "Why this site exists.".into(),
                content: "First post on the new site.".into(),
                category: "general".into(),
                tags: vec!["meta".into()],
                cover_image: None,
                published: true,
                published_at: None,
            },
            BlogPost {
                slug: "lessons-from-a-side-project".into(),
                title: "Lessons From a Side Project".into(),
                excerpt: "Scope, deadlines and shipping.".into(),
                content: "Notes collected while building a small product.".into(),
                category: "engineering".into(),
                tags: Vec::new(),
                cover_image: None,
                published: true,
                published_at: None,
            },
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}
