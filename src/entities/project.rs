//! Portfolio projects.

use serde::{Deserialize, Serialize};

use crate::crud::{Entity, slugify};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
    pub live_url: Option<String>,
    pub github_url: Option<String>,
    pub featured: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectField {
    /// Also rewrites the slug while it still follows the title.
    Title(String),
    Slug(String),
    Description(String),
    Category(String),
    Tags(Vec<String>),
    ImageUrl(Option<String>),
    LiveUrl(Option<String>),
    GithubUrl(Option<String>),
    Featured(bool),
}

impl Entity for Project {
    type Key = i64;
    type Field = ProjectField;

    const RESOURCE: &'static str = "projects";
    const LABEL: &'static str = "project";

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn apply(&mut self, field: ProjectField) {
        match field {
            ProjectField::Title(title) => {
                if self.slug.is_empty() || self.slug == slugify(&self.title) {
                    self.slug = slugify(&title);
                }
                self.title = title;
            }
            ProjectField::Slug(slug) => self.slug = slug,
            ProjectField::Description(v) => self.description = v,
            ProjectField::Category(v) => self.category = v,
            ProjectField::Tags(v) => self.tags = v,
            ProjectField::ImageUrl(v) => self.image_url = v,
            ProjectField::LiveUrl(v) => self.live_url = v,
            ProjectField::GithubUrl(v) => self.github_url = v,
            ProjectField::Featured(v) => self.featured = v,
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title);
        errors.max_len("title", &self.title, 120);
        errors.slug("slug", &self.slug);
        errors.require("description", &self.description);
        errors.require("category", &self.category);
        errors.optional_url("imageUrl", self.image_url.as_deref());
        errors.optional_url("liveUrl", self.live_url.as_deref());
        errors.optional_url("githubUrl", self.github_url.as_deref());
        errors.into_result()
    }

    fn defaults() -> Vec<Self> {
        vec![
            Project {
                id: Some(1),
                title: "Portfolio Website".into(),
                slug: "portfolio-website".into(),
                description: "Personal site with a public showcase and an admin dashboard."
                    .into(),
                category: "web".into(),
                tags: vec!["typescript".into(), "rest".into()],
                image_url: None,
                live_url: None,
                github_url: None,
                featured: true,
            },
            Project {
                id: Some(2),
                title: "Task Tracker API".into(),
                slug: "task-tracker-api".into(),
                description: "REST service for teams tracking tasks and deadlines.".into(),
                category: "backend".into(),
                tags: vec!["rust".into(), "postgres".into()],
                image_url: None,
                live_url: None,
                github_url: None,
                featured: false,
            },
            Project {
                id: Some(3),
                title: "Weather Dashboard".into(),
                slug: "weather-dashboard".into(),
                description: "Forecast charts pulled from a public weather API.".into(),
                category: "web".into(),
                tags: vec!["charts".into()],
                image_url: None,
                live_url: None,
                github_url: None,
                featured: false,
            },
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}
