//! The "about me" record.

use serde::{Deserialize, Serialize};

use crate::crud::Entity;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AboutRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub headline: String,
    pub bio: String,
    pub email: String,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
    pub resume_url: Option<String>,
    pub github_url: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AboutField {
    Name(String),
    Headline(String),
    Bio(String),
    Email(String),
    Location(Option<String>),
    AvatarUrl(Option<String>),
    ResumeUrl(Option<String>),
    GithubUrl(Option<String>),
    LinkedinUrl(Option<String>),
}

impl Entity for AboutRecord {
    type Key = i64;
    type Field = AboutField;

    const RESOURCE: &'static str = "about";
    const LABEL: &'static str = "about record";

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn apply(&mut self, field: AboutField) {
        match field {
            AboutField::Name(v) => self.name = v,
            AboutField::Headline(v) => self.headline = v,
            AboutField::Bio(v) => self.bio = v,
            AboutField::Email(v) => self.email = v,
            AboutField::Location(v) => self.location = v,
            AboutField::AvatarUrl(v) => self.avatar_url = v,
            AboutField::ResumeUrl(v) => self.resume_url = v,
            AboutField::GithubUrl(v) => self.github_url = v,
            AboutField::LinkedinUrl(v) => self.linkedin_url = v,
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.require("bio", &self.bio);
        errors.max_len("headline", &self.headline, 160);
        errors.email("email", &self.email);
        for (field, url) in [
            ("avatarUrl", &self.avatar_url),
            ("resumeUrl", &self.resume_url),
            ("githubUrl", &self.github_url),
            ("linkedinUrl", &self.linkedin_url),
        ] {
            errors.optional_url(field, url.as_deref());
        }
        errors.into_result()
    }

    fn defaults() -> Vec<Self> {
        vec![AboutRecord {
            id: Some(1),
            name: "Site Owner".into(),
            headline: "Software developer".into(),
            bio: "I build web applications and the services behind them.".into(),
            email: "hello@example.com".into(),
            location: None,
            avatar_url: None,
            resume_url: None,
            github_url: None,
            linkedin_url: None,
        }]
    }
}
