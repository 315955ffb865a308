use serde::{Deserialize, Serialize};

use crate::crud::Entity;
use crate::validation::ValidationErrors;

/// Highest proficiency level.
pub const MAX_LEVEL: u8 = 100;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Skill {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub category: String,
    /// 0..=100.
    pub level: u8,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkillField {
    Name(String),
    Category(String),
    Level(u8),
    Icon(Option<String>),
}

impl Entity for Skill {
    type Key = i64;
    type Field = SkillField;

    const RESOURCE: &'static str = "skills";
    const LABEL: &'static str = "skill";

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn apply(&mut self, field: SkillField) {
        match field {
            SkillField::Name(v) => self.name = v,
            SkillField::Category(v) => self.category = v,
            SkillField::Level(v) => self.level = v,
            SkillField::Icon(v) => self.icon = v,
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.max_len("name", &self.name, 60);
        errors.require("category", &self.category);
        errors.check(
            self.level <= MAX_LEVEL,
            "level",
            "must be between 0 and 100",
        );
        errors.into_result()
    }

    fn defaults() -> Vec<Self> {
        [
            ("Rust", "backend", 80),
            ("TypeScript", "frontend", 85),
            ("PostgreSQL", "database", 70),
            ("Docker", "devops", 65),
        ]
        .into_iter()
        .zip(1..)
        .map(|((name, category, level), id)| Skill {
            id: Some(id),
            name: name.into(),
            category: category.into(),
            level,
            icon: None,
        })
        .collect()
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bounds() {
        let mut skill = Skill::defaults().remove(0);
        skill.apply(SkillField::Level(MAX_LEVEL));
        assert!(skill.validate().is_ok());
        skill.apply(SkillField::Level(101));
        assert!(skill.validate().unwrap_err().field("level").is_some());
    }

    #[test]
    fn test_defaults_have_distinct_ids() {
        let skills = Skill::defaults();
        let mut ids: Vec<_> = skills.iter().filter_map(|s| s.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), skills.len());
    }
}
