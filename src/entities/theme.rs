//! Site theme settings: a single record read with `GET theme` and replaced
//! with `PUT theme`.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, THEME_PATH};
use crate::crud::FallbackPolicy;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeSettings {
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub dark_mode: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            primary_color: "#2563eb".into(),
            secondary_color: "#64748b".into(),
            accent_color: "#f59e0b".into(),
            font_family: "Inter".into(),
            dark_mode: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeField {
    PrimaryColor(String),
    SecondaryColor(String),
    AccentColor(String),
    FontFamily(String),
    DarkMode(bool),
}

/// `#rgb` or `#rrggbb`.
fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

impl ThemeSettings {
    pub fn apply(&mut self, field: ThemeField) {
        match field {
            ThemeField::PrimaryColor(v) => self.primary_color = v,
            ThemeField::SecondaryColor(v) => self.secondary_color = v,
            ThemeField::AccentColor(v) => self.accent_color = v,
            ThemeField::FontFamily(v) => self.font_family = v,
            ThemeField::DarkMode(v) => self.dark_mode = v,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        for (field, value) in [
            ("primaryColor", &self.primary_color),
            ("secondaryColor", &self.secondary_color),
            ("accentColor", &self.accent_color),
        ] {
            errors.check(is_hex_color(value), field, "must be a hex color like #1a2b3c");
        }
        errors.require("fontFamily", &self.font_family);
        errors.into_result()
    }
}

/// Loads and saves [`ThemeSettings`] with the same fallback policy as the
/// list controllers.
pub struct ThemeController {
    api: ApiClient,
    policy: FallbackPolicy,
    current: Option<ThemeSettings>,
}

impl ThemeController {
    pub fn new(api: ApiClient, policy: FallbackPolicy) -> Self {
        Self {
            api,
            policy,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&ThemeSettings> {
        self.current.as_ref()
    }

    pub async fn load(&mut self) -> Result<&ThemeSettings, ApiError> {
        match self.api.get_json::<ThemeSettings>(THEME_PATH).await {
            Ok(theme) => {
                self.current = Some(theme);
            }
            Err(e) if e.is_fetch_failure() && self.policy == FallbackPolicy::FailSoft => {
                warn!(error = %e, "Theme fetch failed, using fallback");
                if self.current.is_none() {
                    self.current = Some(ThemeSettings::default());
                }
            }
            Err(e) => return Err(e),
        }
        Ok(&*self.current.get_or_insert_with(ThemeSettings::default))
    }

    pub async fn save(&mut self, theme: ThemeSettings) -> Result<&ThemeSettings, ApiError> {
        theme.validate()?;
        let saved: ThemeSettings = self.api.put_json(THEME_PATH, &theme).await?;
        info!(dark_mode = saved.dark_mode, "Theme updated");
        Ok(&*self.current.insert(saved))
    }
}
