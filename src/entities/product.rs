//! Shop products.

use serde::{Deserialize, Serialize};

use crate::crud::Entity;
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: String,
    pub features: Vec<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProductField {
    Name(String),
    Description(String),
    Price(f64),
    Category(String),
    Features(Vec<String>),
    ImageUrl(Option<String>),
    IsActive(bool),
}

impl Entity for Product {
    type Key = i64;
    type Field = ProductField;

    const RESOURCE: &'static str = "products";
    const LABEL: &'static str = "product";

    fn key(&self) -> Option<i64> {
        self.id
    }

    fn apply(&mut self, field: ProductField) {
        match field {
            ProductField::Name(v) => self.name = v,
            ProductField::Description(v) => self.description = v,
            ProductField::Price(v) => self.price = v,
            ProductField::Category(v) => self.category = v,
            ProductField::Features(v) => self.features = v,
            ProductField::ImageUrl(v) => self.image_url = v,
            ProductField::IsActive(v) => self.is_active = v,
        }
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.max_len("name", &self.name, 120);
        errors.require("description", &self.description);
        errors.check(
            self.price.is_finite() && self.price >= 0.0,
            "price",
            "must be a non-negative number",
        );
        errors.require("category", &self.category);
        errors.optional_url("imageUrl", self.image_url.as_deref());
        errors.into_result()
    }

    fn defaults() -> Vec<Self> {
        vec![
            Product {
                id: Some(1),
                name: "Starter Template".into(),
                description: "Landing page template with a contact form.".into(),
                price: 19.0,
                category: "templates".into(),
                features: vec!["Responsive layout".into(), "Dark mode".into()],
                image_url: None,
                is_active: true,
            },
            Product {
                id: Some(2),
                name: "Code Review Session".into(),
                description: "One hour review of a repository of your choice.".into(),
                price: 49.0,
                category: "services".into(),
                features: vec!["Written summary".into()],
                image_url: None,
                is_active: true,
            },
        ]
    }

    fn category(&self) -> Option<&str> {
        Some(&self.category)
    }
}
