//! Public submissions: contact messages and product access requests.
//! Both are validated locally, then POSTed without credentials.

use serde::Serialize;
use tracing::info;

use crate::api::{ApiClient, ApiError, CONTACT_PATH, PRODUCT_ACCESS_PATH};
use crate::validation::ValidationErrors;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name);
        errors.email("email", &self.email);
        errors.max_len("subject", &self.subject, 200);
        errors.require("message", &self.message);
        errors.max_len("message", &self.message, 5000);
        errors.into_result()
    }

    pub async fn send(&self, api: &ApiClient) -> Result<(), ApiError> {
        self.validate()?;
        api.post(CONTACT_PATH, self).await?;
        info!("Contact message sent");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductAccessRequest {
    pub product_id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProductAccessRequest {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(self.product_id > 0, "productId", "must reference a product");
        errors.require("name", &self.name);
        errors.email("email", &self.email);
        errors.into_result()
    }

    pub async fn send(&self, api: &ApiClient) -> Result<(), ApiError> {
        self.validate()?;
        api.post(PRODUCT_ACCESS_PATH, self).await?;
        info!(product_id = self.product_id, "Product access requested");
        Ok(())
    }
}
