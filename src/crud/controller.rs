//! Generic list/form controller over an [`Entity`].
//!
//! One controller per entity type. Every operation takes `&mut self`, so a
//! controller never has two requests in flight and a late response cannot
//! overwrite a newer one.

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::entity::Entity;
use crate::api::{ApiClient, ApiError, detail_path};
use crate::validation::ValidationErrors;

/// What `list` does when the collection cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FallbackPolicy {
    /// Serve the last successful list, or the hard-coded defaults.
    #[default]
    FailSoft,
    /// Return the error.
    FailLoud,
}

/// Where the in-memory list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSource {
    Empty,
    Remote,
    LastKnown,
    Defaults,
}

/// The backend sends either a bare array or `{"data": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListPayload<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListPayload<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { data: items } => items,
        }
    }
}

/// Proof that the user was asked before a delete. Only
/// [`CrudController::request_delete`] creates one.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteConfirmation<K> {
    key: K,
}

impl<K> DeleteConfirmation<K> {
    pub fn key(&self) -> &K {
        &self.key
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormMode<K> {
    Create,
    Edit(K),
}

/// An open form. `working` is edited; `original` is the copy it was opened
/// from and is never touched by edits.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState<E: Entity> {
    mode: FormMode<E::Key>,
    original: E,
    working: E,
    errors: Option<ValidationErrors>,
}

impl<E: Entity> FormState<E> {
    fn new(mode: FormMode<E::Key>, original: E) -> Self {
        Self {
            mode,
            working: original.clone(),
            original,
            errors: None,
        }
    }

    pub fn mode(&self) -> &FormMode<E::Key> {
        &self.mode
    }

    pub fn original(&self) -> &E {
        &self.original
    }

    pub fn working(&self) -> &E {
        &self.working
    }

    pub fn errors(&self) -> Option<&ValidationErrors> {
        self.errors.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.working != self.original
    }
}

pub struct CrudController<E: Entity> {
    api: ApiClient,
    policy: FallbackPolicy,
    items: Vec<E>,
    source: ListSource,
    form: Option<FormState<E>>,
}

impl<E: Entity> CrudController<E> {
    pub fn new(api: ApiClient, policy: FallbackPolicy) -> Self {
        Self {
            api,
            policy,
            items: Vec::new(),
            source: ListSource::Empty,
            form: None,
        }
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn source(&self) -> ListSource {
        self.source
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub fn form(&self) -> Option<&FormState<E>> {
        self.form.as_ref()
    }

    pub fn find(&self, key: &E::Key) -> Option<&E> {
        self.items.iter().find(|e| e.key().as_ref() == Some(key))
    }

    // --- REST operations ---

    /// Fetch the collection. Under [`FallbackPolicy::FailSoft`] a fetch
    /// failure serves the last successful list, or [`Entity::defaults`] if
    /// there never was one. Refusals such as an expired session always
    /// propagate.
    pub async fn list(&mut self) -> Result<&[E], ApiError> {
        match self.api.get_json::<ListPayload<E>>(E::RESOURCE).await {
            Ok(payload) => {
                self.items = payload.into_items();
                self.source = ListSource::Remote;
                debug!(resource = E::RESOURCE, count = self.items.len(), "Loaded list");
            }
            Err(e) if e.is_fetch_failure() && self.policy == FallbackPolicy::FailSoft => {
                if self.source == ListSource::Remote || self.source == ListSource::LastKnown {
                    warn!(resource = E::RESOURCE, error = %e, "List fetch failed, keeping last known list");
                    self.source = ListSource::LastKnown;
                } else {
                    warn!(resource = E::RESOURCE, error = %e, "List fetch failed, serving defaults");
                    self.items = E::defaults();
                    self.source = ListSource::Defaults;
                }
            }
            Err(e) => return Err(e),
        }
        Ok(&self.items)
    }

    /// Fetch one record and patch it into the list.
    pub async fn fetch(&mut self, key: &E::Key) -> Result<E, ApiError> {
        let entity: E = self.api.get_json(&detail_path(E::RESOURCE, key)).await?;
        self.replace(key, entity.clone());
        Ok(entity)
    }

    /// Validate, then POST. Nothing is sent when validation fails.
    pub async fn create(&mut self, draft: E) -> Result<E, ApiError> {
        draft.validate()?;
        let created: E = self.api.post_json(E::RESOURCE, &draft).await?;
        info!(resource = E::RESOURCE, key = ?created.key(), "Created {}", E::LABEL);
        self.items.push(created.clone());
        Ok(created)
    }

    /// Validate, then PUT to the record's detail path.
    pub async fn update(&mut self, key: &E::Key, draft: E) -> Result<E, ApiError> {
        draft.validate()?;
        let updated: E = self
            .api
            .put_json(&detail_path(E::RESOURCE, key), &draft)
            .await?;
        info!(resource = E::RESOURCE, %key, "Updated {}", E::LABEL);
        self.replace(key, updated.clone());
        Ok(updated)
    }

    /// First step of a delete: the caller shows the confirmation prompt and
    /// passes the token to [`delete`](Self::delete) only if the user agreed.
    pub fn request_delete(&self, key: E::Key) -> DeleteConfirmation<E::Key> {
        DeleteConfirmation { key }
    }

    pub async fn delete(&mut self, confirmation: DeleteConfirmation<E::Key>) -> Result<(), ApiError> {
        let key = confirmation.key;
        self.api.delete(&detail_path(E::RESOURCE, &key)).await?;
        info!(resource = E::RESOURCE, %key, "Deleted {}", E::LABEL);
        self.items.retain(|e| e.key().as_ref() != Some(&key));
        Ok(())
    }

    fn replace(&mut self, key: &E::Key, entity: E) {
        if let Some(slot) = self
            .items
            .iter_mut()
            .find(|e| e.key().as_ref() == Some(key))
        {
            *slot = entity;
        }
    }

    // --- Form ---

    /// Open an empty create form.
    pub fn begin_create(&mut self) -> &FormState<E> {
        self.begin_create_with(E::default())
    }

    /// Open a create form prefilled with `draft`.
    pub fn begin_create_with(&mut self, draft: E) -> &FormState<E> {
        &*self.form.insert(FormState::new(FormMode::Create, draft))
    }

    /// Open an edit form on a copy of the listed record.
    pub fn begin_edit(&mut self, key: &E::Key) -> Result<&FormState<E>, ApiError> {
        let original = self
            .find(key)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(detail_path(E::RESOURCE, key)))?;
        Ok(&*self.form.insert(FormState::new(FormMode::Edit(key.clone()), original)))
    }

    /// Apply one field change to the working copy. No-op without an open form.
    pub fn edit(&mut self, field: E::Field) {
        match self.form.as_mut() {
            Some(form) => form.working.apply(field),
            None => debug!(resource = E::RESOURCE, "Edit with no open form ignored"),
        }
    }

    /// Revert the working copy to the values the form was opened with.
    pub fn discard_changes(&mut self) {
        if let Some(form) = self.form.as_mut() {
            form.working = form.original.clone();
            form.errors = None;
        }
    }

    /// Close the form without saving. Returns the untouched original.
    pub fn cancel(&mut self) -> Option<E> {
        self.form.take().map(|form| form.original)
    }

    /// Save the working copy. On success the form closes; on failure it
    /// stays open with the errors attached, server rejections included.
    pub async fn submit(&mut self) -> Result<E, ApiError> {
        let (mode, draft) = match self.form.as_ref() {
            Some(form) => (form.mode.clone(), form.working.clone()),
            None => return Err(ApiError::InvalidRequest("no form is open".into())),
        };

        let result = match &mode {
            FormMode::Create => self.create(draft).await,
            FormMode::Edit(key) => self.update(key, draft).await,
        };

        match result {
            Ok(saved) => {
                self.form = None;
                Ok(saved)
            }
            Err(e) => {
                if let Some(form) = self.form.as_mut() {
                    form.errors = Some(match &e {
                        ApiError::Validation(errors) => errors.clone(),
                        other => ValidationErrors::form_level(other.to_string()),
                    });
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpRefresh, Method};
    use crate::auth::MemoryTokenStore;
    use crate::entities::{Project, ProjectField};
    use std::sync::Arc;
    use url::Url;

    fn offline_api() -> ApiClient {
        let http = reqwest::Client::new();
        let base = Url::parse("http://127.0.0.1:9/api/").unwrap();
        let refresher = HttpRefresh::new(http.clone(), &base).unwrap();
        ApiClient::new(
            http,
            base,
            Arc::new(MemoryTokenStore::new()),
            Arc::new(refresher),
        )
    }

    #[test]
    fn test_list_payload_shapes() {
        let bare: ListPayload<Project> = serde_json::from_str(r#"[{"id":1,"title":"a"}]"#).unwrap();
        assert_eq!(bare.into_items().len(), 1);

        let wrapped: ListPayload<Project> =
            serde_json::from_str(r#"{"data":[{"id":1},{"id":2}]}"#).unwrap();
        assert_eq!(wrapped.into_items().len(), 2);
    }

    #[tokio::test]
    async fn test_fail_soft_serves_defaults_when_offline() {
        let mut projects = CrudController::<Project>::new(offline_api(), FallbackPolicy::FailSoft);
        let items = projects.list().await.unwrap();
        assert!(!items.is_empty());
        assert_eq!(items, Project::defaults().as_slice());
        assert_eq!(projects.source(), ListSource::Defaults);
    }

    #[tokio::test]
    async fn test_fail_loud_propagates() {
        let mut projects = CrudController::<Project>::new(offline_api(), FallbackPolicy::FailLoud);
        let err = projects.list().await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert!(projects.items().is_empty());
    }

    #[tokio::test]
    async fn test_blank_title_rejected_before_network() {
        let mut projects = CrudController::<Project>::new(offline_api(), FallbackPolicy::FailSoft);
        projects.begin_create();
        projects.edit(ProjectField::Description("no title".into()));

        // Offline: reaching the network would give Network, not Validation.
        let errors = match projects.submit().await {
            Err(ApiError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {:?}", other),
        };
        assert!(errors.field("title").is_some());
        assert!(projects.items().is_empty());
        assert!(projects.form().unwrap().errors().unwrap().field("title").is_some());
    }

    #[tokio::test]
    async fn test_cancel_edit_restores_original() {
        let mut projects = CrudController::<Project>::new(offline_api(), FallbackPolicy::FailSoft);
        projects.list().await.unwrap();
        let first = projects.items()[0].clone();
        let key = first.id.unwrap();

        projects.begin_edit(&key).unwrap();
        projects.edit(ProjectField::Title("Changed".into()));
        projects.edit(ProjectField::Featured(!first.featured));
        assert!(projects.form().unwrap().is_dirty());

        projects.discard_changes();
        assert_eq!(projects.form().unwrap().working(), &first);

        projects.edit(ProjectField::Description("changed again".into()));
        assert_eq!(projects.cancel(), Some(first.clone()));
        assert!(projects.form().is_none());
        assert_eq!(projects.find(&key), Some(&first));

        let reopened = projects.begin_edit(&key).unwrap();
        assert_eq!(reopened.working(), &first);
    }

    #[test]
    fn test_begin_edit_unknown_key() {
        let mut projects = CrudController::<Project>::new(offline_api(), FallbackPolicy::FailSoft);
        assert!(matches!(projects.begin_edit(&42), Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_submit_without_form() {
        let mut projects = CrudController::<Project>::new(offline_api(), FallbackPolicy::FailSoft);
        assert!(matches!(
            projects.submit().await,
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_public_reads_need_no_token() {
        let api = offline_api();
        assert!(api.is_public(&Method::GET, Project::RESOURCE));
        assert!(!api.is_public(&Method::POST, Project::RESOURCE));
    }
}
