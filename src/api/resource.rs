use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

use crate::api::client::{decode, ApiClient};
use crate::api::media::MediaResolver;
use crate::api::payload::{FormValues, Payload};
use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::form::FormSchema;

/// The server's identifier for a record. Distinct from a row's display index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(RecordId)
    }
}

/// A table row: `id` is the 1-based position on screen, `real_id` is what goes in URLs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRow<F> {
    pub id: usize,
    #[serde(rename = "realId")]
    pub real_id: RecordId,
    #[serde(flatten)]
    pub fields: F,
}

/// Column descriptor handed to whatever renders the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub key: &'static str,
}

impl Column {
    pub const fn new(header: &'static str, key: &'static str) -> Self {
        Self { header, key }
    }
}

/// One backend collection and how it is shown and edited
pub trait Resource: Send + Sync + 'static {
    type Record: DeserializeOwned + Serialize + Clone + fmt::Debug + Send + Sync;
    type Row: Serialize + Clone + fmt::Debug + Send + Sync;

    /// Path segment of the collection, e.g. `tags`
    const NAME: &'static str;
    /// Singular label for messages, e.g. `Tag`
    const LABEL: &'static str;
    const UPDATE_METHOD: Method = Method::PUT;
    /// Whether `GET {detail_path}` exists; otherwise records are looked up in the collection
    const HAS_DETAIL_ENDPOINT: bool = false;

    fn list_path() -> String {
        format!("/{}/", Self::NAME)
    }

    fn create_path() -> String {
        Self::list_path()
    }

    fn detail_path(id: RecordId) -> String {
        format!("/{}/{}/", Self::NAME, id)
    }

    /// `None` when the backend has no update endpoint for this resource
    fn update_path(id: RecordId) -> Option<String> {
        Some(Self::detail_path(id))
    }

    /// `None` when the backend has no delete endpoint for this resource
    fn delete_path(id: RecordId) -> Option<String> {
        Some(Self::detail_path(id))
    }

    fn record_id(record: &Self::Record) -> RecordId;

    fn display(record: &Self::Record, media: &MediaResolver) -> Self::Row;

    fn columns() -> &'static [Column];

    fn schema(upload: &UploadConfig) -> FormSchema;

    /// Resources with a file field are always sent as multipart
    fn multipart() -> bool {
        Self::schema(&UploadConfig::default()).has_file_field()
    }

    /// Prefill for an edit form. File fields stay empty: a stored file cannot be re-chosen.
    fn form_values(record: &Self::Record) -> FormValues;

    /// Fields the create call adds on top of what the operator entered
    fn extra_create_fields(_values: &mut FormValues) {}
}

/// Collections come back bare or wrapped in a paginated envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Plain(Vec<T>),
    Paginated { results: Vec<T> },
}

/// CRUD calls for one resource type
pub struct ResourceClient<R: Resource> {
    api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self::new(self.api.clone())
    }
}

impl<R: Resource> fmt::Debug for ResourceClient<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient").field("resource", &R::NAME).field("api", &self.api).finish()
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Raw records in server order
    pub async fn fetch_all(&self) -> Result<Vec<R::Record>, ApiError> {
        let value = self.api.send(Method::GET, &R::list_path(), None).await?;
        let envelope: ListEnvelope<R::Record> = decode(value)?;
        let records = match envelope {
            ListEnvelope::Plain(records) => records,
            ListEnvelope::Paginated { results } => results,
        };
        tracing::debug!("Fetched {} {}", records.len(), R::NAME);
        Ok(records)
    }

    /// Fetch the collection and number it for display
    pub async fn list(&self) -> Result<Vec<DisplayRow<R::Row>>, ApiError> {
        let records = self.fetch_all().await?;
        Ok(to_rows::<R>(&records, self.api.media()))
    }

    /// `GET` the item endpoint. Only resources with a detail endpoint have one.
    pub async fn get(&self, id: RecordId) -> Result<R::Record, ApiError> {
        if !R::HAS_DETAIL_ENDPOINT {
            return Err(ApiError::unsupported(R::NAME, "detail"));
        }
        self.api.get(&R::detail_path(id)).await
    }

    /// One record by id, from the item endpoint when there is one, else from the collection
    pub async fn find(&self, id: RecordId) -> Result<R::Record, ApiError> {
        if R::HAS_DETAIL_ENDPOINT {
            return self.get(id).await;
        }
        self.fetch_all()
            .await?
            .into_iter()
            .find(|record| R::record_id(record) == id)
            .ok_or_else(|| ApiError::not_found(R::LABEL, id))
    }

    pub async fn create(&self, values: &FormValues) -> Result<R::Record, ApiError> {
        let mut values = values.clone();
        R::extra_create_fields(&mut values);
        let payload = Payload::build(&values, R::multipart())?;
        tracing::info!("Creating {} ({})", R::LABEL, payload.field_names().join(", "));

        let value = self.api.send(Method::POST, &R::create_path(), Some(payload)).await?;
        decode(value)
    }

    pub async fn update(&self, id: RecordId, values: &FormValues) -> Result<R::Record, ApiError> {
        let path = R::update_path(id).ok_or_else(|| ApiError::unsupported(R::NAME, "update"))?;
        let payload = Payload::build(values, R::multipart())?;
        tracing::info!("Updating {} {} ({})", R::LABEL, id, payload.field_names().join(", "));

        let value = self.api.send(R::UPDATE_METHOD, &path, Some(payload)).await?;
        decode(value)
    }

    /// Delete a record. Callers confirm intent before calling this.
    pub async fn remove(&self, id: RecordId) -> Result<(), ApiError> {
        let path = R::delete_path(id).ok_or_else(|| ApiError::unsupported(R::NAME, "delete"))?;
        tracing::info!("Deleting {} {}", R::LABEL, id);

        let _: Value = self.api.send(Method::DELETE, &path, None).await?;
        Ok(())
    }
}

pub fn to_rows<R: Resource>(records: &[R::Record], media: &MediaResolver) -> Vec<DisplayRow<R::Row>> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| DisplayRow {
            id: index + 1,
            real_id: R::record_id(record),
            fields: R::display(record, media),
        })
        .collect()
}
