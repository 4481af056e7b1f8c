pub mod client;
pub mod media;
pub mod payload;
pub mod resource;

pub use client::ApiClient;
pub use media::MediaResolver;
pub use payload::{FieldValue, FileUpload, FormValues, Payload};
pub use resource::{Column, DisplayRow, RecordId, Resource, ResourceClient};
