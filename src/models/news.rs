use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::media::MediaResolver;
use crate::api::payload::{FieldValue, FormValues};
use crate::api::resource::{Column, RecordId, Resource};
use crate::config::UploadConfig;
use crate::form::{FieldKind, FieldSpec, FormSchema, Rule};
use crate::models::{format_date, format_date_time, insert_text, or_na, text};

const REQUIRED: &str = "This field is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    Draft,
    Published,
}

impl NewsStatus {
    pub const ALL: &'static [&'static str] = &["draft", "published"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    pub id: RecordId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// HTML body
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Subcategory id
    #[serde(default)]
    pub category: Option<RecordId>,
    #[serde(default)]
    pub tags: Vec<RecordId>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub publish_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl News {
    pub fn status(&self) -> Option<NewsStatus> {
        match self.status.as_deref() {
            Some("draft") => Some(NewsStatus::Draft),
            Some("published") => Some(NewsStatus::Published),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsRow {
    pub title: String,
    pub slug: String,
    pub content: String,
    pub image: String,
    pub status: String,
    pub publish_date: String,
    pub created_at: String,
}

/// News articles. The backend exposes them under irregular paths:
/// the collection lives at `/news/create/` and edits go through PATCH.
pub struct NewsArticles;

impl Resource for NewsArticles {
    type Record = News;
    type Row = NewsRow;

    const NAME: &'static str = "news";
    const LABEL: &'static str = "News";
    const UPDATE_METHOD: Method = Method::PATCH;
    const HAS_DETAIL_ENDPOINT: bool = true;

    fn list_path() -> String {
        "/news/create/".to_string()
    }

    fn update_path(id: RecordId) -> Option<String> {
        Some(format!("/news/{}/update/", id))
    }

    fn delete_path(id: RecordId) -> Option<String> {
        Some(format!("/news/{}/delete/", id))
    }

    fn record_id(record: &News) -> RecordId {
        record.id
    }

    fn display(record: &News, media: &MediaResolver) -> NewsRow {
        NewsRow {
            title: or_na(record.title.as_deref()),
            slug: or_na(record.slug.as_deref()),
            content: or_na(record.content.as_deref()),
            image: media.resolve_or_na(record.image.as_deref()),
            status: or_na(record.status.as_deref()),
            publish_date: format_date(record.publish_date.as_deref()),
            created_at: format_date_time(record.created_at.as_deref()),
        }
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("ID", "id"),
            Column::new("Title", "title"),
            Column::new("Slug", "slug"),
            Column::new("Status", "status"),
            Column::new("Publish Date", "publishDate"),
            Column::new("Created At", "createdAt"),
            Column::new("Image", "image"),
        ];
        COLUMNS
    }

    fn schema(upload: &UploadConfig) -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::new("title", "Title", FieldKind::Text).required(REQUIRED))
            .field(FieldSpec::new("name", "Name", FieldKind::Text).required(REQUIRED))
            .field(FieldSpec::new("slug", "Slug", FieldKind::Slug).required(REQUIRED))
            .field(FieldSpec::new("content", "Content", FieldKind::Html).required(REQUIRED))
            .field(
                FieldSpec::new("image", "Image", FieldKind::File)
                    .rule(Rule::RequiredOnCreate(REQUIRED.to_string()))
                    .image(upload),
            )
            .field(FieldSpec::new("category", "Category", FieldKind::Relation).required(REQUIRED))
            .field(
                FieldSpec::new("tags", "Tags", FieldKind::RelationSet)
                    .rule(Rule::MinItems(1, "Select at least one tag".to_string())),
            )
            .field(
                FieldSpec::new("status", "Status", FieldKind::Choice(NewsStatus::ALL))
                    .required(REQUIRED)
                    .rule(Rule::OneOf(NewsStatus::ALL, "Invalid status".to_string())),
            )
            .field(FieldSpec::new("publish_date", "Publish Date", FieldKind::Date).required(REQUIRED))
    }

    fn form_values(record: &News) -> FormValues {
        let mut values = FormValues::new();
        insert_text(&mut values, "title", record.title.as_deref());
        insert_text(&mut values, "name", record.name.as_deref());
        insert_text(&mut values, "slug", record.slug.as_deref());
        insert_text(&mut values, "content", record.content.as_deref());
        insert_text(&mut values, "status", record.status.as_deref());
        if let Some(category) = record.category {
            values.insert("category".to_string(), text(&category.to_string()));
        }
        values.insert(
            "tags".to_string(),
            FieldValue::List(record.tags.iter().map(ToString::to_string).collect()),
        );
        let publish_date = record
            .publish_date
            .as_deref()
            .map(|d| d.split('T').next().unwrap_or(d));
        insert_text(&mut values, "publish_date", publish_date);
        values
    }
}
