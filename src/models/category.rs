use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::media::MediaResolver;
use crate::api::payload::FormValues;
use crate::api::resource::{Column, RecordId, Resource};
use crate::config::UploadConfig;
use crate::form::{FieldKind, FieldSpec, FormSchema};
use crate::models::{insert_text, or_na, text};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub name: String,
    pub slug: String,
    pub image: String,
}

/// `/categories/`; image is optional and sent only when chosen
pub struct Categories;

impl Resource for Categories {
    type Record = Category;
    type Row = CategoryRow;

    const NAME: &'static str = "categories";
    const LABEL: &'static str = "Category";

    fn record_id(record: &Category) -> RecordId {
        record.id
    }

    fn display(record: &Category, media: &MediaResolver) -> CategoryRow {
        CategoryRow {
            name: or_na(record.name.as_deref()),
            slug: or_na(record.slug.as_deref()),
            image: media.resolve_or_na(record.image.as_deref()),
        }
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("ID", "id"),
            Column::new("Name", "name"),
            Column::new("Slug", "slug"),
            Column::new("Image", "image"),
        ];
        COLUMNS
    }

    fn schema(_upload: &UploadConfig) -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::new("name", "Name", FieldKind::Text).required("Name is required"))
            .field(FieldSpec::new("slug", "Slug", FieldKind::Slug).required("Slug is required"))
            .field(FieldSpec::new("image", "Image", FieldKind::File))
    }

    fn form_values(record: &Category) -> FormValues {
        let mut values = FormValues::new();
        insert_text(&mut values, "name", record.name.as_deref());
        insert_text(&mut values, "slug", record.slug.as_deref());
        values
    }

    fn extra_create_fields(values: &mut FormValues) {
        values.insert("created_at".to_string(), text(&Utc::now().to_rfc3339()));
    }
}
