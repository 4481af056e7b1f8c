use serde::{Deserialize, Serialize};

use crate::api::media::MediaResolver;
use crate::api::payload::FormValues;
use crate::api::resource::{Column, RecordId, Resource};
use crate::config::UploadConfig;
use crate::form::{FieldKind, FieldSpec, FormSchema};
use crate::models::{insert_text, or_na};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagRow {
    pub name: String,
    pub slug: String,
}

pub struct Tags;

impl Resource for Tags {
    type Record = Tag;
    type Row = TagRow;

    const NAME: &'static str = "tags";
    const LABEL: &'static str = "Tag";

    fn record_id(record: &Tag) -> RecordId {
        record.id
    }

    fn display(record: &Tag, _media: &MediaResolver) -> TagRow {
        TagRow {
            name: or_na(record.name.as_deref()),
            slug: or_na(record.slug.as_deref()),
        }
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("ID", "id"),
            Column::new("Name", "name"),
            Column::new("Slug", "slug"),
        ];
        COLUMNS
    }

    fn schema(_upload: &UploadConfig) -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::new("name", "Name", FieldKind::Text).required("Name is required"))
            .field(FieldSpec::new("slug", "Slug", FieldKind::Slug).required("Slug is required"))
    }

    fn form_values(record: &Tag) -> FormValues {
        let mut values = FormValues::new();
        insert_text(&mut values, "name", record.name.as_deref());
        insert_text(&mut values, "slug", record.slug.as_deref());
        values
    }
}
