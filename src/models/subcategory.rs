use serde::{Deserialize, Serialize};

use crate::api::media::MediaResolver;
use crate::api::payload::FormValues;
use crate::api::resource::{Column, RecordId, Resource};
use crate::config::UploadConfig;
use crate::form::{FieldKind, FieldSpec, FormSchema, Rule};
use crate::models::{insert_text, or_na, text};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: RecordId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    /// Parent category id
    #[serde(default)]
    pub category: Option<RecordId>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubcategoryRow {
    pub name: String,
    pub slug: String,
    pub category: String,
    pub image: String,
}

pub struct Subcategories;

impl Resource for Subcategories {
    type Record = Subcategory;
    type Row = SubcategoryRow;

    const NAME: &'static str = "subcategories";
    const LABEL: &'static str = "Subcategory";

    fn record_id(record: &Subcategory) -> RecordId {
        record.id
    }

    fn display(record: &Subcategory, media: &MediaResolver) -> SubcategoryRow {
        SubcategoryRow {
            name: or_na(record.name.as_deref()),
            slug: or_na(record.slug.as_deref()),
            category: or_na(record.category.map(|id| id.to_string()).as_deref()),
            image: media.resolve_or_na(record.image.as_deref()),
        }
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("ID", "id"),
            Column::new("Name", "name"),
            Column::new("Slug", "slug"),
            Column::new("Category", "category"),
            Column::new("Image", "image"),
        ];
        COLUMNS
    }

    fn schema(upload: &UploadConfig) -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::new("name", "Name", FieldKind::Text).required("Name is required"))
            .field(FieldSpec::new("slug", "Slug", FieldKind::Slug).required("Slug is required"))
            .field(FieldSpec::new("category", "Category", FieldKind::Relation).required("Category is required"))
            .field(
                FieldSpec::new("image", "Image", FieldKind::File)
                    .rule(Rule::RequiredOnCreate("Image is required".to_string()))
                    .image(upload),
            )
    }

    fn form_values(record: &Subcategory) -> FormValues {
        let mut values = FormValues::new();
        insert_text(&mut values, "name", record.name.as_deref());
        insert_text(&mut values, "slug", record.slug.as_deref());
        if let Some(category) = record.category {
            values.insert("category".to_string(), text(&category.to_string()));
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::payload::{FieldValue, FileUpload};
    use crate::form::FormMode;

    #[test]
    fn category_and_image_are_required_on_create() {
        let schema = Subcategories::schema(&UploadConfig::default());
        let mut values = FormValues::new();
        values.insert("name".to_string(), text("Football"));
        values.insert("slug".to_string(), text("football"));

        let errors = schema.validate(&values, FormMode::Create);
        assert_eq!(errors["category"], "Category is required");
        assert_eq!(errors["image"], "Image is required");

        values.insert("category".to_string(), text("2"));
        values.insert(
            "image".to_string(),
            FieldValue::File(FileUpload::new("ball.jpg", "image/jpeg", vec![0; 64])),
        );
        assert!(schema.validate(&values, FormMode::Create).is_empty());
    }

    #[test]
    fn prefill_carries_parent_id() {
        let record = Subcategory {
            id: RecordId(5),
            name: Some("Football".to_string()),
            slug: Some("football".to_string()),
            category: Some(RecordId(2)),
            image: Some("/media/sub/ball.jpg".to_string()),
        };
        let values = Subcategories::form_values(&record);
        assert_eq!(values["category"], text("2"));
        assert!(!values.contains_key("image"));
    }
}
