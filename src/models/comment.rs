use serde::{Deserialize, Serialize};

use crate::api::media::MediaResolver;
use crate::api::payload::{FieldValue, FormValues};
use crate::api::resource::{Column, RecordId, Resource};
use crate::config::UploadConfig;
use crate::form::{FieldKind, FieldSpec, FormSchema};
use crate::models::{format_date_time, insert_text, or_na, yes_no};

/// Comment authors arrive either as a bare user id or an embedded profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentAuthor {
    Id(RecordId),
    Profile {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        username: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: RecordId,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub approved: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Id of the news article commented on
    #[serde(default)]
    pub news: Option<RecordId>,
    #[serde(default)]
    pub user: Option<CommentAuthor>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Comment {
    pub fn author_name(&self) -> &str {
        let profile = match &self.user {
            Some(CommentAuthor::Profile { name, username }) => name
                .as_deref()
                .filter(|n| !n.is_empty())
                .or(username.as_deref().filter(|n| !n.is_empty())),
            _ => None,
        };
        profile
            .or(self.username.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("User")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentRow {
    pub content: String,
    pub approved: String,
    pub created_at: String,
}

pub struct Comments;

impl Resource for Comments {
    type Record = Comment;
    type Row = CommentRow;

    const NAME: &'static str = "comments";
    const LABEL: &'static str = "Comment";

    fn record_id(record: &Comment) -> RecordId {
        record.id
    }

    fn display(record: &Comment, _media: &MediaResolver) -> CommentRow {
        CommentRow {
            content: or_na(record.content.as_deref()),
            approved: yes_no(record.approved),
            created_at: format_date_time(record.created_at.as_deref()),
        }
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("ID", "id"),
            Column::new("Content", "content"),
            Column::new("Approved", "approved"),
            Column::new("Created At", "created_at"),
        ];
        COLUMNS
    }

    fn schema(_upload: &UploadConfig) -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::new("content", "Content", FieldKind::Text).required("Content is required"))
            .field(FieldSpec::new("approved", "Approved", FieldKind::Flag))
    }

    fn form_values(record: &Comment) -> FormValues {
        let mut values = FormValues::new();
        insert_text(&mut values, "content", record.content.as_deref());
        values.insert("approved".to_string(), FieldValue::Bool(record.approved));
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn author_falls_back_through_profile_then_username() {
        let with_profile: Comment = serde_json::from_value(json!({
            "id": 1, "content": "Nice", "user": {"name": "", "username": "ravi"}
        }))
        .unwrap();
        assert_eq!(with_profile.author_name(), "ravi");

        let with_id: Comment = serde_json::from_value(json!({
            "id": 2, "content": "Nice", "user": 14, "username": "meera"
        }))
        .unwrap();
        assert_eq!(with_id.user, Some(CommentAuthor::Id(RecordId(14))));
        assert_eq!(with_id.author_name(), "meera");

        let anonymous: Comment = serde_json::from_value(json!({"id": 3})).unwrap();
        assert_eq!(anonymous.author_name(), "User");
    }

    #[test]
    fn approved_shows_yes_no_and_prefills_as_flag() {
        let comment: Comment = serde_json::from_value(json!({"id": 5, "content": "Hi", "approved": true})).unwrap();
        let row = Comments::display(&comment, &MediaResolver::new("http://localhost"));
        assert_eq!(row.approved, "Yes");
        assert_eq!(row.created_at, "N/A");
        assert_eq!(Comments::form_values(&comment)["approved"], FieldValue::Bool(true));
        assert!(!Comments::multipart());
    }
}
