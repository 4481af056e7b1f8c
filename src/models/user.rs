use serde::{Deserialize, Serialize};

use crate::api::media::MediaResolver;
use crate::api::payload::FormValues;
use crate::api::resource::{Column, RecordId, Resource};
use crate::config::UploadConfig;
use crate::form::{FieldKind, FieldSpec, FormSchema, Rule};
use crate::models::{format_date, insert_text, or_na, yes_no};

const REQUIRED: &str = "This field is required";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Reader,
}

impl Role {
    pub const ALL: &'static [&'static str] = &["admin", "reader"];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub date_joined: Option<String>,
}

impl User {
    /// Label used in activity entries
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.username.as_deref().filter(|n| !n.is_empty()))
            .unwrap_or("User")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRow {
    pub name: String,
    pub position: String,
    pub email: String,
    pub active: String,
    pub start_date: String,
}

/// Write-once: the backend has no update or delete endpoint for users
pub struct Users;

impl Resource for Users {
    type Record = User;
    type Row = UserRow;

    const NAME: &'static str = "users";
    const LABEL: &'static str = "User";

    fn update_path(_id: RecordId) -> Option<String> {
        None
    }

    fn delete_path(_id: RecordId) -> Option<String> {
        None
    }

    fn record_id(record: &User) -> RecordId {
        record.id
    }

    fn display(record: &User, _media: &MediaResolver) -> UserRow {
        UserRow {
            name: or_na(record.username.as_deref()),
            position: or_na(record.role.as_deref()),
            email: or_na(record.email.as_deref()),
            active: yes_no(record.is_active),
            start_date: format_date(record.date_joined.as_deref()),
        }
    }

    fn columns() -> &'static [Column] {
        const COLUMNS: &[Column] = &[
            Column::new("ID", "id"),
            Column::new("Name", "name"),
            Column::new("Position", "position"),
            Column::new("Email", "email"),
            Column::new("Active", "active"),
            Column::new("Start Date", "startDate"),
        ];
        COLUMNS
    }

    fn schema(upload: &UploadConfig) -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::new("first_name", "First Name", FieldKind::Text).required(REQUIRED))
            .field(FieldSpec::new("last_name", "Last Name", FieldKind::Text).required(REQUIRED))
            .field(FieldSpec::new("username", "Username", FieldKind::Text).required(REQUIRED))
            .field(
                FieldSpec::new("role", "Role", FieldKind::Choice(Role::ALL))
                    .required(REQUIRED)
                    .rule(Rule::OneOf(Role::ALL, "Invalid role".to_string())),
            )
            .field(
                FieldSpec::new("email", "Email", FieldKind::Email)
                    .required("Please enter your email")
                    .rule(Rule::Email("Invalid email".to_string())),
            )
            .field(FieldSpec::new("bio", "Bio", FieldKind::Text).required(REQUIRED))
            .field(
                FieldSpec::new("profile_picture", "Profile Picture", FieldKind::File)
                    .required("Profile picture is required")
                    .image(upload),
            )
            .field(
                FieldSpec::new("password", "Password", FieldKind::Password)
                    .required(REQUIRED)
                    .rule(Rule::MinLength(6, "Password must be at least 6 characters".to_string())),
            )
            .field(
                FieldSpec::new("confirm_password", "Confirm Password", FieldKind::Password)
                    .required(REQUIRED)
                    .rule(Rule::Matches("password", "Passwords must match".to_string())),
            )
    }

    fn form_values(record: &User) -> FormValues {
        let mut values = FormValues::new();
        insert_text(&mut values, "first_name", record.first_name.as_deref());
        insert_text(&mut values, "last_name", record.last_name.as_deref());
        insert_text(&mut values, "username", record.username.as_deref());
        insert_text(&mut values, "role", record.role.as_deref());
        insert_text(&mut values, "email", record.email.as_deref());
        insert_text(&mut values, "bio", record.bio.as_deref());
        values
    }
}
