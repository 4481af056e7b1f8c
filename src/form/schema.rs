use std::collections::BTreeMap;

use crate::api::payload::{FieldValue, FormValues};
use crate::api::resource::RecordId;
use crate::config::UploadConfig;
use crate::form::slug;

/// Whether a form creates a record or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(RecordId),
}

impl FormMode {
    pub fn record_id(&self) -> Option<RecordId> {
        match self {
            FormMode::Create => None,
            FormMode::Edit(id) => Some(*id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rewritten through [`slug::transform`] on every edit
    Slug,
    Email,
    Password,
    Choice(&'static [&'static str]),
    /// A single foreign id picked from another resource
    Relation,
    /// A set of foreign ids (news tags)
    RelationSet,
    Flag,
    /// Rich-text body, stored as HTML
    Html,
    Date,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required(String),
    /// Required only when creating; edits keep whatever is stored
    RequiredOnCreate(String),
    Email(String),
    MinLength(usize, String),
    OneOf(&'static [&'static str], String),
    /// Must equal the value of another field (password confirmation)
    Matches(&'static str, String),
    MinItems(usize, String),
    MaxFileSize(u64, String),
    FileTypes(Vec<String>, String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub rules: Vec<Rule>,
}

impl FieldSpec {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            rules: Vec::new(),
        }
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn required(self, message: impl Into<String>) -> Self {
        self.rule(Rule::Required(message.into()))
    }

    /// At most `max_image_bytes` and one of the allowed image types
    pub fn image(self, upload: &UploadConfig) -> Self {
        let megabytes = upload.max_image_bytes / (1024 * 1024);
        self.rule(Rule::MaxFileSize(
                upload.max_image_bytes,
                format!("File too large (max {}MB)", megabytes),
            ))
            .rule(Rule::FileTypes(upload.allowed_image_types.clone(), "Unsupported format".to_string()))
    }

    /// First failing rule's message for this field, if any
    pub fn check(&self, values: &FormValues, mode: FormMode) -> Option<String> {
        let value = values.get(self.name);
        let blank = value.map(FieldValue::is_blank).unwrap_or(true);

        for rule in &self.rules {
            let failure = match rule {
                Rule::Required(msg) => blank.then(|| msg.clone()),
                Rule::RequiredOnCreate(msg) => (blank && mode == FormMode::Create).then(|| msg.clone()),
                Rule::MinItems(min, msg) => match value {
                    Some(FieldValue::List(items)) if items.len() >= *min => None,
                    _ => Some(msg.clone()),
                },
                _ if blank => None,
                Rule::Email(msg) => value
                    .and_then(FieldValue::as_text)
                    .filter(|text| !looks_like_email(text))
                    .map(|_| msg.clone()),
                Rule::MinLength(min, msg) => value
                    .and_then(FieldValue::as_text)
                    .filter(|text| text.chars().count() < *min)
                    .map(|_| msg.clone()),
                Rule::OneOf(allowed, msg) => value
                    .and_then(FieldValue::as_text)
                    .filter(|text| !allowed.contains(text))
                    .map(|_| msg.clone()),
                Rule::Matches(other, msg) => (values.get(*other) != value).then(|| msg.clone()),
                Rule::MaxFileSize(max, msg) => value
                    .and_then(FieldValue::as_file)
                    .filter(|file| file.size() > *max)
                    .map(|_| msg.clone()),
                Rule::FileTypes(types, msg) => match value {
                    Some(FieldValue::File(file)) if types.iter().any(|t| t == &file.mime_type) => None,
                    _ => Some(msg.clone()),
                },
            };
            if failure.is_some() {
                return failure;
            }
        }

        None
    }
}

/// A single `local@domain.tld` with no whitespace
fn looks_like_email(text: &str) -> bool {
    let text = text.trim();
    if text.chars().any(char::is_whitespace) {
        return false;
    }
    match text.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}

/// Ordered field list for one resource's form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSchema {
    fields: Vec<FieldSpec>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Forms with a file field are sent as multipart
    pub fn has_file_field(&self) -> bool {
        self.fields.iter().any(|f| f.kind == FieldKind::File)
    }

    /// Apply per-kind input normalization (slug rewriting)
    pub fn normalize(&self, name: &str, value: FieldValue) -> FieldValue {
        match (self.get(name).map(|f| &f.kind), value) {
            (Some(FieldKind::Slug), FieldValue::Text(text)) => FieldValue::Text(slug::transform(&text)),
            (_, value) => value,
        }
    }

    pub fn validate_field(&self, name: &str, values: &FormValues, mode: FormMode) -> Option<String> {
        self.get(name).and_then(|spec| spec.check(values, mode))
    }

    pub fn validate(&self, values: &FormValues, mode: FormMode) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .filter_map(|spec| spec.check(values, mode).map(|msg| (spec.name.to_string(), msg)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::payload::FileUpload;

    fn text(s: &str) -> FieldValue {
        FieldValue::Text(s.to_string())
    }

    fn schema() -> FormSchema {
        FormSchema::new()
            .field(FieldSpec::new("slug", "Slug", FieldKind::Slug).required("Slug is required"))
            .field(
                FieldSpec::new("email", "Email", FieldKind::Email)
                    .required("Please enter your email")
                    .rule(Rule::Email("Invalid email".to_string())),
            )
            .field(
                FieldSpec::new("password", "Password", FieldKind::Password)
                    .required("Password is required")
                    .rule(Rule::MinLength(6, "Password must be at least 6 characters".to_string())),
            )
            .field(
                FieldSpec::new("confirm_password", "Confirm Password", FieldKind::Password)
                    .required("Confirm Password is required")
                    .rule(Rule::Matches("password", "Passwords must match".to_string())),
            )
            .field(
                FieldSpec::new("image", "Image", FieldKind::File)
                    .required("Image is required")
                    .image(&UploadConfig::default()),
            )
    }

    #[test]
    fn reports_first_failing_rule_per_field() {
        let mut values = FormValues::new();
        values.insert("email".to_string(), text("not-an-email"));
        values.insert("password".to_string(), text("abc"));
        values.insert("confirm_password".to_string(), text("abd"));

        let errors = schema().validate(&values, FormMode::Create);
        assert_eq!(errors["slug"], "Slug is required");
        assert_eq!(errors["email"], "Invalid email");
        assert_eq!(errors["password"], "Password must be at least 6 characters");
        assert_eq!(errors["confirm_password"], "Passwords must match");
        assert_eq!(errors["image"], "Image is required");
    }

    #[test]
    fn image_rules_check_size_then_type() {
        let schema = schema();
        let mut values = FormValues::new();

        values.insert(
            "image".to_string(),
            FieldValue::File(FileUpload::new("big.png", "image/png", vec![0; 5 * 1024 * 1024 + 1])),
        );
        assert_eq!(
            schema.validate_field("image", &values, FormMode::Create).as_deref(),
            Some("File too large (max 5MB)")
        );

        values.insert("image".to_string(), FieldValue::File(FileUpload::new("a.gif", "image/gif", vec![0; 10])));
        assert_eq!(schema.validate_field("image", &values, FormMode::Create).as_deref(), Some("Unsupported format"));

        values.insert("image".to_string(), FieldValue::File(FileUpload::new("a.webp", "image/webp", vec![0; 10])));
        assert_eq!(schema.validate_field("image", &values, FormMode::Create), None);
    }

    #[test]
    fn required_on_create_is_skipped_when_editing() {
        let schema = FormSchema::new().field(
            FieldSpec::new("image", "Image", FieldKind::File).rule(Rule::RequiredOnCreate("Image required".to_string())),
        );
        let values = FormValues::new();
        assert_eq!(schema.validate_field("image", &values, FormMode::Create).as_deref(), Some("Image required"));
        assert_eq!(schema.validate_field("image", &values, FormMode::Edit(RecordId(3))), None);
    }

    #[test]
    fn normalize_rewrites_slugs_only() {
        let schema = schema();
        assert_eq!(schema.normalize("slug", text("Hello World!")), text("hello-world"));
        assert_eq!(schema.normalize("email", text("A@B.COM")), text("A@B.COM"));
        assert!(schema.has_file_field());
    }

    #[test]
    fn email_shape() {
        assert!(looks_like_email("editor@outlinekerala.com"));
        assert!(!looks_like_email("editor@localhost"));
        assert!(!looks_like_email("a b@c.com"));
        assert!(!looks_like_email("@c.com"));
    }
}
