use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{ApiError, FailureKind};

/// A file chosen for upload
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its type from the extension
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_guess::from_path(path).first_or_octet_stream();
        Ok(Self::new(file_name, mime_type.essence_str(), bytes))
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// One form field's value as it will be sent
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    List(Vec<String>),
    File(FileUpload),
}

impl FieldValue {
    /// Empty strings, empty lists and `false` all count as "not filled in"
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Bool(b) => !b,
            FieldValue::List(items) => items.is_empty(),
            FieldValue::File(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileUpload> {
        match self {
            FieldValue::File(f) => Some(f),
            _ => None,
        }
    }
}

/// Field name to value, in a stable order
pub type FormValues = BTreeMap<String, FieldValue>;

/// Request body for create/update calls
#[derive(Debug)]
pub enum Payload {
    Json(Value),
    Multipart(Vec<MultipartEntry>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum MultipartEntry {
    Text { name: String, value: String },
    File { name: String, file: FileUpload },
}

impl Payload {
    /// Assemble the body. Multipart forms send lists as repeated same-named
    /// parts; JSON bodies send them as arrays. A file only appears if one was
    /// chosen, so an update never overwrites a stored file with nothing.
    pub fn build(values: &FormValues, multipart: bool) -> Result<Payload, ApiError> {
        if multipart {
            let mut entries = Vec::new();
            for (name, value) in values {
                match value {
                    FieldValue::Text(s) => entries.push(MultipartEntry::Text {
                        name: name.clone(),
                        value: s.clone(),
                    }),
                    FieldValue::Bool(b) => entries.push(MultipartEntry::Text {
                        name: name.clone(),
                        value: b.to_string(),
                    }),
                    FieldValue::List(items) => {
                        for item in items {
                            entries.push(MultipartEntry::Text {
                                name: name.clone(),
                                value: item.clone(),
                            });
                        }
                    }
                    FieldValue::File(file) => entries.push(MultipartEntry::File {
                        name: name.clone(),
                        file: file.clone(),
                    }),
                }
            }
            return Ok(Payload::Multipart(entries));
        }

        let mut body = Map::new();
        for (name, value) in values {
            let json = match value {
                FieldValue::Text(s) => Value::String(s.clone()),
                FieldValue::Bool(b) => Value::Bool(*b),
                FieldValue::List(items) => Value::Array(items.iter().cloned().map(Value::String).collect()),
                FieldValue::File(_) => {
                    return Err(ApiError::request_failed(
                        FailureKind::Transport,
                        None,
                        format!("Field '{}' holds a file and cannot be sent as JSON", name),
                    ))
                }
            };
            body.insert(name.clone(), json);
        }
        Ok(Payload::Json(Value::Object(body)))
    }

    pub fn field_names(&self) -> Vec<&str> {
        match self {
            Payload::Json(Value::Object(map)) => map.keys().map(String::as_str).collect(),
            Payload::Json(_) => Vec::new(),
            Payload::Multipart(entries) => entries
                .iter()
                .map(|e| match e {
                    MultipartEntry::Text { name, .. } | MultipartEntry::File { name, .. } => name.as_str(),
                })
                .collect(),
        }
    }

    pub fn into_form(entries: Vec<MultipartEntry>) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for entry in entries {
            form = match entry {
                MultipartEntry::Text { name, value } => form.text(name, value),
                MultipartEntry::File { name, file } => {
                    let part = Part::bytes(file.bytes)
                        .file_name(file.file_name)
                        .mime_str(&file.mime_type)
                        .map_err(|e| {
                            ApiError::request_failed(
                                FailureKind::Transport,
                                None,
                                format!("Invalid file type '{}': {}", file.mime_type, e),
                            )
                        })?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
