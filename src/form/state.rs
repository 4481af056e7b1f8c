use std::collections::{BTreeMap, BTreeSet};

use crate::api::payload::{FieldValue, FormValues};
use crate::form::schema::{FormMode, FormSchema};

/// Values, touched flags and per-field errors for one open form
#[derive(Debug, Clone, Default)]
pub struct FormState {
    values: FormValues,
    touched: BTreeSet<String>,
    errors: BTreeMap<String, String>,
}

impl FormState {
    pub fn new(initial: FormValues) -> Self {
        Self {
            values: initial,
            ..Default::default()
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn error(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    pub fn is_touched(&self, name: &str) -> bool {
        self.touched.contains(name)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Store a value (normalized per field kind). Re-validates touched fields.
    pub fn set(&mut self, schema: &FormSchema, mode: FormMode, name: &str, value: FieldValue) {
        let value = schema.normalize(name, value);
        self.values.insert(name.to_string(), value);
        if self.is_touched(name) {
            self.revalidate(schema, mode, name);
        }
    }

    pub fn clear(&mut self, name: &str) {
        self.values.remove(name);
    }

    /// Mark a field touched and validate it
    pub fn blur(&mut self, schema: &FormSchema, mode: FormMode, name: &str) {
        self.touched.insert(name.to_string());
        self.revalidate(schema, mode, name);
    }

    /// Validate every field, marking all touched. Returns whether the form is valid.
    pub fn validate(&mut self, schema: &FormSchema, mode: FormMode) -> bool {
        self.touched.extend(schema.fields().iter().map(|f| f.name.to_string()));
        self.errors = schema.validate(&self.values, mode);
        self.errors.is_empty()
    }

    /// Merge errors reported by the server
    pub fn apply_server_errors(&mut self, errors: &BTreeMap<String, String>) {
        for (field, message) in errors {
            self.touched.insert(field.clone());
            self.errors.insert(field.clone(), message.clone());
        }
    }

    pub fn reset(&mut self, initial: FormValues) {
        *self = Self::new(initial);
    }

    fn revalidate(&mut self, schema: &FormSchema, mode: FormMode, name: &str) {
        match schema.validate_field(name, &self.values, mode) {
            Some(message) => {
                self.errors.insert(name.to_string(), message);
            }
            None => {
                self.errors.remove(name);
            }
        }
    }
}
