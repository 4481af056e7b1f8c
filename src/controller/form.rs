use crate::api::payload::{FieldValue, FileUpload, FormValues};
use crate::api::resource::{Resource, ResourceClient};
use crate::config::UploadConfig;
use crate::error::ApiError;
use crate::form::{FormMode, FormSchema, FormState};

/// Form-level feedback shown above the fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

/// Drives one create or edit form for a resource
pub struct FormController<R: Resource> {
    client: ResourceClient<R>,
    schema: FormSchema,
    mode: FormMode,
    state: FormState,
    banner: Option<Banner>,
}

impl<R: Resource> FormController<R> {
    pub fn new(client: ResourceClient<R>, upload: &UploadConfig, mode: FormMode) -> Self {
        Self {
            client,
            schema: R::schema(upload),
            mode,
            state: FormState::default(),
            banner: None,
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.state.set(&self.schema, self.mode, name, value);
    }

    pub fn set_text(&mut self, name: &str, value: impl Into<String>) {
        self.set(name, FieldValue::Text(value.into()));
    }

    pub fn blur(&mut self, name: &str) {
        self.state.blur(&self.schema, self.mode, name);
    }

    /// Attach a chosen file to a file field
    pub fn attach(&mut self, name: &str, file: FileUpload) {
        self.set(name, FieldValue::File(file));
    }

    /// Drop a chosen file; on edit the stored one is kept
    pub fn detach(&mut self, name: &str) {
        self.state.clear(name);
    }

    pub fn validate(&mut self) -> bool {
        self.state.validate(&self.schema, self.mode)
    }

    /// Prefill an edit form from a record already in hand
    pub fn prefill(&mut self, record: &R::Record) {
        self.state.reset(R::form_values(record));
    }

    /// Fetch the record being edited and prefill from it
    pub async fn load(&mut self) -> Result<(), ApiError> {
        let Some(id) = self.mode.record_id() else {
            return Ok(());
        };
        match self.client.find(id).await {
            Ok(record) => {
                self.prefill(&record);
                Ok(())
            }
            Err(err) => {
                if !matches!(err, ApiError::Cancelled) {
                    self.banner = Some(Banner::Error(format!("Failed to load {} data.", R::LABEL.to_lowercase())));
                }
                Err(err)
            }
        }
    }

    /// Validate, then create or update.
    ///
    /// A form that fails local validation never reaches the network. On
    /// success the fields are reset (an edit form keeps the saved values,
    /// minus any chosen file).
    pub async fn submit(&mut self) -> Result<R::Record, ApiError> {
        if !self.validate() {
            let errors = self.state.errors().clone();
            tracing::debug!("{} form blocked by {} invalid field(s)", R::LABEL, errors.len());
            self.banner = None;
            return Err(ApiError::validation_failed("Please correct the highlighted fields", errors));
        }

        let result = match self.mode {
            FormMode::Create => self.client.create(self.state.values()).await,
            FormMode::Edit(id) => self.client.update(id, self.state.values()).await,
        };

        match result {
            Ok(record) => {
                let (initial, verb) = match self.mode {
                    FormMode::Create => (FormValues::new(), "added"),
                    FormMode::Edit(_) => (R::form_values(&record), "updated"),
                };
                self.state.reset(initial);
                self.banner = Some(Banner::Success(format!("{} {} successfully!", R::LABEL, verb)));
                Ok(record)
            }
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(err) => {
                if let Some(fields) = err.field_errors() {
                    self.state.apply_server_errors(fields);
                }
                self.banner = Some(Banner::Error(err.user_message()));
                Err(err)
            }
        }
    }
}
