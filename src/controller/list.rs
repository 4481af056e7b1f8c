use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::api::client::ApiClient;
use crate::api::resource::{to_rows, DisplayRow, RecordId, Resource, ResourceClient};
use crate::config::AppConfig;
use crate::controller::form::FormController;
use crate::controller::Confirmation;
use crate::error::ApiError;
use crate::form::FormMode;
use crate::session::{Navigator, TokenStore};

#[derive(Debug, Clone, PartialEq)]
pub enum ListState<Row> {
    /// No session yet, or the session ended
    Idle,
    Loading,
    Loaded(Vec<DisplayRow<Row>>),
    Failed(String),
}

impl<Row> ListState<Row> {
    pub fn rows(&self) -> Option<&[DisplayRow<Row>]> {
        match self {
            ListState::Loaded(rows) => Some(rows),
            _ => None,
        }
    }
}

/// One list screen: guard, fetch, render, refetch after every mutation.
///
/// Every request made through the controller is tied to its cancellation
/// token; [`ListController::teardown`] aborts whatever is still in flight.
pub struct ListController<R: Resource> {
    config: AppConfig,
    store: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    cancel: CancellationToken,
    client: Option<ResourceClient<R>>,
    state: ListState<R::Row>,
    /// Raw records behind the rows of the last successful load
    records: Vec<R::Record>,
}

impl<R: Resource> ListController<R> {
    pub fn new(config: AppConfig, store: Arc<dyn TokenStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            config,
            store,
            navigator,
            cancel: CancellationToken::new(),
            client: None,
            state: ListState::Idle,
            records: Vec::new(),
        }
    }

    pub fn state(&self) -> &ListState<R::Row> {
        &self.state
    }

    /// Token cancelled by teardown, for callers that tear down from elsewhere
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn client(&self) -> Option<&ResourceClient<R>> {
        self.client.as_ref()
    }

    /// Run the session guard and bind a client. Sends nothing.
    pub fn activate(&mut self) -> Result<&ResourceClient<R>, ApiError> {
        if self.client.is_none() {
            let api = ApiClient::connect(&self.config, self.store.clone(), self.navigator.clone())?
                .with_cancellation(self.cancel.clone());
            self.client = Some(ResourceClient::new(api));
        }
        self.client.as_ref().ok_or(ApiError::NoSession)
    }

    /// Activate and load the first page of rows
    pub async fn mount(&mut self) -> Result<(), ApiError> {
        if let Err(err) = self.activate() {
            self.state = ListState::Idle;
            return Err(err);
        }
        self.refresh().await
    }

    /// Full refetch. Failures land in the state; nothing is retried.
    pub async fn refresh(&mut self) -> Result<(), ApiError> {
        let client = self.activate()?.clone();
        let previous = std::mem::replace(&mut self.state, ListState::Loading);

        match client.fetch_all().await {
            Ok(records) => {
                self.state = ListState::Loaded(to_rows::<R>(&records, client.api().media()));
                self.records = records;
                Ok(())
            }
            Err(ApiError::Cancelled) => {
                self.state = previous;
                Err(ApiError::Cancelled)
            }
            Err(err) if err.is_session_error() => {
                self.end_session();
                Err(err)
            }
            Err(err) => {
                tracing::warn!("Failed to load {}: {}", R::NAME, err);
                self.state = ListState::Failed(err.user_message());
                Err(err)
            }
        }
    }

    /// Blank create form sharing this screen's client
    pub fn create_form(&mut self) -> Result<FormController<R>, ApiError> {
        let client = self.activate()?.clone();
        Ok(FormController::new(client, &self.config.upload, FormMode::Create))
    }

    /// Edit form for one record.
    ///
    /// Prefilled from the listed record when it is on screen; resources with
    /// a detail endpoint always fetch it. Resources without an update
    /// endpoint fail before anything is sent.
    pub async fn edit_form(&mut self, id: RecordId) -> Result<FormController<R>, ApiError> {
        if R::update_path(id).is_none() {
            return Err(ApiError::unsupported(R::NAME, "update"));
        }
        let client = self.activate()?.clone();
        let mut form = FormController::new(client, &self.config.upload, FormMode::Edit(id));

        let listed = if R::HAS_DETAIL_ENDPOINT {
            None
        } else {
            self.records.iter().find(|record| R::record_id(record) == id)
        };
        if let Some(record) = listed {
            form.prefill(record);
            return Ok(form);
        }

        if let Err(err) = form.load().await {
            if err.is_session_error() {
                self.end_session();
            }
            return Err(err);
        }
        Ok(form)
    }

    /// Raw records behind the currently loaded rows
    pub fn records(&self) -> &[R::Record] {
        &self.records
    }

    /// Submit a form, then refetch the list
    pub async fn save(&mut self, form: &mut FormController<R>) -> Result<R::Record, ApiError> {
        match form.submit().await {
            Ok(record) => {
                self.refetch_after_mutation().await;
                Ok(record)
            }
            Err(err) => {
                if err.is_session_error() {
                    self.end_session();
                }
                Err(err)
            }
        }
    }

    /// Delete one record after confirmation. Returns whether anything was deleted.
    pub async fn remove(&mut self, id: RecordId, confirmation: &dyn Confirmation) -> Result<bool, ApiError> {
        let client = self.activate()?.clone();

        let prompt = format!("Are you sure you want to delete this {}?", R::LABEL.to_lowercase());
        if !confirmation.confirm(&prompt).await {
            tracing::debug!("Delete of {} {} declined", R::LABEL, id);
            return Ok(false);
        }

        match client.remove(id).await {
            Ok(()) => {
                self.refetch_after_mutation().await;
                Ok(true)
            }
            Err(err) => {
                if err.is_session_error() {
                    self.end_session();
                }
                Err(err)
            }
        }
    }

    /// Abort in-flight requests and return to `Idle`. A later mount starts
    /// over with a fresh cancellation scope.
    pub fn teardown(&mut self) {
        self.cancel.cancel();
        self.cancel = CancellationToken::new();
        self.client = None;
        self.state = ListState::Idle;
        self.records.clear();
        tracing::debug!("{} list torn down", R::NAME);
    }

    async fn refetch_after_mutation(&mut self) {
        // The mutation already went through; a failed refetch is reported via state
        if let Err(err) = self.refresh().await {
            tracing::debug!("Refetch of {} after mutation failed: {}", R::NAME, err);
        }
    }

    fn end_session(&mut self) {
        self.client = None;
        self.state = ListState::Idle;
        self.records.clear();
    }
}
