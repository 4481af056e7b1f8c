pub mod form;
pub mod list;

use async_trait::async_trait;

pub use form::{Banner, FormController};
pub use list::{ListController, ListState};

/// Asks the operator to confirm a destructive action
#[async_trait]
pub trait Confirmation: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything (`--yes`)
pub struct AssumeYes;

#[async_trait]
impl Confirmation for AssumeYes {
    async fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}
