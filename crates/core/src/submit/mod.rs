pub mod error;
pub mod handler;
pub mod http;

use crate::domain::expense::ExpenseRecord;
use crate::submit::error::SubmitError;
use reqwest::StatusCode;

/// Seam between the submission handler and whatever carries the record to the
/// server. The returned future resolves exactly once: success carries the
/// accepted status, failure carries its cause.
#[async_trait::async_trait]
pub trait ExpenseSubmitter: Send + Sync {
    async fn submit(&self, record: &ExpenseRecord) -> Result<StatusCode, SubmitError>;
}
