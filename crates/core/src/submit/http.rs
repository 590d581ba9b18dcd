use crate::config::Settings;
use crate::domain::expense::ExpenseRecord;
use crate::submit::error::SubmitError;
use crate::submit::ExpenseSubmitter;
use reqwest::StatusCode;

/// Fixed server route for expense submission.
pub const RECORD_EXPENSE_PATH: &str = "/recordExpense";

const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP submitter behind the expense form.
///
/// Issues exactly one POST per submission and inspects nothing but the
/// response status: exactly 200 is success, everything else is the error
/// branch. The response body is never read, no retry is attempted, and no
/// request timeout is configured; a submission runs until the server answers
/// or the transport gives up.
#[derive(Debug, Clone)]
pub struct RecordExpenseClient {
    http: reqwest::Client,
    base_url: String,
}

impl RecordExpenseClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let base_url = settings
            .api_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }

    fn url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            RECORD_EXPENSE_PATH
        )
    }
}

#[async_trait::async_trait]
impl ExpenseSubmitter for RecordExpenseClient {
    async fn submit(&self, record: &ExpenseRecord) -> Result<StatusCode, SubmitError> {
        let res = self
            .http
            .post(self.url())
            .header("Content-Type", "application/json")
            .json(record)
            .send()
            .await
            .map_err(SubmitError::Transport)?;

        let status = res.status();
        if status == StatusCode::OK {
            Ok(status)
        } else {
            Err(SubmitError::Status(status))
        }
    }
}
