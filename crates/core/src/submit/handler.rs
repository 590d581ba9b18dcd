use crate::domain::expense::{parse_amount, ExpenseRecord};
use crate::submit::error::SubmitError;
use crate::submit::ExpenseSubmitter;
use reqwest::StatusCode;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Raw form-control values, captured at the moment a submit intent fires.
#[derive(Debug, Clone)]
pub struct FormFields {
    pub date: String,
    pub amount: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl FormFields {
    /// Builds the wire record from this snapshot. The date travels verbatim;
    /// the optional fields are trimmed and dropped when blank, and an amount
    /// that is not a plain number is dropped rather than failing the
    /// submission.
    pub fn into_record(self) -> ExpenseRecord {
        ExpenseRecord {
            date: self.date,
            amount: self.amount.as_deref().and_then(parse_amount),
            category: self
                .category
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            description: self
                .description
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        }
    }
}

/// Terminal outcome of one submission, delivered to the notifier exactly once.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Success(StatusCode),
    Failed { cause: String },
}

/// The "update the UI" seam. Called exactly once per submit intent, on
/// whichever branch the request settled.
pub trait SubmitNotifier: Send + Sync {
    fn on_success(&self, status: StatusCode);
    fn on_error(&self, error: &SubmitError);
}

/// Notifier that forwards each terminal outcome over a channel so a caller can
/// await the result of its own submission.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<SubmitOutcome>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SubmitOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SubmitNotifier for ChannelNotifier {
    fn on_success(&self, status: StatusCode) {
        let _ = self.tx.send(SubmitOutcome::Success(status));
    }

    fn on_error(&self, error: &SubmitError) {
        let _ = self.tx.send(SubmitOutcome::Failed {
            cause: error.to_string(),
        });
    }
}

/// Bridges form submit intents to a submitter.
///
/// `register` is the explicit startup-phase binding: it takes ownership of the
/// intent stream, so while the binding lives every submit intent is delivered
/// here and nowhere else, and the hosting environment's own submit action never
/// runs. Each intent dispatches its own request; rapid submissions run
/// concurrently and settle in any order without blocking one another.
pub struct SubmitHandler {
    submitter: Arc<dyn ExpenseSubmitter>,
    notifier: Arc<dyn SubmitNotifier>,
}

impl SubmitHandler {
    pub fn new(submitter: Arc<dyn ExpenseSubmitter>, notifier: Arc<dyn SubmitNotifier>) -> Self {
        Self {
            submitter,
            notifier,
        }
    }

    pub fn register(self) -> (FormHandle, FormBinding) {
        let (tx, mut rx) = mpsc::unbounded_channel::<ExpenseRecord>();
        let task = tokio::spawn(async move {
            while let Some(record) = rx.recv().await {
                let submitter = Arc::clone(&self.submitter);
                let notifier = Arc::clone(&self.notifier);
                tokio::spawn(async move {
                    match submitter.submit(&record).await {
                        Ok(status) => notifier.on_success(status),
                        Err(err) => notifier.on_error(&err),
                    }
                });
            }
        });

        (FormHandle { tx }, FormBinding { task })
    }
}

/// Fires submit intents into a registered handler.
#[derive(Debug, Clone)]
pub struct FormHandle {
    tx: mpsc::UnboundedSender<ExpenseRecord>,
}

impl FormHandle {
    /// Fires one submit intent. The wire record is built from the field
    /// snapshot right here, before any suspension point, so the payload
    /// reflects the control values at the moment the intent fired.
    pub fn submit(&self, fields: FormFields) -> anyhow::Result<()> {
        let record = fields.into_record();
        self.tx
            .send(record)
            .map_err(|_| anyhow::anyhow!("submission handler is unbound"))?;
        Ok(())
    }
}

/// Teardown path for a registered handler. Unbinding stops intent dispatch;
/// requests already dispatched run to completion.
pub struct FormBinding {
    task: JoinHandle<()>,
}

impl FormBinding {
    pub fn unbind(self) {
        self.task.abort();
    }
}
