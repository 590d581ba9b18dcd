use reqwest::StatusCode;
use std::fmt;

/// Terminal failure of one expense submission.
///
/// The two variants are the whole taxonomy: either the server answered with
/// something other than 200, or the request never produced a response at all.
#[derive(Debug)]
pub enum SubmitError {
    Status(StatusCode),
    Transport(reqwest::Error),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Status(status) => write!(f, "record-expense HTTP {status}"),
            SubmitError::Transport(err) => write!(f, "record-expense transport failure: {err}"),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::Status(_) => None,
            SubmitError::Transport(err) => Some(err),
        }
    }
}
