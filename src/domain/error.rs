// Acquisition error taxonomy
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AcquisitionError {
    /// A required connection field is empty. Only user input resolves it.
    #[error("configuration incomplete: {field} is required")]
    Configuration { field: String },

    /// Transport failure (`status` is `None`) or a non-success HTTP status.
    #[error("fetch failed{}: {message}", status_suffix(.status))]
    Fetch { status: Option<u16>, message: String },

    /// The initial load succeeded but the span holds no readings.
    #[error("no readings in the selected span")]
    EmptyResult,
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {}", s)).unwrap_or_default()
}

impl AcquisitionError {
    pub fn fetch(status: Option<u16>, message: impl Into<String>) -> Self {
        AcquisitionError::Fetch {
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> NoticeKind {
        match self {
            AcquisitionError::Configuration { .. } => NoticeKind::Configuration,
            AcquisitionError::Fetch { .. } => NoticeKind::Fetch,
            AcquisitionError::EmptyResult => NoticeKind::NoData,
        }
    }

    /// Whether a manual retry may help.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AcquisitionError::Fetch { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    Configuration,
    Fetch,
    NoData,
}

/// An error recovered at the acquisition boundary, as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub retryable: bool,
}

impl From<&AcquisitionError> for Notice {
    fn from(error: &AcquisitionError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        }
    }
}
