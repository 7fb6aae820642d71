use thiserror::Error;

/// Shown when a failure carries no message of its own.
pub const FALLBACK_MESSAGE: &str = "Transmission failed.";

/// Everything that can go wrong between pressing submit and the record
/// landing in the remote table. All variants reach the user the same way:
/// as plain text in the status element.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Remote sink is not configured. Set the project URL and access key.")]
    NotConfigured,

    #[error("{message}")]
    Remote { status: u16, message: String },

    #[error("{0}")]
    Transport(String),

    #[error("could not encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

impl SubmitError {
    pub fn status_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}
