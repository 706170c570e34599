use thiserror::Error;

/// Message shown when a submission has neither a prompt nor a source image.
pub const EMPTY_REQUEST_MESSAGE: &str = "Please enter a prompt or upload an image.";

/// Fallback shown when a failure carries no message of its own.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong during generation.";

const ENTITY_NOT_FOUND: &str = "Requested entity was not found";

#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Please enter a prompt or upload an image.")]
    EmptyRequest,

    #[error("A generation is already in progress")]
    GenerationInProgress,

    #[error("API key not configured. Set GEMINI_API_KEY environment variable or run: p2l config set api.key <your-key>")]
    MissingApiKey,

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("No image data returned from Gemini. Please try a different prompt or style.")]
    NoImageReturned,

    #[error("Invalid source image: {0}")]
    InvalidSourceImage(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Style preset table is incomplete: missing {0}")]
    InvalidPresetTable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudioError {
    /// The API rejected the credential for the requested model.
    pub fn is_entity_not_found(&self) -> bool {
        match self {
            StudioError::Api { status, message } => {
                *status == 404 || message.contains(ENTITY_NOT_FOUND)
            }
            _ => false,
        }
    }

    /// Message surfaced to the user in the studio.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}
