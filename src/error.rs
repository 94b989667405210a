use thiserror::Error;

#[derive(Error, Debug)]
pub enum MesaError {
    #[error("ticket '{0}' not found on the current page")]
    TicketNotFound(String),

    #[error("staff member {0} not found")]
    StaffNotFound(i64),

    #[error("invalid status '{0}'")]
    InvalidStatus(String),

    #[error("invalid priority '{0}'")]
    InvalidPriority(String),

    #[error("invalid urgency '{0}', expected green, yellow or red")]
    InvalidUrgency(String),

    #[error("invalid date '{0}': {1}")]
    InvalidDate(String, String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("API error ({status}): {message}")]
    ApiStatus { status: u16, message: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("board controller has shut down")]
    BoardClosed,

    #[error("{0}")]
    Other(String),
}

impl MesaError {
    /// Whether the failure came from the remote side (as opposed to local
    /// validation or configuration).
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            MesaError::ApiStatus { .. }
                | MesaError::Api(_)
                | MesaError::Http(_)
                | MesaError::Timeout(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, MesaError>;
