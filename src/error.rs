use thiserror::Error;

#[derive(Error, Debug)]
pub enum LiveroomError {
    #[error("API error ({status}): {detail}")]
    Api { status: u16, detail: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not logged in. Run `liveroom login` first")]
    NotLoggedIn,

    #[error("This command needs the {expected} role, but you are signed in as {actual}")]
    WrongRole { expected: String, actual: String },

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("{message}: {source}")]
    Context {
        message: String,
        #[source]
        source: Box<LiveroomError>,
    },
}

pub type Result<T> = std::result::Result<T, LiveroomError>;
