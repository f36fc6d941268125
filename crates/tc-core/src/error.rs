use thiserror::Error;

pub type Result<T> = std::result::Result<T, TcError>;

#[derive(Debug, Error)]
pub enum TcError {
    /// Request payload could not be understood
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The shaping tool ran but exited non-zero
    #[error("`{command}` failed ({status}): {output}")]
    ExternalTool {
        command: String,
        status: String,
        output: String,
    },

    /// `tcshow` printed something that is not a settings document
    #[error("malformed tcshow output for {iface}: {reason}")]
    MalformedOutput { iface: String, reason: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TcError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn is_external_tool(&self) -> bool {
        matches!(self, Self::ExternalTool { .. })
    }
}
