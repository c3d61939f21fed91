use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnhanceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("failed to parse {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("model returned no text")]
    EmptyResponse,
}
