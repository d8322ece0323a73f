use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("response decode error for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: reqwest::Error,
    },
}
