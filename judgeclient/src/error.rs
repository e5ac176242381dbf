use reqwest::StatusCode;

pub type Result<T> = ::std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("Unsupported language id {0}")]
    UnsupportedLanguageId(u32),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Failed to parse as URL '{url}'")]
    InvalidSyntaxUrl {
        url: String,

        #[source]
        source: url::ParseError,
    },

    #[error("Invalid header value for '{0}'")]
    InvalidHeader(&'static str),

    #[error("Judge API responded '{status}' while requesting to {requested_url}")]
    JudgeApi {
        status: StatusCode,
        requested_url: String,
    },

    #[error("Judge is unavailable: {0}")]
    JudgeUnavailable(#[source] reqwest::Error),

    #[error("Cannot decode base64 field '{field}': {source}")]
    InvalidBase64 {
        field: &'static str,

        #[source]
        source: base64::DecodeError,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for errors raised before any request reaches the judge.
    pub fn is_rejected_locally(&self) -> bool {
        use Error::*;
        matches!(
            self,
            UnsupportedLanguage(_)
                | UnsupportedLanguageId(_)
                | MissingCredential(_)
                | InvalidSyntaxUrl { .. }
                | InvalidHeader(_)
        )
    }
}
