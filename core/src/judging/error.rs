pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("No test cases to run")]
    NoTestCases,

    #[error("Judge error: {0}")]
    Judge(#[from] chill_judgeclient::Error),
}
