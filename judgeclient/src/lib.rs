// exported modules
pub mod error;
pub mod executor;
pub mod http;
pub mod judge0;
pub mod language;
pub mod model;

// re-exports
pub use error::*;
pub use executor::{Executor, PollPolicy, Sleeper, TokioSleeper};
pub use judge0::{Judge, Judge0Client, Judge0Config};
pub use language::{Language, LanguageEntry, LanguageTable};
pub use model::*;
pub use reqwest::StatusCode;
