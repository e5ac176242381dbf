pub mod action;
pub mod config;
pub mod judging;
pub mod style;

pub use crate::config::Config;
pub use crate::judging::SubmissionJudge;
