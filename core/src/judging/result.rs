use serde::{Deserialize, Serialize};

/// Classification of a single test-case run, used to pick the overall verdict.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    #[strum(serialize = "AC")]
    Accepted,
    #[strum(serialize = "WA")]
    WrongAnswer,
    #[strum(serialize = "TLE")]
    TimeLimitExceeded,
    #[strum(serialize = "CE")]
    CompilationError,
    #[strum(serialize = "RE")]
    RuntimeError,
    #[strum(serialize = "??")]
    Unknown,
    #[strum(serialize = "SE")]
    SystemError,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResult {
    pub input: String,
    pub expected_output: String,
    pub actual_output: String,
    pub passed: bool,
    pub execution_time_ms: f64,
    #[serde(rename = "memoryUsedKB")]
    pub memory_used_kb: u64,
    /// Human label, e.g. "Accepted", "Runtime Error (NZEC)", "System Error".
    pub status: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionStatus {
    Accepted,
    WrongAnswer,
    TimeLimitExceeded,
    RuntimeError,
    CompilationError,
    Pending,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub status: SubmissionStatus,
    pub test_results: Vec<TestCaseResult>,
    /// Integer percentage of passed test cases.
    pub total_score: u32,
    /// Sum of per-test execution times, in milliseconds.
    pub execution_time: f64,
    /// Peak of per-test memory usage, in KB.
    pub memory_used: u64,
    pub passed_test_cases: u32,
    pub total_test_cases: u32,
}

impl SubmissionResult {
    pub fn is_accepted(&self) -> bool {
        self.status == SubmissionStatus::Accepted
    }
}

/// Output of a single "Run" with custom stdin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutput {
    pub status: String,
    pub status_id: u32,
    pub stdout: String,
    pub stderr: String,
    pub compile_output: String,
    pub execution_time_ms: f64,
    #[serde(rename = "memoryUsedKB")]
    pub memory_used_kb: u64,
}
