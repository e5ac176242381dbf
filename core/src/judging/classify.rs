use chill_judgeclient::{status_id, ExecutionResult};

use super::result::*;

pub const POLLING_TIMEOUT: &str = "Polling Timeout";
pub const SYSTEM_ERROR: &str = "System Error";

/// Only leading/trailing whitespace is ignored. Internal whitespace, per-line
/// trailing spaces and line endings must match exactly.
pub fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim() == expected.trim()
}

/// Maps one judge result plus the expected output into a `TestCaseResult`.
///
/// A result still reported as "In Queue"/"Processing" can only reach here when
/// polling ran out of attempts, so it is labelled `Polling Timeout`.
pub fn classify(res: &ExecutionResult, input: &str, expected_output: &str) -> TestCaseResult {
    let id = res.status.id;
    let description = res.status.description.as_str();

    let decoded = match id {
        status_id::ACCEPTED | status_id::WRONG_ANSWER => res.decoded_stdout(),
        status_id::COMPILATION_ERROR => res.decoded_compile_output(),
        id if status_id::is_runtime_error(id) => res.decoded_stderr(),
        _ => Ok(String::new()),
    };
    let actual_output = match decoded {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Cannot decode judge output (token={}): {}", res.token, e);
            return system_error(input, expected_output);
        }
    };

    let (passed, status, outcome) = match id {
        status_id::ACCEPTED if outputs_match(&actual_output, expected_output) => {
            (true, description.to_owned(), Outcome::Accepted)
        }
        status_id::ACCEPTED | status_id::WRONG_ANSWER => {
            (false, "Wrong Answer".to_owned(), Outcome::WrongAnswer)
        }
        status_id::TIME_LIMIT_EXCEEDED => {
            (false, description.to_owned(), Outcome::TimeLimitExceeded)
        }
        status_id::COMPILATION_ERROR => (false, description.to_owned(), Outcome::CompilationError),
        id if status_id::is_runtime_error(id) => {
            (false, description.to_owned(), Outcome::RuntimeError)
        }
        id if status_id::is_pending(id) => (false, POLLING_TIMEOUT.to_owned(), Outcome::Unknown),
        _ => (false, description.to_owned(), Outcome::Unknown),
    };

    TestCaseResult {
        input: input.to_owned(),
        expected_output: expected_output.to_owned(),
        actual_output,
        passed,
        execution_time_ms: res.time_ms(),
        memory_used_kb: res.memory_kb(),
        status,
        outcome,
    }
}

pub fn system_error(input: &str, expected_output: &str) -> TestCaseResult {
    TestCaseResult {
        input: input.to_owned(),
        expected_output: expected_output.to_owned(),
        actual_output: String::new(),
        passed: false,
        execution_time_ms: 0.0,
        memory_used_kb: 0,
        status: SYSTEM_ERROR.to_owned(),
        outcome: Outcome::SystemError,
    }
}
