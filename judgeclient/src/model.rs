use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::*;

/// Body of `POST /submissions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub source_code: String,
    pub language_id: u32,
    pub stdin: String,
    pub cpu_time_limit: f64,
    pub memory_limit: u32,
    pub base64_encoded: bool,
}

impl ExecutionRequest {
    /// Builds a request with `source_code` and `stdin` base64-encoded.
    pub fn new(source_code: &str, stdin: &str, language_id: u32, limits: Limits) -> Self {
        Self {
            source_code: encode(source_code),
            language_id,
            stdin: encode(stdin),
            cpu_time_limit: limits.cpu_time_limit_secs,
            memory_limit: limits.memory_limit_kb,
            base64_encoded: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Limits {
    pub cpu_time_limit_secs: f64,
    pub memory_limit_kb: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            cpu_time_limit_secs: 2.0,
            memory_limit_kb: 128000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionToken {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub id: u32,
    pub description: String,
}

/// Response of `GET /submissions/{token}?base64_encoded=true`.
/// Text fields stay base64 until decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    #[serde(default)]
    pub token: String,
    pub status: Status,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub compile_output: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub memory: Option<u64>,
}

pub mod status_id {
    pub const IN_QUEUE: u32 = 1;
    pub const PROCESSING: u32 = 2;
    pub const ACCEPTED: u32 = 3;
    pub const WRONG_ANSWER: u32 = 4;
    pub const TIME_LIMIT_EXCEEDED: u32 = 5;
    pub const COMPILATION_ERROR: u32 = 6;
    pub const RUNTIME_ERROR_SIGSEGV: u32 = 7;
    pub const RUNTIME_ERROR_NZEC: u32 = 11;
    pub const RUNTIME_ERROR_OTHER: u32 = 12;
    pub const INTERNAL_ERROR: u32 = 13;
    pub const EXEC_FORMAT_ERROR: u32 = 14;

    pub const fn is_pending(id: u32) -> bool {
        matches!(id, IN_QUEUE | PROCESSING)
    }

    pub const fn is_runtime_error(id: u32) -> bool {
        RUNTIME_ERROR_SIGSEGV <= id && id <= RUNTIME_ERROR_OTHER
    }
}

impl ExecutionResult {
    pub fn is_pending(&self) -> bool {
        status_id::is_pending(self.status.id)
    }

    pub fn decoded_stdout(&self) -> Result<String> {
        decode_field("stdout", self.stdout.as_deref())
    }

    pub fn decoded_stderr(&self) -> Result<String> {
        decode_field("stderr", self.stderr.as_deref())
    }

    pub fn decoded_compile_output(&self) -> Result<String> {
        decode_field("compile_output", self.compile_output.as_deref())
    }

    /// Judge-reported time in milliseconds, 0 when absent or unparsable.
    pub fn time_ms(&self) -> f64 {
        self.time
            .as_deref()
            .and_then(|t| t.trim().parse::<f64>().ok())
            .map(|secs| secs * 1000.0)
            .unwrap_or(0.0)
    }

    pub fn memory_kb(&self) -> u64 {
        self.memory.unwrap_or(0)
    }
}

pub fn encode(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Judge0 wraps base64 lines at 60 columns, so whitespace is dropped before decoding.
pub fn decode(encoded: &str) -> std::result::Result<String, base64::DecodeError> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn decode_field(field: &'static str, value: Option<&str>) -> Result<String> {
    match value {
        None => Ok(String::new()),
        Some(v) => decode(v).map_err(|source| Error::InvalidBase64 { field, source }),
    }
}
