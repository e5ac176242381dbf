use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use chill_judgeclient::{Judge0Config, LanguageTable, Limits, PollPolicy};
use rust_embed::RustEmbed;
use serde::{de, Deserialize, Deserializer};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub judge: JudgeConfig,
    #[serde(default)]
    pub submit: SubmitConfig,
    /// Language ids added to (or overriding) the built-in table.
    #[serde(default)]
    pub languages: BTreeMap<String, u32>,
    #[serde(default, rename = "lang")]
    pub lang_rules: Vec<LangRule>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JudgeConfig {
    pub base_url: String,
    pub host: String,
    #[serde(default)]
    pub request_interval_ms: u64,
    /// 0 disables the timeout.
    #[serde(default = "JudgeConfig::default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub polling: PollingConfig,
}

impl JudgeConfig {
    pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

    fn default_request_timeout_ms() -> u64 {
        Self::DEFAULT_REQUEST_TIMEOUT_MS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub cpu_time_limit_secs: f64,
    pub memory_limit_kb: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let Limits {
            cpu_time_limit_secs,
            memory_limit_kb,
        } = Limits::default();
        Self {
            cpu_time_limit_secs,
            memory_limit_kb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        let p = PollPolicy::default();
        Self {
            interval_ms: p.interval.as_millis() as u64,
            max_attempts: p.max_attempts,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubmitConfig {
    pub concurrency: usize,
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self { concurrency: 1 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LangRule {
    #[serde(deserialize_with = "deserialize_glob")]
    pub pattern: glob::Pattern,
    pub lang: String,
}

fn deserialize_glob<'de, D>(deserializer: D) -> StdResult<glob::Pattern, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    glob::Pattern::new(&s).map_err(de::Error::custom)
}

/// Secrets, read from the environment only.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub judge_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("judge_api_key", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub const ENV_PREFIX: &str = "CHILL_";

    pub fn from_env() -> anyhow::Result<Self> {
        envy::prefixed(Self::ENV_PREFIX)
            .from_env::<Self>()
            .context("Judge API key is not set (export CHILL_JUDGE_API_KEY)")
    }
}

fn millis(ms: u64) -> Option<Duration> {
    (ms > 0).then(|| Duration::from_millis(ms))
}

#[derive(RustEmbed)]
#[folder = "assets/"]
struct Asset;

impl Config {
    pub const FILENAME: &str = "chill.toml";

    pub fn example_toml() -> String {
        Asset::get(Self::FILENAME)
            .map(|file| String::from_utf8_lossy(file.data.as_ref()).into_owned())
            .unwrap_or_default()
    }

    pub fn example() -> anyhow::Result<Self> {
        Self::from_toml(&Self::example_toml()).context("Embedded example config is broken")
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// Uses the nearest `chill.toml` in `cur_dir` or its ancestors, else the embedded example.
    pub fn from_file_finding_in_ancestors(cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        match fsutil::find_file_in_ancestors(cur_dir, Self::FILENAME) {
            Ok(path) => {
                log::debug!("Using config {}", path.to_string_lossy());
                Self::from_toml_file(path)
            }
            Err(e) => {
                log::debug!("{}; using built-in defaults", e);
                Self::example()
            }
        }
    }

    pub fn judge0_config(&self, cred: &Credentials) -> Judge0Config {
        Judge0Config {
            base_url: self.judge.base_url.clone(),
            api_key: cred.judge_api_key.clone(),
            api_host: self.judge.host.clone(),
            request_interval: millis(self.judge.request_interval_ms),
            request_timeout: millis(self.judge.request_timeout_ms),
        }
    }

    pub fn limits(&self) -> Limits {
        Limits {
            cpu_time_limit_secs: self.judge.limits.cpu_time_limit_secs,
            memory_limit_kb: self.judge.limits.memory_limit_kb,
        }
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.judge.polling.interval_ms),
            max_attempts: self.judge.polling.max_attempts,
        }
    }

    pub fn language_table(&self) -> LanguageTable {
        LanguageTable::with_overrides(&self.languages)
    }

    /// First `[[lang]]` rule whose glob matches `filename`.
    pub fn find_lang_for_filename(&self, filename: impl AsRef<str>) -> Option<&str> {
        let filename = filename.as_ref();
        self.lang_rules
            .iter()
            .find(|rule| rule.pattern.matches(filename))
            .map(|rule| rule.lang.as_str())
    }
}
