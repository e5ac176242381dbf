use std::time::Duration;

use async_trait::async_trait;

use crate::{error::*, judge0::Judge, language::LanguageTable, model::*};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, dur: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, dur: Duration) {
        ::tokio::time::sleep(dur).await
    }
}

/// Drives one execution on the judge: submit, then poll until the status leaves
/// "In Queue"/"Processing" or the attempt cap is hit.
pub struct Executor<J, S = TokioSleeper> {
    judge: J,
    sleeper: S,
    languages: LanguageTable,
    poll: PollPolicy,
}

impl<J: Judge> Executor<J, TokioSleeper> {
    pub fn new(judge: J) -> Self {
        Self {
            judge,
            sleeper: TokioSleeper,
            languages: LanguageTable::default(),
            poll: PollPolicy::default(),
        }
    }
}

impl<J: Judge, S: Sleeper> Executor<J, S> {
    pub fn sleeper<S2: Sleeper>(self, sleeper: S2) -> Executor<J, S2> {
        Executor {
            judge: self.judge,
            sleeper,
            languages: self.languages,
            poll: self.poll,
        }
    }

    pub fn languages(mut self, languages: LanguageTable) -> Self {
        self.languages = languages;
        self
    }

    pub fn poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn get_languages(&self) -> &LanguageTable {
        &self.languages
    }

    pub fn get_poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn judge(&self) -> &J {
        &self.judge
    }

    pub async fn execute_code(
        &self,
        source_code: &str,
        stdin: &str,
        language_id: u32,
        limits: Limits,
    ) -> Result<ExecutionResult> {
        self.languages.ensure_supported_id(language_id)?;

        let req = ExecutionRequest::new(source_code, stdin, language_id, limits);
        let SubmissionToken { token } = self.judge.create_submission(&req).await?;
        log::debug!("Submitted to judge: token={} lang={}", token, language_id);

        self.poll_until_done(&token).await
    }

    /// Returns the last-seen result once `max_attempts` fetches are spent,
    /// even if the judge still reports it as pending.
    pub async fn poll_until_done(&self, token: &str) -> Result<ExecutionResult> {
        let max_attempts = self.poll.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let result = self.judge.fetch_submission(token).await?;
            if !result.is_pending() {
                log::debug!(
                    "Judge finished: token={} status={} after {} poll(s)",
                    token,
                    result.status.description,
                    attempt
                );
                return Ok(result);
            }
            if attempt >= max_attempts {
                log::warn!(
                    "Gave up polling token={} after {} attempts (last status: {})",
                    token,
                    attempt,
                    result.status.description
                );
                return Ok(result);
            }
            self.sleeper.sleep(self.poll.interval).await;
        }
    }
}
