use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use url::Url;

use crate::{error::*, http, model::*};

pub const HEADER_API_KEY: &str = "X-RapidAPI-Key";
pub const HEADER_API_HOST: &str = "X-RapidAPI-Host";

/// A Judge0-compatible execution service.
#[async_trait]
pub trait Judge: Send + Sync {
    async fn create_submission(&self, req: &ExecutionRequest) -> Result<SubmissionToken>;

    async fn fetch_submission(&self, token: &str) -> Result<ExecutionResult>;
}

macro_rules! forward_judge_impl {
    ($ptr:ident) => {
        #[async_trait]
        impl<T: Judge + ?Sized> Judge for $ptr<T> {
            async fn create_submission(&self, req: &ExecutionRequest) -> Result<SubmissionToken> {
                (**self).create_submission(req).await
            }

            async fn fetch_submission(&self, token: &str) -> Result<ExecutionResult> {
                (**self).fetch_submission(token).await
            }
        }
    };
}

forward_judge_impl!(Box);
forward_judge_impl!(Arc);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Judge0Config {
    pub base_url: String,
    pub api_key: String,
    pub api_host: String,
    pub request_interval: Option<Duration>,
    /// Per-request timeout; a stalled judge surfaces as `JudgeUnavailable`.
    pub request_timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct Judge0Client {
    http: http::Client,
    submissions_url: Url,
}

impl Judge0Client {
    pub fn new(cfg: Judge0Config) -> Result<Self> {
        if cfg.api_key.trim().is_empty() {
            return Err(Error::MissingCredential("judge API key"));
        }
        let submissions_url = submissions_url(&cfg.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(
            HEADER_API_KEY,
            HeaderValue::from_str(&cfg.api_key).map_err(|_| Error::InvalidHeader(HEADER_API_KEY))?,
        );
        headers.insert(
            HEADER_API_HOST,
            HeaderValue::from_str(&cfg.api_host)
                .map_err(|_| Error::InvalidHeader(HEADER_API_HOST))?,
        );

        let http = http::Client::new(headers, cfg.request_interval, cfg.request_timeout)
            .map_err(Error::JudgeUnavailable)?;
        Ok(Self {
            http,
            submissions_url,
        })
    }

    fn submission_url(&self, token: &str) -> Url {
        let mut url = self.submissions_url.clone();
        url.path_segments_mut()
            .expect("submissions URL is a base URL")
            .push(token);
        url
    }
}

fn submissions_url(base_url: &str) -> Result<Url> {
    let base = format!("{}/submissions", base_url.trim_end_matches('/'));
    match Url::parse(&base) {
        Ok(url) if url.cannot_be_a_base() => Err(Error::InvalidSyntaxUrl {
            url: base,
            source: url::ParseError::RelativeUrlWithCannotBeABaseBase,
        }),
        Ok(url) => Ok(url),
        Err(source) => Err(Error::InvalidSyntaxUrl { url: base, source }),
    }
}

async fn ensure_success(resp: http::Response, requested_url: &Url) -> Result<http::Response> {
    let status = resp.status();
    if !status.is_success() {
        log::debug!(
            "Judge responded {} for {}: {}",
            status,
            requested_url,
            resp.text().await.unwrap_or_default()
        );
        return Err(Error::JudgeApi {
            status,
            requested_url: requested_url.to_string(),
        });
    }
    Ok(resp)
}

#[async_trait]
impl Judge for Judge0Client {
    async fn create_submission(&self, req: &ExecutionRequest) -> Result<SubmissionToken> {
        let url = &self.submissions_url;
        let resp = self
            .http
            .post(url.clone())
            .query(&[("base64_encoded", "true")])
            .header(ACCEPT, "application/json")
            .json(req)
            .send()
            .await
            .map_err(Error::JudgeUnavailable)?;
        let resp = ensure_success(resp, url).await?;
        let body = resp.text().await.map_err(Error::JudgeUnavailable)?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn fetch_submission(&self, token: &str) -> Result<ExecutionResult> {
        let url = self.submission_url(token);
        let resp = self
            .http
            .get(url.clone())
            .query(&[("base64_encoded", "true")])
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(Error::JudgeUnavailable)?;
        let resp = ensure_success(resp, &url).await?;
        let body = resp.text().await.map_err(Error::JudgeUnavailable)?;
        let mut result: ExecutionResult = serde_json::from_str(&body)?;
        if result.token.is_empty() {
            result.token = token.to_owned();
        }
        Ok(result)
    }
}
