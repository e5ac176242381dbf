use std::{sync::Arc, time::Duration};

use ::tokio::sync::Mutex;
use ::tokio::time::{Interval, MissedTickBehavior};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

pub use ::reqwest::{Error, IntoUrl, Request, Response};

/// reqwest client that attaches fixed headers to every request and
/// optionally keeps a minimum interval between consecutive requests.
#[derive(Clone)]
pub struct Client {
    inner: ::reqwest::Client,
    req_interval: Option<Arc<Mutex<Interval>>>,
}

pub struct RequestBuilder {
    inner: ::reqwest::RequestBuilder,
    client: Client,
}

macro_rules! emit_request_fn {
    ($method:ident) => {
        pub fn $method(&self, u: impl IntoUrl) -> RequestBuilder {
            RequestBuilder::new(self.inner.$method(u), self.clone())
        }
    };
}

impl Client {
    /// `timeout` bounds each request from connect until the body is read.
    pub fn new(
        default_headers: HeaderMap,
        req_interval: Option<Duration>,
        timeout: Option<Duration>,
    ) -> Result<Self, Error> {
        let req_interval = req_interval.filter(|d| !d.is_zero()).map(|dur| {
            let mut interval = ::tokio::time::interval(dur);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Arc::new(Mutex::new(interval))
        });
        let mut builder = reqwest::Client::builder()
            .default_headers(default_headers)
            .gzip(true);
        if let Some(timeout) = timeout.filter(|d| !d.is_zero()) {
            builder = builder.timeout(timeout);
        }
        let inner = builder.build()?;
        Ok(Self {
            inner,
            req_interval,
        })
    }

    emit_request_fn!(get);
    emit_request_fn!(post);

    pub(crate) async fn execute_request(&self, req: Request) -> Result<Response, Error> {
        if let Some(interval) = &self.req_interval {
            interval.lock().await.tick().await;
        }
        log::trace!("{} {}", req.method(), req.url());
        self.inner.execute(req).await
    }
}

impl RequestBuilder {
    fn new(b: ::reqwest::RequestBuilder, client: Client) -> Self {
        Self { inner: b, client }
    }

    pub async fn send(self) -> Result<Response, Error> {
        let req = self.inner.build()?;
        self.client.execute_request(req).await
    }

    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Self {
        self.inner = self.inner.json(json);
        self
    }

    pub fn query<T: Serialize + ?Sized>(mut self, query: &T) -> Self {
        self.inner = self.inner.query(query);
        self
    }

    pub fn header<K, V>(self, key: K, value: V) -> RequestBuilder
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<::http::Error>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<::http::Error>,
    {
        Self::new(self.inner.header(key, value), self.client)
    }
}
