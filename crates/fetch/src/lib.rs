//! HTTP access for provider catalogs and cover art.
//!
//! Everything network-bound goes through [`HttpClient`]: the Steam app list,
//! the Nintendo Switch title list, and cover image downloads. The library
//! processor only needs downloads and depends on the [`Fetch`] trait instead,
//! so tests can hand it a fake.

pub mod error;

use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

pub use reqwest::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const TIMEOUT: Duration = Duration::from_secs(60);

pub type FetchHandle = Arc<dyn Fetch + Send + Sync>;

/// Downloads remote files to local temporary storage.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Downloads `url` into a fresh temporary file.
    ///
    /// The file is deleted when the returned handle is dropped; callers that
    /// want to keep it must copy or persist it first.
    async fn download(&self, url: &str) -> Result<NamedTempFile>;
}

#[derive(Clone, Debug)]
pub struct HttpClient {
    inner: reqwest::Client,
}
impl HttpClient {
    pub fn new() -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(TIMEOUT)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { inner })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!(url, "GET");
        let response = self.inner.get(url).send().await.or_raise(|| ErrorKind::Request(url.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            exn::bail!(ErrorKind::Status { url: url.to_string(), status: status.as_u16() });
        }
        Ok(response)
    }

    /// Fetches the full response body.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.get(url).await?;
        let body = response.bytes().await.or_raise(|| ErrorKind::Body(url.to_string()))?;
        Ok(body.to_vec())
    }

    /// Fetches and decodes a JSON document.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.get(url).await?;
        response.json::<T>().await.or_raise(|| ErrorKind::Decode(url.to_string()))
    }

    /// Fetches a response body as text, without decoding it.
    ///
    /// Providers use this to keep the raw catalog JSON for the cache.
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.get(url).await?;
        response.text().await.or_raise(|| ErrorKind::Body(url.to_string()))
    }
}

#[async_trait]
impl Fetch for HttpClient {
    async fn download(&self, url: &str) -> Result<NamedTempFile> {
        let mut response = self.get(url).await?;
        let temp = NamedTempFile::new().or_raise(|| ErrorKind::TempFile)?;
        let mut writer = tokio::fs::File::from_std(temp.reopen().or_raise(|| ErrorKind::TempFile)?);
        let mut written = 0usize;
        while let Some(chunk) = response.chunk().await.or_raise(|| ErrorKind::Body(url.to_string()))? {
            writer.write_all(&chunk).await.or_raise(|| ErrorKind::TempFile)?;
            written += chunk.len();
        }
        writer.flush().await.or_raise(|| ErrorKind::TempFile)?;
        writer.sync_all().await.or_raise(|| ErrorKind::TempFile)?;
        tracing::debug!(url, bytes = written, path = %temp.path().display(), "Downloaded");
        Ok(temp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_client_builds() {
        assert!(HttpClient::new().is_ok());
    }

    #[test]
    fn test_user_agent_names_the_crate() {
        assert!(USER_AGENT.starts_with("gsm-fetch/"));
    }

    #[rstest]
    #[case(500, true)]
    #[case(503, true)]
    #[case(429, true)]
    #[case(404, false)]
    #[case(403, false)]
    fn test_status_retryable(#[case] status: u16, #[case] expected: bool) {
        let kind = ErrorKind::Status { url: "https://example.invalid".to_string(), status };
        assert_eq!(kind.is_retryable(), expected);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_request_error() {
        let client = HttpClient::new().unwrap();
        let err = client.get_bytes("http://127.0.0.1:9/nothing").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Request(_)));
    }
}
