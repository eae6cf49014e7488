//! Resolves a replay manifest and downloads the backing tick file (C7's
//! HTTP-facing half): a JSON manifest lookup followed by a streamed binary
//! fetch of the file it points to.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::constants::REPLAY_API_BASE_URL;
use crate::error::Result;

/// A per-subsource binary tick file source, matching the vendor's own
/// partitioning of a trading day's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subsource {
    Iex,
    UtpDelayed,
    CtaADelayed,
    CtaBDelayed,
    OtcDelayed,
    NasdaqBasic,
}

impl Subsource {
    fn wire(self) -> &'static str {
        match self {
            Self::Iex => "iex",
            Self::UtpDelayed => "utp_delayed",
            Self::CtaADelayed => "cta_a_delayed",
            Self::CtaBDelayed => "cta_b_delayed",
            Self::OtcDelayed => "otc_delayed",
            Self::NasdaqBasic => "nasdaq_basic",
        }
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    name: String,
    url: String,
}

/// Resolves `{subsource, date}` pairs to a manifest, then streams the
/// binary tick file to `dest_dir`.
#[derive(Debug, Clone)]
pub struct Downloader {
    http: reqwest::Client,
    access_key: String,
    base_url: String,
}

impl Downloader {
    pub fn new(access_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(access_key, REPLAY_API_BASE_URL)
    }

    /// As [`Downloader::new`], but against a caller-supplied base URL
    /// instead of the production replay API — an escape hatch for pointing
    /// at a sandbox or local test host, mirroring
    /// [`crate::types::enums::Provider::Manual`].
    pub fn with_base_url(access_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, access_key: access_key.into(), base_url: base_url.into() })
    }

    /// Download one subsource's tick file for `date` into `dest_dir`,
    /// returning the local path it was saved to.
    pub async fn download(
        &self,
        subsource: Subsource,
        date: chrono::NaiveDate,
        dest_dir: &Path,
    ) -> Result<PathBuf> {
        let base_url = &self.base_url;
        let manifest_url = format!(
            "{base_url}/securities/replay?subsource={}&date={}&api_key={}",
            subsource.wire(),
            date.format("%Y-%m-%d"),
            self.access_key
        );
        tracing::debug!(%manifest_url, "resolving replay manifest");
        let manifest: Manifest = self
            .http
            .get(&manifest_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let dest_path = dest_dir.join(&manifest.name);
        tracing::info!(subsource = subsource.wire(), dest = ?dest_path, "downloading replay tick file");

        let mut resp = self.http.get(&manifest.url).send().await?.error_for_status()?;
        let mut file = tokio::fs::File::create(&dest_path).await?;
        while let Some(chunk) = resp.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        Ok(dest_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subsource_wire_tokens() {
        assert_eq!(Subsource::Iex.wire(), "iex");
        assert_eq!(Subsource::CtaADelayed.wire(), "cta_a_delayed");
        assert_eq!(Subsource::NasdaqBasic.wire(), "nasdaq_basic");
    }
}
