//! HTTP and file page sources
//!
//! The HTTP source can keep every page it downloads in a cache directory and
//! replay it later without touching the network.

use reqwest::header::COOKIE;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::PageSource;
use crate::{FanMatchError, Result, SourceConfig};

pub struct HttpPageSource {
    client: reqwest::blocking::Client,
    session_cookie: Option<String>,
    /// Optional cache directory for downloaded pages
    cache_dir: Option<PathBuf>,
    /// If true, only use cache (no network requests)
    offline_only: bool,
}

impl HttpPageSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let mut source = HttpPageSource {
            client,
            session_cookie: config.session_cookie.clone(),
            cache_dir: None,
            offline_only: config.offline,
        };
        if let Some(dir) = &config.cache_dir {
            source = source.with_cache(dir);
        }
        Ok(source)
    }

    /// Use a cache directory
    pub fn with_cache<P: AsRef<Path>>(mut self, cache_dir: P) -> Self {
        self.cache_dir = Some(cache_dir.as_ref().to_path_buf());
        self
    }

    /// Set offline-only mode (no network requests, cache must exist)
    pub fn offline_only(mut self, offline: bool) -> Self {
        self.offline_only = offline;
        self
    }

    fn cache_path(&self, url: &str) -> Option<PathBuf> {
        self.cache_dir.as_ref().map(|dir| dir.join(cache_file_name(url)))
    }

    fn load_from_cache(&self, url: &str) -> Option<String> {
        let path = self.cache_path(url)?;
        if path.exists() {
            log::debug!("Loading from cache: {}", path.display());
            std::fs::read_to_string(&path).ok()
        } else {
            None
        }
    }

    fn save_to_cache(&self, url: &str, html: &str) -> Result<()> {
        if let Some(path) = self.cache_path(url) {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, html)?;
            log::debug!("Saved to cache: {}", path.display());
        }
        Ok(())
    }
}

/// Safe file name for a URL
fn cache_file_name(url: &str) -> String {
    url.replace("https://", "")
        .replace("http://", "")
        .replace(['/', '?', '=', '&'], "_")
        + ".html"
}

impl PageSource for HttpPageSource {
    fn fetch(&self, url: &str) -> Result<String> {
        if let Some(html) = self.load_from_cache(url) {
            return Ok(html);
        }

        if self.offline_only {
            return Err(FanMatchError::Fetch {
                url: url.to_string(),
                message: "no cached page (offline mode)".to_string(),
            });
        }

        log::debug!("Fetching {}", url);
        let mut request = self.client.get(url);
        if let Some(cookie) = &self.session_cookie {
            request = request.header(COOKIE, cookie.as_str());
        }
        let response = request.send()?;

        if !response.status().is_success() {
            log::warn!("HTTP {} for {}", response.status(), url);
            return Err(FanMatchError::Fetch {
                url: url.to_string(),
                message: format!("HTTP {}", response.status()),
            });
        }

        let html = response.text()?;

        if let Err(e) = self.save_to_cache(url, &html) {
            log::warn!("Failed to cache {}: {}", url, e);
        }

        Ok(html)
    }
}

/// Serves one saved page whatever URL is asked for
pub struct FilePageSource {
    path: PathBuf,
}

impl FilePageSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FilePageSource {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl PageSource for FilePageSource {
    fn fetch(&self, url: &str) -> Result<String> {
        log::debug!("Serving {} from {}", url, self.path.display());
        Ok(std::fs::read_to_string(&self.path)?)
    }
}
