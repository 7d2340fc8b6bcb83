use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::ConfigError;

/// Where the conversion service lives and how files are saved locally.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base address of the service; always ends with `/`.
    pub base_url: Url,
    /// `None` waits on the service for as long as it takes.
    pub timeout: Option<Duration>,
    pub download_dir: PathBuf,
}

impl ClientConfig {
    pub fn new(
        base_url: &str,
        timeout_secs: Option<u64>,
        download_dir: PathBuf,
    ) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(base_url)?;

        if download_dir.exists() && !download_dir.is_dir() {
            return Err(ConfigError::DownloadDir(download_dir.display().to_string()));
        }

        Ok(Self {
            base_url,
            timeout: timeout_secs.filter(|secs| *secs > 0).map(Duration::from_secs),
            download_dir,
        })
    }

    /// Resolves `path` (relative, e.g. `api/download`) against the base address.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::BackendUrl {
        value: value.to_string(),
        reason,
    };

    let mut url = Url::parse(value.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("not a base address".to_string()));
    }

    // joins would otherwise drop the last path segment
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}
