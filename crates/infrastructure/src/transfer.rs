//! HTTP implementation of the transfer port.

use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use jetsim_domain::{EvalResult, StorageError, TransportError};
use jetsim_evaluation::ports::Transfer;
use reqwest::{Client, Response};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Downloads files over HTTP(S) with an optional progress bar.
///
/// The body is streamed into `<dest>.part` and renamed to `dest` only once the
/// transfer completes.
#[derive(Clone)]
pub struct HttpTransfer {
    client: Client,
    show_progress: bool,
}

impl HttpTransfer {
    /// Create a transfer with a default client
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a transfer using an existing client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            show_progress: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    fn progress_bar(&self, total: Option<u64>, dest: &Path) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let bar = match total {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };
        let style = ProgressStyle::with_template(
            "{spinner:.green} {msg} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        )
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);

        let name = dest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        bar.set_message(name);
        bar
    }

    async fn stream_to(
        &self,
        url: &Url,
        mut response: Response,
        path: &Path,
        bar: &ProgressBar,
    ) -> EvalResult<u64> {
        let mut file = tokio::fs::File::create(path)
            .await
            .map_err(|e| StorageError::io(path, e))?;

        let mut written = 0u64;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| request_error(url, &e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| StorageError::io(path, e))?;
            written += chunk.len() as u64;
            bar.inc(chunk.len() as u64);
        }

        file.flush().await.map_err(|e| StorageError::io(path, e))?;
        Ok(written)
    }
}

impl Default for HttpTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transfer for HttpTransfer {
    #[instrument(skip(self, dest), fields(dest = %dest.display()))]
    async fn download(&self, url: &Url, dest: &Path) -> EvalResult<u64> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let total = response.content_length();
        debug!(?total, "Response received");

        let part = part_path(dest);
        let bar = self.progress_bar(total, dest);

        match self.stream_to(url, response, &part, &bar).await {
            Ok(bytes) => {
                tokio::fs::rename(&part, dest)
                    .await
                    .map_err(|e| StorageError::io(dest, e))?;
                bar.finish_and_clear();
                info!(bytes, "Downloaded");
                Ok(bytes)
            }
            Err(e) => {
                bar.abandon();
                if let Err(remove_err) = tokio::fs::remove_file(&part).await {
                    warn!(path = %part.display(), error = %remove_err, "Could not remove partial download");
                }
                Err(e)
            }
        }
    }
}

fn request_error(url: &Url, error: &reqwest::Error) -> TransportError {
    TransportError::Request {
        url: url.to_string(),
        message: error.to_string(),
    }
}

/// `<dest>.part`
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest.as_os_str().to_os_string();
    name.push(".part");
    PathBuf::from(name)
}
