//! Rich-media previews for system notifications.
//!
//! Fetching is bounded by a connect timeout plus a read budget and the body
//! must decode as an image. Callers treat any error as "no image".

use std::time::Duration;

use crate::config::PushConfig;
use crate::error::{PushError, PushResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub url: String,
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub trait ImageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> PushResult<FetchedImage>;
}

/// Blocking HTTP fetcher. Must run off the UI thread.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl HttpImageFetcher {
    pub fn new(connect_timeout: Duration, read_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            read_timeout,
        }
    }

    pub fn from_config(config: &PushConfig) -> Self {
        Self::new(config.image_connect_timeout(), config.image_read_timeout())
    }
}

impl ImageFetcher for HttpImageFetcher {
    fn fetch(&self, url: &str) -> PushResult<FetchedImage> {
        // A blocking client can't be built or dropped inside an async context,
        // so it lives only for the duration of this call.
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(self.connect_timeout)
            .timeout(self.connect_timeout + self.read_timeout)
            .build()?;

        let resp = client.get(url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(PushError::ImageStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = resp.bytes()?.to_vec();
        let decoded = image::load_from_memory(&bytes)?;

        log::debug!(
            "[MEDIA] fetched {} ({}x{}, {} bytes)",
            url,
            decoded.width(),
            decoded.height(),
            bytes.len()
        );
        Ok(FetchedImage {
            url: url.to_string(),
            width: decoded.width(),
            height: decoded.height(),
            bytes,
        })
    }
}
