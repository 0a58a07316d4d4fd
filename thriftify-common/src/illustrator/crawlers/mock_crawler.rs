use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::illustrator::{CrawlError, FetchImage};

/// 1x1 transparent PNG
const PLACEHOLDER_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Writes a placeholder image instead of searching the web.
#[derive(Default)]
pub struct MockCrawler {
    fail: bool,
    fetches: AtomicUsize,
}

impl MockCrawler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl FetchImage for MockCrawler {
    async fn fetch_image(&self, keyword: &str, dest_dir: &Path) -> Result<String, CrawlError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        if self.fail {
            return Err(CrawlError::NoImageFound);
        }

        log::debug!("MockCrawler writing placeholder for '{keyword}'");

        tokio::fs::create_dir_all(dest_dir).await?;
        tokio::fs::write(dest_dir.join("000001.png"), PLACEHOLDER_PNG).await?;

        Ok(String::from("000001.png"))
    }
}
