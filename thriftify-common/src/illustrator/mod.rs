pub mod crawlers;

use async_trait::async_trait;
use futures::future;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::Product;

#[derive(Debug)]
pub enum CrawlError {
    SearchFailed(String),
    DownloadFailed(String),
    NoImageFound,
    Io(std::io::Error),
}

impl std::error::Error for CrawlError {}

impl fmt::Display for CrawlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlError::SearchFailed(e) => write!(f, "CrawlError: Image search failed: {e}"),
            CrawlError::DownloadFailed(e) => write!(f, "CrawlError: Image download failed: {e}"),
            CrawlError::NoImageFound => write!(f, "CrawlError: Search returned no images"),
            CrawlError::Io(e) => write!(f, "CrawlError: Failed to write image: {e}"),
        }
    }
}

impl From<std::io::Error> for CrawlError {
    fn from(error: std::io::Error) -> Self {
        CrawlError::Io(error)
    }
}

/// Fetches one image for `keyword` into `dest_dir` and returns the written file's name.
#[async_trait]
pub trait FetchImage: Send + Sync {
    async fn fetch_image(&self, keyword: &str, dest_dir: &Path) -> Result<String, CrawlError>;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IllustratedProduct {
    pub product: Product,
    pub image_key: String,
    /// Path relative to the image root, e.g. `SonyWH1000XM5/000001.jpg`.
    pub image_path: Option<String>,
}

/// Folder name for a product's image: whitespace removed, then anything other than ASCII
/// alphanumerics, `-` and `_` dropped so the key can't escape the image root.
pub fn image_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

async fn existing_image(dir: &Path) -> Option<String> {
    let mut entries = tokio::fs::read_dir(dir).await.ok()?;

    while let Ok(Some(entry)) = entries.next_entry().await {
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file {
            return entry.file_name().to_str().map(String::from);
        }
    }

    None
}

async fn illustrate_one(
    fetcher: &dyn FetchImage,
    image_root: &Path,
    product: Product,
) -> IllustratedProduct {
    let key = image_key(&product.name);

    if key.is_empty() {
        return IllustratedProduct {
            product,
            image_key: key,
            image_path: None,
        };
    }

    let dest_dir: PathBuf = image_root.join(&key);

    let file_name = match existing_image(&dest_dir).await {
        Some(f) => Some(f),
        None => match fetcher.fetch_image(&key, &dest_dir).await {
            Ok(f) => Some(f),
            Err(e) => {
                log::warn!("No image for product '{}': {e}", product.name);
                None
            }
        },
    };

    IllustratedProduct {
        image_path: file_name.map(|f| format!("{key}/{f}")),
        product,
        image_key: key,
    }
}

/// Pairs each product with an image under `image_root`, reusing one already on disk. Products
/// whose image can't be fetched are returned without one.
pub async fn illustrate(
    fetcher: &dyn FetchImage,
    image_root: &Path,
    products: Vec<Product>,
) -> Vec<IllustratedProduct> {
    future::join_all(
        products
            .into_iter()
            .map(|product| illustrate_one(fetcher, image_root, product)),
    )
    .await
}
