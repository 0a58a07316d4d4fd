use async_trait::async_trait;
use regex::Regex;
use std::path::Path;
use std::time::Duration;

use crate::illustrator::{CrawlError, FetchImage};

const MAX_CANDIDATES: usize = 5;
const MAX_IMAGE_BYTES: usize = 8 * 1024 * 1024;

/// Searches a Bing-style image results page and downloads the first image that can be fetched.
pub struct WebImageCrawler {
    client: reqwest::Client,
    search_endpoint: String,
    image_url_pattern: Regex,
}

impl WebImageCrawler {
    pub fn new(search_endpoint: &str, timeout: Duration) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) thriftify")
            .build()
            .map_err(|e| CrawlError::SearchFailed(e.to_string()))?;

        let image_url_pattern = Regex::new(r#"murl&quot;:&quot;(https?://.*?)&quot;"#)
            .map_err(|e| CrawlError::SearchFailed(e.to_string()))?;

        Ok(Self {
            client,
            search_endpoint: String::from(search_endpoint),
            image_url_pattern,
        })
    }

    fn candidate_urls(&self, page: &str) -> Vec<String> {
        self.image_url_pattern
            .captures_iter(page)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().replace("&amp;", "&"))
            .take(MAX_CANDIDATES)
            .collect()
    }

    async fn download(&self, url: &str) -> Result<(Vec<u8>, &'static str), CrawlError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CrawlError::DownloadFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CrawlError::DownloadFailed(format!(
                "{url} returned status {}",
                resp.status()
            )));
        }

        let extension = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(extension_for_content_type)
            .ok_or_else(|| CrawlError::DownloadFailed(format!("{url} is not an image")))?;

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| CrawlError::DownloadFailed(e.to_string()))?;

        if bytes.is_empty() || bytes.len() > MAX_IMAGE_BYTES {
            return Err(CrawlError::DownloadFailed(format!(
                "{url} has an unusable size of {} bytes",
                bytes.len()
            )));
        }

        Ok((bytes.to_vec(), extension))
    }
}

fn extension_for_content_type(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim();

    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

#[async_trait]
impl FetchImage for WebImageCrawler {
    async fn fetch_image(&self, keyword: &str, dest_dir: &Path) -> Result<String, CrawlError> {
        let resp = self
            .client
            .get(&self.search_endpoint)
            .query(&[("q", keyword), ("first", "0")])
            .send()
            .await
            .map_err(|e| CrawlError::SearchFailed(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(CrawlError::SearchFailed(format!(
                "image search for '{keyword}' returned status {}",
                resp.status()
            )));
        }

        let page = resp
            .text()
            .await
            .map_err(|e| CrawlError::SearchFailed(e.to_string()))?;

        for url in self.candidate_urls(&page) {
            match self.download(&url).await {
                Ok((bytes, extension)) => {
                    tokio::fs::create_dir_all(dest_dir).await?;

                    let file_name = format!("000001.{extension}");
                    tokio::fs::write(dest_dir.join(&file_name), bytes).await?;

                    return Ok(file_name);
                }
                Err(e) => log::debug!("Skipping image candidate for '{keyword}': {e}"),
            }
        }

        Err(CrawlError::NoImageFound)
    }
}
