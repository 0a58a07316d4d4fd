mod mock_crawler;
mod web_crawler;

pub use mock_crawler::MockCrawler;
pub use web_crawler::WebImageCrawler;
