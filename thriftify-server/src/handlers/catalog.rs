use thriftify_common::advisor::GenerateText;
use thriftify_common::catalog;
use thriftify_common::html::templates::{FormsPage, ProductsPage};
use thriftify_common::illustrator::{self, FetchImage};

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::handlers::error::HttpErrorResponse;
use crate::handlers::ImageRoot;

const MAX_TOPIC_LENGTH: usize = 256;

pub const SUGGESTIONS_UNAVAILABLE: &str =
    "Product suggestions are unavailable right now. Please try again later.";
pub const NO_PRODUCTS_FOUND: &str = "No products could be found for that search.";

#[derive(Deserialize)]
pub struct CatalogForm {
    pub topic: String,
    pub budget: String,
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

pub async fn forms_page() -> HttpResponse {
    html(FormsPage::generate())
}

/// Always renders an empty catalog.
pub async fn products_page() -> HttpResponse {
    html(ProductsPage::generate(&[], None))
}

pub async fn search(
    generator: web::Data<dyn GenerateText>,
    fetcher: web::Data<dyn FetchImage>,
    image_root: web::Data<ImageRoot>,
    form: web::Form<CatalogForm>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let topic = form.topic.trim();
    let budget = form.budget.trim();

    if topic.is_empty() || budget.is_empty() {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            "Both a topic and a price range are required",
        )));
    }

    if topic.chars().count() > MAX_TOPIC_LENGTH || budget.chars().count() > MAX_TOPIC_LENGTH {
        return Err(HttpErrorResponse::InputTooLarge(format!(
            "topic and price range can be at most {MAX_TOPIC_LENGTH} characters",
        )));
    }

    let products = match catalog::suggest_products(generator.get_ref(), topic, budget).await {
        Ok(p) => p,
        Err(e) => {
            log::warn!("Product suggestions for '{topic}' failed: {e}");
            return Ok(html(ProductsPage::generate(&[], Some(SUGGESTIONS_UNAVAILABLE))));
        }
    };

    if products.is_empty() {
        return Ok(html(ProductsPage::generate(&[], Some(NO_PRODUCTS_FOUND))));
    }

    let illustrated = illustrator::illustrate(fetcher.get_ref(), &image_root.0, products).await;

    Ok(html(ProductsPage::generate(&illustrated, None)))
}

#[cfg(test)]
mod tests {
    use super::*;

    use thriftify_common::advisor::generators::MockGenerator;
    use thriftify_common::illustrator::crawlers::MockCrawler;

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::App;

    use crate::handlers::test_utils::{self, TestContext};

    #[actix_web::test]
    async fn test_search_renders_illustrated_products() {
        let ctx = TestContext::with_services(
            MockGenerator::with_reply(
                "SonyWH1000XM5: Noise cancelling headphones; \
                 Here you go!; \
                 BoseQC45: Comfortable over-ear headphones",
            ),
            MockCrawler::new(),
        );
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/forms")
            .set_form([("topic", "headphones"), ("budget", "$200-$400")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let page = test_utils::read_text(resp).await;
        assert!(page.contains("<h3>Sony WH1000 XM5</h3>"));
        assert!(page.contains("<h3>Bose QC45</h3>"));
        assert!(page.contains("/static/crawl_images/SonyWH1000XM5/000001.png"));
        assert!(!page.contains("Here you go"));

        assert!(ctx
            .image_root
            .path()
            .join("BoseQC45/000001.png")
            .is_file());
        assert_eq!(ctx.crawler.fetch_count(), 2);

        let prompts = ctx.generator.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0]
            .starts_with("Find 6 different models of headphones in the range of $200-$400."));
    }

    #[actix_web::test]
    async fn test_search_survives_failed_images() {
        let ctx = TestContext::with_services(
            MockGenerator::with_reply("SteamDeck: Handheld PC"),
            MockCrawler::failing(),
        );
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/forms")
            .set_form([("topic", "consoles"), ("budget", "$400")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let page = test_utils::read_text(resp).await;
        assert!(page.contains("<h3>Steam Deck</h3>"));
        assert!(!page.contains("<img"));
    }

    #[actix_web::test]
    async fn test_search_when_generator_fails() {
        let ctx = TestContext::with_services(MockGenerator::failing(), MockCrawler::new());
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/forms")
            .set_form([("topic", "laptops"), ("budget", "$500")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let page = test_utils::read_text(resp).await;
        assert!(page.contains(SUGGESTIONS_UNAVAILABLE));
        assert_eq!(ctx.crawler.fetch_count(), 0);
    }

    #[actix_web::test]
    async fn test_search_with_unparseable_reply() {
        let ctx = TestContext::with_services(
            MockGenerator::with_reply("I'd need more context to answer that."),
            MockCrawler::new(),
        );
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/forms")
            .set_form([("topic", "laptops"), ("budget", "$500")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        let page = test_utils::read_text(resp).await;
        assert!(page.contains(NO_PRODUCTS_FOUND));
    }

    #[actix_web::test]
    async fn test_search_rejects_bad_input() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/forms")
            .set_form([("topic", " "), ("budget", "$500")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = TestRequest::post()
            .uri("/forms")
            .set_form([("topic", "laptops")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let long_topic = "x".repeat(MAX_TOPIC_LENGTH + 1);
        let req = TestRequest::post()
            .uri("/forms")
            .set_form([("topic", long_topic.as_str()), ("budget", "$500")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        assert!(ctx.generator.prompts().is_empty());
    }

    #[actix_web::test]
    async fn test_static_pages() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::get().uri("/forms").to_request();
        let page = test_utils::read_text(test::call_service(&app, req).await).await;
        assert!(page.contains("name=\"topic\""));

        for req in [
            TestRequest::get().uri("/products").to_request(),
            TestRequest::post().uri("/products").to_request(),
        ] {
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let page = test_utils::read_text(resp).await;
            assert!(page.contains("<h1>Products</h1>"));
            assert!(!page.contains("class=\"product\""));
        }
    }
}
