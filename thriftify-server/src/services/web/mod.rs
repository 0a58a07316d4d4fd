use actix_web::web::*;

use crate::handlers::{auth, budget, catalog, index, stats};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(resource("/").route(get().to(index::index)))
        .service(
            resource("/forms")
                .route(get().to(catalog::forms_page))
                .route(post().to(catalog::search)),
        )
        .service(
            resource("/products")
                .route(get().to(catalog::products_page))
                .route(post().to(catalog::products_page)),
        )
        .service(
            resource("/register")
                .route(get().to(auth::register_page))
                .route(post().to(auth::register)),
        )
        .service(
            resource("/login")
                .route(get().to(auth::login_page))
                .route(post().to(auth::login)),
        )
        .service(
            resource("/logout")
                .route(get().to(auth::logout))
                .route(post().to(auth::logout)),
        )
        .service(resource("/dashboard").route(get().to(budget::dashboard)))
        .service(resource("/stats").route(get().to(stats::stats)))
        .service(
            resource("/static/assets/js/dashboard.js").route(get().to(index::dashboard_script)),
        )
        .service(
            resource("/static/crawl_images/{key}/{file}").route(get().to(index::crawled_image)),
        );
}
