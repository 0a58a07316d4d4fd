use actix_web::web::{FormConfig, JsonConfig, PathConfig, QueryConfig, ServiceConfig};

use crate::handlers::error::HttpErrorResponse;

pub mod api;
pub mod web;

const MAX_JSON_BODY_BYTES: usize = 16 * 1024;
const MAX_FORM_BODY_BYTES: usize = 16 * 1024;

pub fn configure(cfg: &mut ServiceConfig) {
    let json_config = JsonConfig::default()
        .limit(MAX_JSON_BODY_BYTES)
        .error_handler(|err, _req| {
            HttpErrorResponse::IncorrectlyFormed(format!("Invalid JSON body: {err}")).into()
        });

    let form_config = FormConfig::default()
        .limit(MAX_FORM_BODY_BYTES)
        .error_handler(|err, _req| {
            HttpErrorResponse::IncorrectlyFormed(format!("Invalid form body: {err}")).into()
        });

    let query_config = QueryConfig::default().error_handler(|err, _req| {
        HttpErrorResponse::IncorrectlyFormed(format!("Invalid query: {err}")).into()
    });

    let path_config = PathConfig::default().error_handler(|err, _req| {
        HttpErrorResponse::IncorrectlyFormed(format!("Invalid path: {err}")).into()
    });

    cfg.app_data(json_config)
        .app_data(form_config)
        .app_data(query_config)
        .app_data(path_config)
        .configure(api::configure)
        .configure(web::configure);
}
