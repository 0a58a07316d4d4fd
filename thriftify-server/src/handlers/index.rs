use thriftify_common::html::templates::IndexPage;
use thriftify_common::html::DASHBOARD_SCRIPT;
use thriftify_common::illustrator;

use actix_web::http::header;
use actix_web::{web, HttpResponse};

use crate::handlers::error::HttpErrorResponse;
use crate::handlers::ImageRoot;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(IndexPage::generate())
}

pub async fn dashboard_script() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .body(DASHBOARD_SCRIPT)
}

/// Serves `<image root>/<key>/<file>`. Keys and file names that couldn't have been produced by
/// the illustrator are rejected before the filesystem is touched.
pub async fn crawled_image(
    path: web::Path<(String, String)>,
    image_root: web::Data<ImageRoot>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (key, file_name) = path.into_inner();

    if key.is_empty() || illustrator::image_key(&key) != key || !is_plain_file_name(&file_name) {
        return Err(HttpErrorResponse::DoesNotExist(String::from("No such image")));
    }

    let Some(content_type) = image_content_type(&file_name) else {
        return Err(HttpErrorResponse::DoesNotExist(String::from("No such image")));
    };

    let file_path = image_root.0.join(&key).join(&file_name);
    let image = match web::block(move || std::fs::read(file_path)).await? {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(HttpErrorResponse::DoesNotExist(String::from("No such image")));
        }
        Err(e) => {
            log::error!("Failed to read image {key}/{file_name}: {e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to read image",
            )));
        }
    };

    Ok(HttpResponse::Ok()
        .content_type(content_type)
        .insert_header((header::CACHE_CONTROL, "public, max-age=86400"))
        .body(image))
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_')
}

fn image_content_type(file_name: &str) -> Option<&'static str> {
    let (_, extension) = file_name.rsplit_once('.')?;

    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}
