use thriftify_common::db::{CredentialStore, DaoError};
use thriftify_common::html::templates::{LoginPage, RegisterPage};
use thriftify_common::session::SessionStore;
use thriftify_common::token::session_token::SessionToken;
use thriftify_common::validators::{self, Validity};

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::str::FromStr;
use tokio::sync::oneshot;
use zeroize::Zeroizing;

use crate::env;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::auth::{self, removal_cookie, session_cookie};

#[derive(Deserialize)]
pub struct CredentialForm {
    pub username: String,
    pub password: String,
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub async fn register_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(RegisterPage::generate())
}

pub async fn login_page() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(LoginPage::generate())
}

pub async fn register(
    credential_store: web::Data<dyn CredentialStore>,
    credentials: web::Form<CredentialForm>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let CredentialForm { username, password } = credentials.into_inner();
    let password = Zeroizing::new(password);

    if let Validity::Invalid(msg) = validators::validate_username(&username) {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(msg)));
    }

    if password.is_empty() {
        return Err(HttpErrorResponse::IncorrectlyFormed(String::from(
            "Password cannot be empty",
        )));
    }

    if password.len() > validators::MAX_PASSWORD_LENGTH {
        return Err(HttpErrorResponse::InputTooLarge(format!(
            "Provided password is too long. Max: {} bytes",
            validators::MAX_PASSWORD_LENGTH,
        )));
    }

    let (sender, receiver) = oneshot::channel();

    rayon::spawn(move || {
        let hash_result = argon2_kdf::Hasher::default()
            .algorithm(argon2_kdf::Algorithm::Argon2id)
            .salt_length(env::CONF.hash_salt_length)
            .hash_length(env::CONF.hash_length)
            .iterations(env::CONF.hash_iterations)
            .memory_cost_kib(env::CONF.hash_mem_cost_kib)
            .threads(env::CONF.hash_threads)
            .secret(argon2_kdf::Secret::using_bytes(&env::CONF.hashing_key))
            .hash(password.as_bytes());

        // The receiver is only gone if the request was dropped
        let _ = sender.send(hash_result);
    });

    let password_hash = match receiver.await? {
        Ok(h) => h.to_string(),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to hash password",
            )));
        }
    };

    let username_copy = username.clone();
    match web::block(move || credential_store.create_credential(&username_copy, &password_hash))
        .await?
    {
        Ok(_) => (),
        Err(DaoError::AlreadyExists) => {
            return Err(HttpErrorResponse::ConflictWithExisting(String::from(
                "Username is taken",
            )));
        }
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to create user",
            )));
        }
    };

    log::info!("Registered user '{username}'");

    Ok(redirect("/login"))
}

/// Failed sign-ins of any kind send the browser back to the login page.
pub async fn login(
    credential_store: web::Data<dyn CredentialStore>,
    session_store: web::Data<dyn SessionStore>,
    credentials: web::Form<CredentialForm>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let CredentialForm { username, password } = credentials.into_inner();
    let password = Zeroizing::new(password);

    if !validators::validate_username(&username).is_valid()
        || password.len() > validators::MAX_PASSWORD_LENGTH
    {
        return Ok(redirect("/login"));
    }

    let username_copy = username.clone();
    let password_hash =
        match web::block(move || credential_store.get_password_hash(&username_copy)).await? {
            Ok(Some(h)) => h,
            Ok(None) => return Ok(redirect("/login")),
            Err(e) => {
                log::error!("{e}");
                return Err(HttpErrorResponse::InternalError(String::from(
                    "Failed to get user credentials",
                )));
            }
        };

    let (sender, receiver) = oneshot::channel();

    rayon::spawn(move || {
        let result = argon2_kdf::Hash::from_str(&password_hash).map(|hash| {
            hash.verify_with_secret(
                password.as_bytes(),
                argon2_kdf::Secret::using_bytes(&env::CONF.hashing_key),
            )
        });

        let _ = sender.send(result);
    });

    match receiver.await? {
        Ok(true) => (),
        Ok(false) => return Ok(redirect("/login")),
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to validate password",
            )));
        }
    };

    let session_id = session_store.create_session(&username, env::CONF.session_lifetime)?;

    let token = match SessionToken::sign_new(
        &session_id,
        &username,
        env::CONF.session_lifetime,
        &env::CONF.session_signing_key,
    ) {
        Ok(t) => t,
        Err(e) => {
            log::error!("{e}");
            return Err(HttpErrorResponse::InternalError(String::from(
                "Failed to create session token",
            )));
        }
    };

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/dashboard"))
        .cookie(session_cookie(token, env::CONF.session_lifetime))
        .finish())
}

/// Ends the request's session if it has a valid one. Always clears the cookie.
pub async fn logout(
    req: HttpRequest,
    session_store: web::Data<dyn SessionStore>,
) -> Result<HttpResponse, HttpErrorResponse> {
    if let Ok(claims) = auth::verified_claims(&req) {
        session_store.remove_session(&claims.session_id)?;
    }

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/login"))
        .cookie(removal_cookie())
        .finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    use actix_web::http::StatusCode;
    use actix_web::test::{self, TestRequest};
    use actix_web::App;

    use crate::handlers::test_utils::{self, location, session_cookie as cookie_from, TestContext};

    #[actix_web::test]
    async fn test_register_and_login() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/register")
            .set_form([("username", "alice"), ("password", "hunter2")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/login"));
        assert!(ctx.store.does_user_exist("alice").unwrap());

        let stored_hash = ctx.store.get_password_hash("alice").unwrap().unwrap();
        assert_ne!(stored_hash, "hunter2");

        let req = TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice"), ("password", "hunter2")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/dashboard"));

        let cookie = cookie_from(&resp).unwrap();
        assert!(cookie.http_only().unwrap_or(false));

        let req = TestRequest::get()
            .uri("/dashboardData")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_login_with_wrong_password() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        test_utils::register_and_login(&app, "alice", "hunter2").await;

        let req = TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice"), ("password", "hunter3")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/login"));
        assert!(cookie_from(&resp).is_none());
    }

    #[actix_web::test]
    async fn test_login_unknown_user() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/login")
            .set_form([("username", "nobody"), ("password", "whatever")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/login"));
    }

    #[actix_web::test]
    async fn test_register_duplicate_username() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        test_utils::register_and_login(&app, "alice", "hunter2").await;

        let req = TestRequest::post()
            .uri("/register")
            .set_form([("username", "alice"), ("password", "other")])
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = test_utils::read_json(resp).await;
        assert_eq!(body["errType"], "ConflictWithExisting");

        // The original password still works
        let req = TestRequest::post()
            .uri("/login")
            .set_form([("username", "alice"), ("password", "hunter2")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(location(&resp).as_deref(), Some("/dashboard"));
    }

    #[actix_web::test]
    async fn test_register_invalid_input() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post()
            .uri("/register")
            .set_form([("username", "   "), ("password", "pw")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let long_password = "p".repeat(validators::MAX_PASSWORD_LENGTH + 1);
        let req = TestRequest::post()
            .uri("/register")
            .set_form([("username", "alice"), ("password", long_password.as_str())])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let req = TestRequest::post()
            .uri("/register")
            .set_form([("username", "alice")])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        assert!(!ctx.store.does_user_exist("alice").unwrap());
    }

    #[actix_web::test]
    async fn test_logout_ends_session() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let cookie = test_utils::register_and_login(&app, "alice", "hunter2").await;

        let req = TestRequest::get()
            .uri("/logout")
            .cookie(cookie.clone())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/login"));
        let cleared = cookie_from(&resp).unwrap();
        assert_eq!(cleared.value(), "");

        // The old cookie no longer works even though its signature is still valid
        let req = TestRequest::get()
            .uri("/dashboardData")
            .cookie(cookie)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_logout_without_session() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        let req = TestRequest::post().uri("/logout").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp).as_deref(), Some("/login"));
    }

    #[actix_web::test]
    async fn test_pages_render() {
        let ctx = TestContext::new();
        let app = test::init_service(App::new().configure(|cfg| ctx.configure(cfg))).await;

        for uri in ["/register", "/login"] {
            let req = TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);

            let body = test_utils::read_text(resp).await;
            assert!(body.contains(&format!("action=\"{uri}\"")));
        }
    }
}
