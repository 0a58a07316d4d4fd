use thriftify_common::session::SessionStore;
use thriftify_common::token::session_token::{SessionToken, SessionTokenClaims};
use thriftify_common::token::{Token, TokenError};

use actix_web::cookie::{time, Cookie, SameSite};
use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpRequest};
use futures::future;
use std::time::Duration;

use crate::env;
use crate::handlers::error::HttpErrorResponse;
use crate::middleware::into_actix_error_res;

pub const SESSION_COOKIE_NAME: &str = "SessionToken";

/// The signed-in user behind a request. Extraction fails with `NotAuthenticated` unless the
/// session cookie carries a valid signature and names a live session for the same user.
#[derive(Debug)]
pub struct SessionUser {
    pub username: String,
}

impl FromRequest for SessionUser {
    type Error = HttpErrorResponse;
    type Future = future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        future::ready(session_user(req))
    }
}

fn session_user(req: &HttpRequest) -> Result<SessionUser, HttpErrorResponse> {
    let claims = into_actix_error_res(verified_claims(req))?;

    let Some(session_store) = req.app_data::<web::Data<dyn SessionStore>>() else {
        log::error!("No session store registered with the app");
        return Err(HttpErrorResponse::InternalError(String::from(
            "Sessions are unavailable",
        )));
    };

    match session_store.get_session_user(&claims.session_id)? {
        Some(username) if username == claims.username => Ok(SessionUser { username }),
        Some(_) => {
            log::warn!(
                "Session token for '{}' names another user's session",
                claims.username
            );
            Err(HttpErrorResponse::NotAuthenticated(String::from(
                "Session is invalid",
            )))
        }
        None => Err(HttpErrorResponse::NotAuthenticated(String::from(
            "Session has ended",
        ))),
    }
}

/// Claims from the request's session cookie, if it is present and correctly signed.
pub fn verified_claims(req: &HttpRequest) -> Result<SessionTokenClaims, TokenError> {
    let cookie = req
        .cookie(SESSION_COOKIE_NAME)
        .ok_or(TokenError::TokenMissing)?;

    let decoded = SessionToken::decode(cookie.value())?;
    let claims = decoded.verify(&env::CONF.session_signing_key)?;

    Ok(claims.clone())
}

pub fn session_cookie(token: String, lifetime: Duration) -> Cookie<'static> {
    let max_age = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);

    Cookie::build(SESSION_COOKIE_NAME, token)
        .path("/")
        .http_only(true)
        .secure(env::CONF.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age))
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(SESSION_COOKIE_NAME, "").path("/").finish();
    cookie.make_removal();
    cookie
}
