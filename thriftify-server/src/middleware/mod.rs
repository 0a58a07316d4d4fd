pub mod auth;

use thriftify_common::token::TokenError;

use crate::handlers::error::HttpErrorResponse;

#[inline(always)]
fn into_actix_error_res<T>(result: Result<T, TokenError>) -> Result<T, HttpErrorResponse> {
    match result {
        Ok(t) => Ok(t),
        Err(TokenError::TokenInvalid) => Err(HttpErrorResponse::NotAuthenticated(String::from(
            "Session token is invalid",
        ))),
        Err(TokenError::TokenExpired) => Err(HttpErrorResponse::NotAuthenticated(String::from(
            "Session has expired",
        ))),
        Err(TokenError::TokenMissing) => Err(HttpErrorResponse::NotAuthenticated(String::from(
            "Session token is missing",
        ))),
        Err(TokenError::SigningFailed) => Err(HttpErrorResponse::InternalError(String::from(
            "Failed to handle session token",
        ))),
    }
}
