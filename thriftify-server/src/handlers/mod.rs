pub mod auth;
pub mod budget;
pub mod catalog;
pub mod health;
pub mod index;
pub mod stats;

use std::path::PathBuf;

/// Directory fetched product images are stored under and served from.
#[derive(Clone, Debug)]
pub struct ImageRoot(pub PathBuf);

pub mod error {
    use thriftify_common::db::DaoError;
    use thriftify_common::report::ReportError;
    use thriftify_common::session::SessionError;

    use actix_web::http::{header, StatusCode};
    use actix_web::{HttpResponse, HttpResponseBuilder};
    use serde::Serialize;
    use std::fmt;
    use tokio::sync::oneshot;

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(String),
        MissingField(String),
        NotAuthenticated(String),
        ConflictWithExisting(String),

        // 404
        DoesNotExist(String),

        // 413
        InputTooLarge(String),

        // 500
        InternalError(String),
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct ServerErrorResponse {
        pub error: String,
        pub err_type: &'static str,
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let server_error: ServerErrorResponse = self.into();
            write!(f, "{}: {}", server_error.err_type, server_error.error)
        }
    }

    impl From<&HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: &HttpErrorResponse) -> Self {
            match resp {
                // 400
                HttpErrorResponse::IncorrectlyFormed(msg) => ServerErrorResponse {
                    err_type: "IncorrectlyFormed",
                    error: format!("Incorrectly formed request: {msg}"),
                },
                HttpErrorResponse::MissingField(field) => ServerErrorResponse {
                    err_type: "MissingField",
                    error: format!("Invalid Data. Missing field: {field}"),
                },
                HttpErrorResponse::NotAuthenticated(msg) => ServerErrorResponse {
                    err_type: "NotAuthenticated",
                    error: format!("User Not Logged In. {msg}"),
                },
                HttpErrorResponse::ConflictWithExisting(msg) => ServerErrorResponse {
                    err_type: "ConflictWithExisting",
                    error: format!("Conflict with existing data: {msg}"),
                },

                // 404
                HttpErrorResponse::DoesNotExist(msg) => ServerErrorResponse {
                    err_type: "DoesNotExist",
                    error: format!("Does not exist: {msg}"),
                },

                // 413
                HttpErrorResponse::InputTooLarge(msg) => ServerErrorResponse {
                    err_type: "InputTooLarge",
                    error: format!("Input is too long: {msg}"),
                },

                // 500
                HttpErrorResponse::InternalError(msg) => ServerErrorResponse {
                    err_type: "InternalError",
                    error: format!("Internal error: {msg}"),
                },
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponseBuilder::new(self.status_code())
                .insert_header((header::CONTENT_TYPE, "application/json"))
                .json(ServerErrorResponse::from(self))
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_)
                | HttpErrorResponse::MissingField(_)
                | HttpErrorResponse::NotAuthenticated(_)
                | HttpErrorResponse::ConflictWithExisting(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::DoesNotExist(_) => StatusCode::NOT_FOUND,
                HttpErrorResponse::InputTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<actix_web::error::BlockingError> for HttpErrorResponse {
        fn from(_err: actix_web::error::BlockingError) -> Self {
            HttpErrorResponse::InternalError(String::from("Actix thread pool failure"))
        }
    }

    impl From<oneshot::error::RecvError> for HttpErrorResponse {
        fn from(_err: oneshot::error::RecvError) -> Self {
            HttpErrorResponse::InternalError(String::from("Rayon thread pool failure"))
        }
    }

    impl From<DaoError> for HttpErrorResponse {
        fn from(err: DaoError) -> Self {
            log::error!("{err}");
            HttpErrorResponse::InternalError(String::from("Failed to access stored data"))
        }
    }

    impl From<SessionError> for HttpErrorResponse {
        fn from(err: SessionError) -> Self {
            log::error!("{err}");
            HttpErrorResponse::InternalError(String::from("Failed to access session"))
        }
    }

    impl From<ReportError> for HttpErrorResponse {
        fn from(err: ReportError) -> Self {
            match err {
                ReportError::BudgetNotFound => {
                    HttpErrorResponse::DoesNotExist(String::from("Budget not found"))
                }
                ReportError::Store(e) => e.into(),
            }
        }
    }

}
