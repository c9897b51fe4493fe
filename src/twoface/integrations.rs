//! Integrate twoface with other libraries, like Actix-web or Diesel.

use crate::twoface::{Cause, TfError};
use actix_web::{
    http::{header, StatusCode},
    HttpResponse,
};
use serde::Serialize;
use tracing::{debug, error};

// Twoface errors can be used as Actix-web errors.
// If a handler returns a Twoface error, the external portion will be shown to the user.
// The internal portion will only be logged.
impl actix_web::ResponseError for TfError {
    fn status_code(&self) -> StatusCode {
        self.external.cause.into()
    }

    fn error_response(&self) -> HttpResponse {
        match self.external.cause {
            Cause::ServerError => error!(cause = %self.external.cause, "{:#}", self.internal),
            _ => debug!(cause = %self.external.cause, "{:#}", self.internal),
        }
        let resp = serde_json::to_string(&ErrBody {
            error: self.to_string(),
        })
        .unwrap_or_else(|e| {
            error!("Serde error: {}", e.to_string());
            "{\"error\": \"ServerError: internal server error\"}".to_owned()
        });
        HttpResponse::build(self.external.cause.into())
            .header(header::CONTENT_TYPE, "application/json")
            .body(resp)
    }
}

#[derive(Serialize)]
struct ErrBody {
    error: String,
}
