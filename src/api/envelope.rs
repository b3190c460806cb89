//! JSON envelopes derived from the service error taxonomy.
//!
//! Success bodies are `{ "data": ..., "served_at": ... }`. Errors map
//! straight off [`ServiceError`]'s two variants into
//! `{ "error": { "kind", "message" }, "served_at": ... }`: validation
//! failures keep their message and a 400, classifier failures surface a
//! generic internal signal with a 500 while the detail goes to the log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::error::ServiceError;

#[derive(Debug, Serialize)]
struct Payload<T: Serialize> {
    data: T,
    served_at: String,
}

/// Wrap a handler result in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    let payload = Payload {
        data,
        served_at: Utc::now().to_rfc3339(),
    };
    (StatusCode::OK, axum::Json(payload)).into_response()
}

impl ServiceError {
    /// Error-object kind: caller fault or internal failure.
    fn kind(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation",
            ServiceError::Classifier(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::Classifier(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show callers. Classifier detail never leaves the
    /// process; it is logged here and replaced with a generic signal.
    fn public_message(self) -> String {
        match self {
            ServiceError::Validation(message) => message,
            ServiceError::Classifier(detail) => {
                error!(detail = %detail, "Classifier failure");
                "internal inference failure".to_string()
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let kind = self.kind();
        let body = json!({
            "error": {
                "kind": kind,
                "message": self.public_message(),
            },
            "served_at": Utc::now().to_rfc3339(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_envelope_carries_data_and_timestamp() {
        let resp = ok(json!({"resilience_score": 72}));
        assert_eq!(resp.status(), StatusCode::OK);

        let v = body_json(resp).await;
        assert_eq!(v["data"]["resilience_score"], 72);
        assert!(v["served_at"].is_string());
    }

    #[tokio::test]
    async fn validation_errors_keep_their_message() {
        let resp = ServiceError::validation("unknown preset: asteroid").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let v = body_json(resp).await;
        assert_eq!(v["error"]["kind"], "validation");
        assert!(v["error"]["message"].as_str().unwrap().contains("asteroid"));
    }

    #[tokio::test]
    async fn classifier_errors_surface_generically() {
        let resp = ServiceError::classifier("matrix dimensions exploded").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let v = body_json(resp).await;
        assert_eq!(v["error"]["kind"], "internal");
        assert_eq!(v["error"]["message"], "internal inference failure");
        assert!(!v["error"]["message"].as_str().unwrap().contains("matrix"));
    }
}
