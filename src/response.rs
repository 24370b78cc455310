use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::users::dto::UserRecord;

/// Body of every response: the status code plus exactly one payload field.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: u16,
    #[serde(flatten)]
    pub payload: Payload,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Payload {
    Users(Vec<UserRecord>),
    Message(String),
    Error(String),
}

pub fn write_envelope(status: StatusCode, payload: Payload) -> Response {
    let body = Envelope {
        status: status.as_u16(),
        payload,
    };
    (status, Json(body)).into_response()
}

/// Successful handler result.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub payload: Payload,
}

impl ApiResponse {
    pub fn users(users: Vec<UserRecord>) -> Self {
        Self {
            status: StatusCode::OK,
            payload: Payload::Users(users),
        }
    }

    pub fn created(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CREATED,
            payload: Payload::Message(message.into()),
        }
    }

    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            payload: Payload::Message(message.into()),
        }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        write_envelope(self.status, self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn users_payload_is_flattened_next_to_status() {
        let env = Envelope {
            status: 200,
            payload: Payload::Users(vec![UserRecord {
                id: 1,
                name: "alice".into(),
            }]),
        };
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({"status": 200, "users": [{"id": 1, "name": "alice"}]})
        );
    }

    #[test]
    fn empty_user_list_serializes_as_array() {
        let env = Envelope {
            status: 200,
            payload: Payload::Users(Vec::new()),
        };
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(value, json!({"status": 200, "users": []}));
    }

    #[test]
    fn error_payload_uses_error_key() {
        let env = Envelope {
            status: 409,
            payload: Payload::Error("Username already exists".into()),
        };
        let value = serde_json::to_value(&env).unwrap();
        assert_eq!(
            value,
            json!({"status": 409, "error": "Username already exists"})
        );
    }

    #[test]
    fn write_envelope_sets_status_and_json_content_type() {
        let res = write_envelope(StatusCode::CREATED, Payload::Message("done".into()));
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(
            res.headers().get(axum::http::header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }
}
