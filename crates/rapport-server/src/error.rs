use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rapport_shared::RapportError;
use rapport_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Social(#[from] RapportError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("User already exists")]
    UserExists,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::EmailTaken(_) => ServerError::UserExists,
            other => ServerError::Social(other.into()),
        }
    }
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Social(err) => match err {
                RapportError::NotFound(_) => StatusCode::NOT_FOUND,
                RapportError::DuplicateRequest { .. } => StatusCode::CONFLICT,
                RapportError::NoPendingRequest { .. } => StatusCode::CONFLICT,
                RapportError::NotFriends { .. } => StatusCode::FORBIDDEN,
                RapportError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                RapportError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ServerError::UserExists => StatusCode::CONFLICT,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServerError::Social(RapportError::StorageUnavailable(detail)) => {
                tracing::error!(error = %detail, "storage unavailable");
                "Storage unavailable".to_string()
            }
            ServerError::Internal(detail) => {
                tracing::error!(error = %detail, "internal error");
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        };

        let body = serde_json::json!({
            "error": message,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use rapport_shared::UserId;

    use super::*;

    #[test]
    fn taxonomy_maps_to_distinct_statuses() {
        let id = UserId::new();
        let cases = [
            (RapportError::NotFound(id), StatusCode::NOT_FOUND),
            (
                RapportError::DuplicateRequest { sender: id, receiver: id },
                StatusCode::CONFLICT,
            ),
            (
                RapportError::InvalidArgument("x".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                RapportError::StorageUnavailable("disk".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ServerError::from(err).into_response().status(), status);
        }
    }

    #[test]
    fn store_faults_are_not_not_found() {
        let err = ServerError::from(StoreError::NotFound);
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            ServerError::from(StoreError::EmailTaken("a@b.c".into())).status(),
            StatusCode::CONFLICT
        );
    }
}
