use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{
    AuthErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind,
};

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self.0.error_kind {
            DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
                InternalErrorKind::Auth(auth_error_kind) => match auth_error_kind {
                    AuthErrorKind::MissingToken => {
                        error_response(StatusCode::UNAUTHORIZED, "missing token")
                    }
                    AuthErrorKind::InvalidToken
                    | AuthErrorKind::Expired
                    | AuthErrorKind::WrongTokenType => {
                        error_response(StatusCode::UNAUTHORIZED, "invalid token")
                    }
                },
                InternalErrorKind::Entity(entity_error_kind) => match entity_error_kind {
                    EntityErrorKind::NotFound => error_response(StatusCode::NOT_FOUND, "not found"),
                    EntityErrorKind::Invalid => {
                        error_response(StatusCode::UNPROCESSABLE_ENTITY, "unprocessable entity")
                    }
                    EntityErrorKind::NotParticipant => {
                        error_response(StatusCode::FORBIDDEN, "forbidden")
                    }
                    EntityErrorKind::Other(_) => {
                        error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                    }
                },
                InternalErrorKind::Config | InternalErrorKind::Other(_) => {
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
                }
            },
        }
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: DomainError) -> StatusCode {
        Error::from(err).into_response().status()
    }

    #[test]
    fn test_auth_errors_are_unauthorized() {
        assert_eq!(
            status_of(DomainError::auth(AuthErrorKind::MissingToken)),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(DomainError::auth(AuthErrorKind::Expired)),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_entity_errors_map_to_client_statuses() {
        assert_eq!(
            status_of(DomainError::entity(EntityErrorKind::NotFound, "gone")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(DomainError::entity(EntityErrorKind::Invalid, "empty")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(DomainError::entity(EntityErrorKind::NotParticipant, "no")),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_config_error_is_internal() {
        assert_eq!(
            status_of(DomainError::config("missing secret")),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
