use crate::error::Error;
use crate::AppState;
use axum::{
    extract::{FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};
use domain::error::{AuthErrorKind, Error as DomainError};
use domain::UserId;
use log::*;
use serde::Deserialize;

/// The user behind the access token presented with the request.
pub(crate) struct AuthenticatedUser(pub UserId);

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = Error;

    // Browsers cannot set headers on a WebSocket handshake, so the `token` query
    // parameter is checked first and the bearer header second.
    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = query_token(parts).or_else(|| bearer_token(parts)) else {
            debug!("Rejecting request to {} without a token", parts.uri.path());
            return Err(DomainError::auth(AuthErrorKind::MissingToken).into());
        };

        let user_id = state.verifier.verify(&token).map_err(|e| {
            debug!("Rejecting token: {e}");
            e
        })?;

        trace!("Authenticated user {user_id}");
        Ok(AuthenticatedUser(user_id))
    }
}

fn query_token(parts: &Parts) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(&parts.uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}
