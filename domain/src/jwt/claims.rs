//! Claims carried by the access and refresh tokens issued to chat users.
//!
//! Both token types share one shape and are told apart by the `type` claim, so a
//! refresh token is never accepted where an access token is required.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct UserClaims {
    pub(crate) user_id: String,
    #[serde(rename = "type")]
    pub(crate) token_type: TokenType,
    pub(crate) iat: usize,
    pub(crate) exp: usize,
}
