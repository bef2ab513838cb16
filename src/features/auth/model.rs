use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Caller identity taken from a validated bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub sub: String,
    /// Email claim, used to resolve the stored user record
    pub email: String,
}
