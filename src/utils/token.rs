use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use uuid::Uuid;

use crate::config::get_config;
use crate::error::{Error, Result};
use crate::middleware::auth::Claims;

pub fn issue_token(user_id: Uuid, role: &str) -> Result<String> {
    let config = get_config();
    let expires_at = Utc::now() + Duration::hours(config.jwt_ttl_hours);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: expires_at.timestamp() as usize,
        role: Some(role.to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| Error::Internal(format!("Failed to issue token: {}", e)))
}
