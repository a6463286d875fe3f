use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::models::{Claims, TokenType};

fn now() -> usize {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs() as usize
}

/// Everything identity-related that tokens carry for a user.
#[derive(Clone)]
pub struct TokenIdentity {
    pub user_id: u64,
    pub email: String,
    pub role: String,
    pub permissions: Vec<String>,
    pub employee_id: Option<u64>,
}

fn build_claims(identity: &TokenIdentity, token_type: TokenType, ttl: usize) -> Claims {
    Claims {
        user_id: identity.user_id,
        sub: identity.email.clone(),
        role: identity.role.clone(),
        permissions: identity.permissions.clone(),
        exp: now() + ttl,
        jti: Uuid::new_v4().to_string(),
        token_type,
        employee_id: identity.employee_id,
    }
}

fn sign(claims: &Claims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn generate_access_token(
    identity: &TokenIdentity,
    secret: &str,
    ttl: usize,
) -> Result<String, jsonwebtoken::errors::Error> {
    sign(&build_claims(identity, TokenType::Access, ttl), secret)
}

pub fn generate_refresh_token(
    identity: &TokenIdentity,
    secret: &str,
    ttl: usize,
) -> Result<(String, Claims), jsonwebtoken::errors::Error> {
    let claims = build_claims(identity, TokenType::Refresh, ttl);
    let token = sign(&claims, secret)?;
    Ok((token, claims))
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
