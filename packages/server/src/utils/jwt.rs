use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub uid: i32,
    pub role: String,
    pub permissions: Vec<String>,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

impl Claims {
    /// Claims for a token that expires `ttl_hours` from now.
    pub fn issue(
        user_id: i32,
        username: &str,
        role: &str,
        permissions: Vec<String>,
        ttl_hours: i64,
    ) -> Result<Self> {
        let expires_at = Utc::now()
            .checked_add_signed(Duration::hours(ttl_hours))
            .context("token expiry out of range")?;
        Ok(Self {
            sub: username.to_owned(),
            uid: user_id,
            role: role.to_owned(),
            permissions,
            exp: expires_at.timestamp(),
        })
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

pub fn sign(claims: &Claims, secret: &str) -> Result<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("failed to encode token")
}

/// Verify the signature and expiry of a token and return its claims.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
