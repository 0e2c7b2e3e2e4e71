//! Authentication utilities

use anyhow::{anyhow, Result};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

use crate::models::User;

const PBKDF2_ITERATIONS: u32 = 100_000;
const HASH_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;

/// Access token claims: the user id plus the nonce that was current at login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub nonce: String,
    pub exp: usize,
}

/// hash a password using pbkdf2-sha256 with a fresh salt, stored as `salt$hash`
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    format!("{}${}", hex::encode(salt), derive(password, &salt))
}

/// verify a password against a stored `salt$hash` using constant-time comparison
pub fn verify_password(password: &str, stored: &str) -> Result<bool> {
    let (salt_hex, hash) = stored
        .split_once('$')
        .ok_or_else(|| anyhow!("Malformed password hash"))?;
    let salt = hex::decode(salt_hex)?;

    let computed = derive(password, &salt);
    Ok(computed.as_bytes().ct_eq(hash.as_bytes()).into())
}

fn derive(password: &str, salt: &[u8]) -> String {
    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, PBKDF2_ITERATIONS, &mut hash);
    hex::encode(hash)
}

/// create an access token for the user, valid for `expires_in` seconds
pub fn create_jwt(user: &User, secret: &str, expires_in: u64) -> Result<String> {
    let expiration = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() + expires_in;

    let claims = Claims {
        sub: user.id,
        nonce: user.session_nonce.clone(),
        exp: expiration as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// verify signature and expiry of an access token
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    Ok(token_data.claims)
}
