//! Password hashing and access tokens.

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const HASH_SCHEME: &str = "pbkdf2_sha256";
const HASH_ITERATIONS: u32 = 120_000;
const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// Hash a password as `pbkdf2_sha256$<iterations>$<salt>$<hash>`.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let key = derive_key(password, &salt, HASH_ITERATIONS);
    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        HASH_ITERATIONS,
        hex::encode(salt),
        hex::encode(key)
    )
}

/// Malformed stored hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match parse_stored_hash(stored) {
        Ok((iterations, salt, expected)) => {
            let key = derive_key(password, &salt, iterations);
            constant_time_eq(&key, &expected)
        }
        Err(e) => {
            tracing::warn!("Unreadable password hash: {}", e);
            false
        }
    }
}

fn parse_stored_hash(stored: &str) -> Result<(u32, Vec<u8>, Vec<u8>)> {
    let mut parts = stored.split('$');
    let scheme = parts.next().unwrap_or_default();
    if scheme != HASH_SCHEME {
        bail!("unsupported hash scheme {:?}", scheme);
    }
    let iterations: u32 = parts
        .next()
        .context("missing iteration count")?
        .parse()
        .context("invalid iteration count")?;
    let salt = hex::decode(parts.next().context("missing salt")?).context("invalid salt")?;
    let hash = hex::decode(parts.next().context("missing hash")?).context("invalid hash")?;
    if iterations == 0 || hash.len() != KEY_LEN || parts.next().is_some() {
        bail!("malformed hash");
    }
    Ok((iterations, salt, hash))
}

fn derive_key(password: &str, salt: &[u8], iterations: u32) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut key);
    key
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies HS256 access tokens.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, lifetime_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: Duration::minutes(lifetime_minutes),
        }
    }

    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    pub fn issue(&self, username: &str) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Failed to sign access token")
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .context("Access token rejected")?;
        Ok(data.claims)
    }
}
