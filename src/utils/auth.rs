use crate::config::AuthConfig;
use crate::error::{AppError, ConfigError};
use crate::models::user::Claims;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};

/// Hashes a password with Argon2id and a random salt (PHC string format).
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Checks a password against a PHC hash. Comparison is constant time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Checks the one configured login and mints/validates the session tokens.
///
/// Tokens are HS256 JWTs carrying `sub` (the username) and `exp`. Nothing is
/// stored server side, so a token dies only when it expires or the secret
/// changes. The configured password is only kept as an Argon2 hash.
pub struct AuthGate {
    username: String,
    password_hash: String,
    ttl: chrono::Duration,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl AuthGate {
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigError> {
        let ttl = chrono::Duration::try_seconds(config.token_ttl_secs)
            .filter(|ttl| chrono::Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| ConfigError::Invalid {
                key: "TOKEN_TTL_SECS",
                reason: format!("{} seconds is out of range", config.token_ttl_secs),
            })?;

        let password_hash = hash_password(&config.password).map_err(|e| ConfigError::Invalid {
            key: "AUTH_PASSWORD",
            reason: format!("could not be hashed: {}", e),
        })?;

        // No leeway: a token is dead the second its exp passes.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            username: config.username.clone(),
            password_hash,
            ttl,
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        })
    }

    /// Exchanges a username/password for a signed token.
    ///
    /// Both fields must match exactly. The password is checked even when the
    /// username is wrong, so response time doesn't reveal which one failed.
    pub fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let password_ok = verify_password(password, &self.password_hash).unwrap_or_else(|e| {
            tracing::error!("Stored password hash is unreadable: {}", e);
            false
        });
        if username != self.username || !password_ok {
            return Err(AppError::InvalidCredentials);
        }
        self.issue(username)
    }

    /// Signs a token for `username` expiring one TTL from now.
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        let expiration = chrono::Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or(AppError::TokenCreation)?
            .timestamp();

        let claims = Claims {
            sub: Some(username.to_string()),
            exp: expiration,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to sign token: {}", e);
            AppError::TokenCreation
        })
    }

    /// Validates a token and hands back the username inside it.
    ///
    /// Signature is checked before expiry, so a tampered token is
    /// `InvalidToken` even if it's also stale.
    pub fn verify(&self, token: &str) -> Result<String, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                    _ => AppError::InvalidToken,
                }
            })?;

        match token_data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(AppError::InvalidToken),
        }
    }
}
