use crate::error::ConfigError;
use axum::http::HeaderValue;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "meta-llama/Llama-3.2-1B-Instruct";
pub const DEFAULT_INFERENCE_URL: &str = "https://router.huggingface.co/v1/chat/completions";

/// Longest session we'll hand out: 30 days.
pub const MAX_TOKEN_TTL_SECS: i64 = 30 * 24 * 60 * 60;

/// Everything the server needs, read once at startup.
///
/// Secrets and the login pair have no fallbacks. If any of them is missing the
/// process refuses to start, so nobody ends up running with a demo password.
#[derive(Clone)]
pub struct Config {
    pub port: u16,
    pub cors_origin: Option<HeaderValue>,
    pub auth: AuthConfig,
    pub inference: InferenceConfig,
}

#[derive(Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
}

#[derive(Clone)]
pub struct InferenceConfig {
    pub api_token: String,
    pub model: String,
    pub endpoint: String,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if you want `.env` files picked up.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let auth = AuthConfig {
            username: required("AUTH_USERNAME")?,
            password: required("AUTH_PASSWORD")?,
            jwt_secret: required("JWT_SECRET")?,
            token_ttl_secs: parse_or(get("TOKEN_TTL_SECS"), "TOKEN_TTL_SECS", 3600)?,
        };
        if auth.token_ttl_secs <= 0 || auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::Invalid {
                key: "TOKEN_TTL_SECS",
                reason: format!("must be between 1 and {}", MAX_TOKEN_TTL_SECS),
            });
        }

        let inference = InferenceConfig {
            api_token: required("HF_TOKEN")?,
            model: get("HF_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            endpoint: get("INFERENCE_URL").unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string()),
            max_tokens: parse_or(get("MAX_TOKENS"), "MAX_TOKENS", 300)?,
            timeout: Duration::from_secs(parse_or(
                get("INFERENCE_TIMEOUT_SECS"),
                "INFERENCE_TIMEOUT_SECS",
                120,
            )?),
        };
        if inference.max_tokens == 0 {
            return Err(ConfigError::Invalid {
                key: "MAX_TOKENS",
                reason: "must be at least 1".to_string(),
            });
        }
        if !inference.endpoint.starts_with("http://") && !inference.endpoint.starts_with("https://")
        {
            return Err(ConfigError::Invalid {
                key: "INFERENCE_URL",
                reason: "must be an http(s) URL".to_string(),
            });
        }

        Ok(Self {
            port: parse_or(get("PORT"), "PORT", 8000)?,
            cors_origin: get("CORS_ORIGIN").map(parse_origin).transpose()?,
            auth,
            inference,
        })
    }
}

fn parse_or<T>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(value) => value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: format!("{:?}: {}", value, e),
        }),
        None => Ok(default),
    }
}

/// A pinned CORS origin must be an http(s) origin that is also a valid header
/// value. Anything else fails startup; it never degrades to "any origin".
fn parse_origin(origin: String) -> Result<HeaderValue, ConfigError> {
    if !origin.starts_with("http://") && !origin.starts_with("https://") {
        return Err(ConfigError::Invalid {
            key: "CORS_ORIGIN",
            reason: format!("{:?} is not an http(s) origin", origin),
        });
    }
    HeaderValue::from_str(&origin).map_err(|e| ConfigError::Invalid {
        key: "CORS_ORIGIN",
        reason: format!("{:?}: {}", origin, e),
    })
}

// Hand-written so secrets never land in logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("cors_origin", &self.cors_origin)
            .field("auth", &self.auth)
            .field("inference", &self.inference)
            .finish()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_token", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}
