use anyhow::{bail, Context};

/// One year; longer-lived tokens are refused at startup.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

/// Settings for the hosted chat-completion API used by `/api/generate`.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            max_tokens: 500,
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub jwt: JwtConfig,
    pub generation: GenerationConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));
        let parsed = |key: &str| lookup(key).and_then(|v| v.trim().parse::<i64>().ok());

        let database_url = required("DATABASE_URL")?;
        let ttl_minutes = parsed("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7);
        if !(1..=MAX_TTL_MINUTES).contains(&ttl_minutes) {
            bail!("JWT_TTL_MINUTES must be between 1 and {MAX_TTL_MINUTES}, got {ttl_minutes}");
        }
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "flavorcraft".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "flavorcraft-users".into()),
            ttl_minutes,
        };

        let defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            api_key: lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()),
            base_url: lookup("OPENAI_BASE_URL").unwrap_or(defaults.base_url),
            model: lookup("OPENAI_MODEL").unwrap_or(defaults.model),
            max_tokens: lookup("OPENAI_MAX_TOKENS")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(defaults.max_tokens),
            temperature: lookup("OPENAI_TEMPERATURE")
                .and_then(|v| v.trim().parse::<f32>().ok())
                .unwrap_or(defaults.temperature),
        };

        let port = match lookup("APP_PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {v}"))?,
            None => 5000,
        };

        Ok(Self {
            database_url,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            cors_origin: lookup("CORS_ORIGIN").unwrap_or_else(|| "http://localhost:5173".into()),
            jwt,
            generation,
        })
    }
}
