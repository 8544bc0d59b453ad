use serde::Deserialize;
use std::env;
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("Missing {provider} configuration: {}", .missing.join(", "))]
    MissingCredentials {
        provider: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub elevenlabs: ElevenLabsConfig,
    pub cloudinary: CloudinaryConfig,
    pub jobs: JobConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Speech provider settings. A blank key is rejected when the client is built.
#[derive(Debug, Clone, Deserialize)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub base_url: String,
    pub model_id: String,
    pub timeout_secs: u64,
}

/// Media host settings. Blank credentials are rejected when the client is built.
#[derive(Debug, Clone, Deserialize)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub folder: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub concurrency: usize,
    pub max_attempts: usize,
    pub backoff_unit_ms: u64,
    pub backoff_base: u64,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            max_attempts: 3,
            backoff_unit_ms: 1000,
            backoff_base: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = JobConfig::default();

        let config = Config {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8080)?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            elevenlabs: ElevenLabsConfig {
                api_key: env::var("ELEVENLABS_API_KEY").unwrap_or_default(),
                base_url: env::var("ELEVENLABS_BASE_URL")
                    .unwrap_or_else(|_| "https://api.elevenlabs.io/v1".to_string()),
                model_id: env::var("ELEVENLABS_MODEL_ID")
                    .unwrap_or_else(|_| "eleven_turbo_v2_5".to_string()),
                timeout_secs: parse_var("ELEVENLABS_TIMEOUT_SECS", 30)?,
            },
            cloudinary: CloudinaryConfig {
                cloud_name: env::var("CLOUDINARY_CLOUD_NAME").unwrap_or_default(),
                api_key: env::var("CLOUDINARY_API_KEY").unwrap_or_default(),
                api_secret: env::var("CLOUDINARY_API_SECRET").unwrap_or_default(),
                base_url: env::var("CLOUDINARY_BASE_URL")
                    .unwrap_or_else(|_| "https://api.cloudinary.com/v1_1".to_string()),
                folder: env::var("CLOUDINARY_FOLDER")
                    .unwrap_or_else(|_| "voice_generations".to_string()),
            },
            jobs: JobConfig {
                concurrency: parse_var("WORKER_CONCURRENCY", defaults.concurrency)?,
                max_attempts: parse_var("JOB_MAX_ATTEMPTS", defaults.max_attempts)?,
                backoff_unit_ms: parse_var("JOB_BACKOFF_UNIT_MS", defaults.backoff_unit_ms)?,
                backoff_base: parse_var("JOB_BACKOFF_BASE", defaults.backoff_base)?,
            },
        };

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.jobs.concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "WORKER_CONCURRENCY",
                value: "0".to_string(),
            });
        }
        if self.jobs.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "JOB_MAX_ATTEMPTS",
                value: "0".to_string(),
            });
        }
        // Each wait must be strictly longer than the one before
        if self.jobs.backoff_base < 2 {
            return Err(ConfigError::Invalid {
                name: "JOB_BACKOFF_BASE",
                value: self.jobs.backoff_base.to_string(),
            });
        }
        if self.jobs.backoff_unit_ms == 0 {
            return Err(ConfigError::Invalid {
                name: "JOB_BACKOFF_UNIT_MS",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}
