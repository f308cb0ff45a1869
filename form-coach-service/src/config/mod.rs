use crate::services::providers::gemini::GEMINI_API_BASE;
use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct FormCoachConfig {
    pub common: core_config::Config,
    pub service: ServiceConfig,
    pub genai: GenAiConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub name: String,
    pub log_level: String,
    /// OTLP collector endpoint; tracing export is off when unset.
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "GENAI_PROVIDER must be 'gemini' or 'mock', got '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenAiConfig {
    pub provider: ProviderKind,
    /// Set when `provider` is Gemini.
    pub api_key: Option<Secret<String>>,
    pub api_base: String,
    /// Model for form analysis.
    pub analysis_model: String,
    /// Model for coaching summaries.
    pub coaching_model: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Supabase {
        url: String,
        anon_key: Secret<String>,
    },
    Postgres(DatabaseConfig),
    Memory,
}

impl StoreConfig {
    pub fn backend_name(&self) -> &'static str {
        match self {
            StoreConfig::Supabase { .. } => "supabase",
            StoreConfig::Postgres(_) => "postgres",
            StoreConfig::Memory => "memory",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

impl FormCoachConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = common.is_production();
        let var = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let service = ServiceConfig {
            name: var("SERVICE_NAME", Some("form-coach-service"))?,
            log_level: var("LOG_LEVEL", Some("info"))?,
            otlp_endpoint: lookup("OTLP_ENDPOINT").filter(|v| !v.is_empty()),
        };

        let provider: ProviderKind = var("GENAI_PROVIDER", Some("gemini"))?.parse()?;
        let api_key = match provider {
            ProviderKind::Gemini => Some(Secret::new(var("GEMINI_API_KEY", None)?)),
            ProviderKind::Mock => None,
        };

        let genai = GenAiConfig {
            provider,
            api_key,
            api_base: var("GEMINI_API_BASE", Some(GEMINI_API_BASE))?,
            analysis_model: var("GENAI_ANALYSIS_MODEL", Some(DEFAULT_MODEL))?,
            coaching_model: var("GENAI_COACHING_MODEL", Some(DEFAULT_MODEL))?,
            request_timeout: Duration::from_secs(parse_value(
                "GENAI_REQUEST_TIMEOUT_SECS",
                var(
                    "GENAI_REQUEST_TIMEOUT_SECS",
                    Some(&DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
                )?,
            )?),
        };

        let store = match var("STORE_BACKEND", Some("supabase"))?.to_ascii_lowercase().as_str() {
            "supabase" => StoreConfig::Supabase {
                url: var("SUPABASE_URL", None)?,
                anon_key: Secret::new(var("SUPABASE_ANON_KEY", None)?),
            },
            "postgres" => StoreConfig::Postgres(DatabaseConfig {
                url: Secret::new(var("DATABASE_URL", None)?),
                max_connections: parse_value(
                    "DATABASE_MAX_CONNECTIONS",
                    var("DATABASE_MAX_CONNECTIONS", Some("10"))?,
                )?,
                min_connections: parse_value(
                    "DATABASE_MIN_CONNECTIONS",
                    var("DATABASE_MIN_CONNECTIONS", Some("2"))?,
                )?,
                run_migrations: parse_value(
                    "DATABASE_RUN_MIGRATIONS",
                    var("DATABASE_RUN_MIGRATIONS", Some("true"))?,
                )?,
            }),
            "memory" => StoreConfig::Memory,
            other => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "STORE_BACKEND must be 'supabase', 'postgres' or 'memory', got '{}'",
                    other
                )))
            }
        };

        Ok(FormCoachConfig {
            common,
            service,
            genai,
            store,
        })
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_value<T>(key: &str, raw: String) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}
