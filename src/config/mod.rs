use std::env;

use url::Url;

use crate::agora::DEFAULT_TOKEN_TTL_SECS;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_AVATAR_BUCKET: &str = "avatars";

/// Process configuration, read from the environment exactly once at startup
/// and passed into the entry point explicitly.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub supabase: SupabaseConfig,
    pub agora: AgoraConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub anon_key: String,
    pub service_role_key: String,
    pub avatar_bucket: String,
}

#[derive(Debug, Clone)]
pub struct AgoraConfig {
    pub app_id: String,
    pub app_certificate: String,
    pub token_ttl_secs: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration:\n  {}", .0.join("\n  "))]
    Invalid(Vec<String>),
}

impl AppConfig {
    /// Load and validate from process environment variables.
    ///
    /// Collects every problem before failing so the operator sees the full
    /// list in one run.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut problems = Vec::new();

        let supabase_url = require(&lookup, &mut problems, "SUPABASE_URL").and_then(|raw| {
            match Url::parse(&raw) {
                Ok(url) => Some(url),
                Err(e) => {
                    problems.push(format!("SUPABASE_URL is not a valid url: {e}"));
                    None
                }
            }
        });
        let anon_key = require(&lookup, &mut problems, "SUPABASE_ANON_KEY");
        let service_role_key = require(&lookup, &mut problems, "SUPABASE_SERVICE_ROLE_KEY");
        let app_id = require(&lookup, &mut problems, "AGORA_APP_ID");
        let app_certificate = require(&lookup, &mut problems, "AGORA_APP_CERTIFICATE");

        let port = optional_parsed(&lookup, &mut problems, "PORT", DEFAULT_PORT);
        let token_ttl_secs = optional_parsed(
            &lookup,
            &mut problems,
            "AGORA_TOKEN_TTL_SECS",
            DEFAULT_TOKEN_TTL_SECS,
        );
        let avatar_bucket = lookup("AVATAR_BUCKET")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AVATAR_BUCKET.to_string());

        if let (
            Some(url),
            Some(anon_key),
            Some(service_role_key),
            Some(app_id),
            Some(app_certificate),
        ) = (
            supabase_url,
            anon_key,
            service_role_key,
            app_id,
            app_certificate,
        ) {
            if problems.is_empty() {
                return Ok(Self {
                    server: ServerConfig { port },
                    supabase: SupabaseConfig {
                        url,
                        anon_key,
                        service_role_key,
                        avatar_bucket,
                    },
                    agora: AgoraConfig {
                        app_id,
                        app_certificate,
                        token_ttl_secs,
                    },
                });
            }
        }

        Err(ConfigError::Invalid(problems))
    }
}

fn require(
    lookup: &impl Fn(&str) -> Option<String>,
    problems: &mut Vec<String>,
    key: &str,
) -> Option<String> {
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => Some(value),
        _ => {
            problems.push(format!("{key} is required"));
            None
        }
    }
}

fn optional_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    problems: &mut Vec<String>,
    key: &str,
    default: T,
) -> T {
    match lookup(key) {
        None => default,
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                problems.push(format!("{key} has an invalid value: `{raw}`"));
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("SUPABASE_URL", "https://project.example.com"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
            ("AGORA_APP_ID", "app"),
            ("AGORA_APP_CERTIFICATE", "0123456789abcdef0123456789abcdef"),
        ])
    }

    fn lookup(env: HashMap<&'static str, &'static str>) -> impl Fn(&str) -> Option<String> {
        move |key| env.get(key).map(|v| v.to_string())
    }

    #[test]
    fn loads_with_defaults() {
        let config = AppConfig::from_lookup(lookup(full_env())).expect("config");
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.agora.token_ttl_secs, DEFAULT_TOKEN_TTL_SECS);
        assert_eq!(config.supabase.avatar_bucket, DEFAULT_AVATAR_BUCKET);
    }

    #[test]
    fn missing_variables_are_all_enumerated() {
        let err = AppConfig::from_lookup(|_| None).expect_err("must fail");
        let ConfigError::Invalid(problems) = err;
        for key in [
            "SUPABASE_URL",
            "SUPABASE_ANON_KEY",
            "SUPABASE_SERVICE_ROLE_KEY",
            "AGORA_APP_ID",
            "AGORA_APP_CERTIFICATE",
        ] {
            assert!(
                problems.iter().any(|p| p.contains(key)),
                "missing problem for {key}: {problems:?}"
            );
        }
    }

    #[test]
    fn invalid_port_and_url_are_reported() {
        let mut env = full_env();
        env.insert("SUPABASE_URL", "not a url");
        env.insert("PORT", "eighty");
        let err = AppConfig::from_lookup(lookup(env)).expect_err("must fail");
        let ConfigError::Invalid(problems) = err;
        assert!(problems.iter().any(|p| p.contains("SUPABASE_URL")));
        assert!(problems.iter().any(|p| p.contains("PORT")));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let mut env = full_env();
        env.insert("SUPABASE_ANON_KEY", "  ");
        let err = AppConfig::from_lookup(lookup(env)).expect_err("must fail");
        let ConfigError::Invalid(problems) = err;
        assert!(problems.iter().any(|p| p.contains("SUPABASE_ANON_KEY")));
    }
}
