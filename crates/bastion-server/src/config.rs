use anyhow::{Context, Result, ensure};
use bastion_auth::config::MAX_TOKEN_LIFETIME_SECS;
use bastion_auth::{AuthConfig, SystemOrganizationConfig, SystemUserConfig};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use uuid::Uuid;

/// Server configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub auth: AuthConfig,
    pub system_organization: SystemOrganizationConfig,
    pub system_user: SystemUserConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| lookup(key).with_context(|| format!("{key} must be set"));

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            access_token_secret: required("BASTION_ACCESS_TOKEN_SECRET")?.into_bytes(),
            refresh_token_secret: required("BASTION_REFRESH_TOKEN_SECRET")?.into_bytes(),
            access_token_lifetime_secs: parse_lifetime(
                &lookup,
                "BASTION_ACCESS_TOKEN_LIFETIME_SECS",
                defaults.access_token_lifetime_secs,
            )?,
            refresh_token_lifetime_secs: parse_lifetime(
                &lookup,
                "BASTION_REFRESH_TOKEN_LIFETIME_SECS",
                defaults.refresh_token_lifetime_secs,
            )?,
            pepper: lookup("BASTION_PASSWORD_PEPPER"),
        };
        ensure!(
            auth.access_token_secret != auth.refresh_token_secret,
            "BASTION_ACCESS_TOKEN_SECRET and BASTION_REFRESH_TOKEN_SECRET must differ"
        );

        Ok(Self {
            auth,
            system_organization: SystemOrganizationConfig {
                id: parse_uuid(&required("BASTION_SYSTEM_ORGANIZATION_ID")?)
                    .context("BASTION_SYSTEM_ORGANIZATION_ID must be a valid UUID")?,
                legal_name: required("BASTION_SYSTEM_ORGANIZATION_LEGAL_NAME")?,
            },
            system_user: SystemUserConfig {
                id: parse_uuid(&required("BASTION_SYSTEM_USER_ID")?)
                    .context("BASTION_SYSTEM_USER_ID must be a valid UUID")?,
                email: required("BASTION_SYSTEM_USER_EMAIL")?,
                password: required("BASTION_SYSTEM_USER_PASSWORD")?,
            },
        })
    }
}

fn parse_uuid(value: &str) -> Result<Uuid> {
    Ok(Uuid::parse_str(value.trim())?)
}

fn parse_lifetime(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<u64> {
    let secs = parse_or(lookup, key, default)?;
    ensure!(
        (1..=MAX_TOKEN_LIFETIME_SECS).contains(&secs),
        "{key} must be between 1 and {MAX_TOKEN_LIFETIME_SECS} seconds"
    );
    Ok(secs)
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{key} must be a valid number")),
        None => Ok(default),
    }
}
