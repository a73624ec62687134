use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

/// Default gateway host fronting the provider.
const DEFAULT_GATEWAY_HOST: &str = "gateway.ai.cloudflare.com";

/// Gateway adapter path for Google AI Studio.
const DEFAULT_GATEWAY_PROVIDER: &str = "google-ai-studio";

/// Flash-tier model used for every generation.
const DEFAULT_TEXT_MODEL: &str = "gemini-2.0-flash-exp";

const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub common: core_config::Config,
    pub google: GoogleConfig,
    pub gateway: GatewayConfig,
    pub models: ModelConfig,
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: Secret<String>,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub account_id: String,
    pub gateway_name: String,
    pub provider: String,
}

impl GatewayConfig {
    /// Base URL routing provider calls through the gateway:
    /// `https://<host>/v1/<account-id>/<gateway-name>/<provider>`.
    pub fn base_url(&self) -> String {
        format!(
            "https://{}/v1/{}/{}/{}",
            self.host, self.account_id, self.gateway_name, self.provider
        )
    }
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Model for text generation (e.g., gemini-2.0-flash-exp)
    pub text_model: String,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    pub timeout: Duration,
}

impl RelayConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let timeout_secs = get_env(
            "UPSTREAM_TIMEOUT_SECS",
            Some(&DEFAULT_UPSTREAM_TIMEOUT_SECS.to_string()),
            is_prod,
        )?
        .parse()
        .map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("UPSTREAM_TIMEOUT_SECS is invalid: {}", e))
        })?;

        Ok(RelayConfig {
            common: common_config,
            google: GoogleConfig {
                api_key: Secret::new(get_env("GOOGLE_GEMINI_API_KEY", None, is_prod)?),
            },
            gateway: GatewayConfig {
                host: get_env("AI_GATEWAY_HOST", Some(DEFAULT_GATEWAY_HOST), is_prod)?,
                account_id: get_env("CLOUDFLARE_ACCOUNT_ID", None, is_prod)?,
                gateway_name: get_env("CLOUDFLARE_AI_GATEWAY_NAME", None, is_prod)?,
                provider: get_env("AI_GATEWAY_PROVIDER", Some(DEFAULT_GATEWAY_PROVIDER), is_prod)?,
            },
            models: ModelConfig {
                text_model: get_env("GENAI_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
            },
            upstream: UpstreamConfig {
                timeout: Duration::from_secs(timeout_secs),
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_base_url_interpolates_account_and_name() {
        let gateway = GatewayConfig {
            host: DEFAULT_GATEWAY_HOST.to_string(),
            account_id: "acct-42".to_string(),
            gateway_name: "relay-gw".to_string(),
            provider: DEFAULT_GATEWAY_PROVIDER.to_string(),
        };

        assert_eq!(
            gateway.base_url(),
            "https://gateway.ai.cloudflare.com/v1/acct-42/relay-gw/google-ai-studio"
        );
    }

    #[test]
    fn get_env_falls_back_to_default_outside_prod() {
        let value = get_env("PROMPT_RELAY_TEST_UNSET_VAR", Some("fallback"), false).unwrap();
        assert_eq!(value, "fallback");
    }

    #[test]
    fn get_env_requires_value_in_prod() {
        let err = get_env("PROMPT_RELAY_TEST_UNSET_VAR", Some("fallback"), true).unwrap_err();
        assert!(err.to_string().contains("required in production"));
    }

    #[test]
    fn get_env_requires_value_without_default() {
        let err = get_env("PROMPT_RELAY_TEST_UNSET_VAR", None, false).unwrap_err();
        assert!(err.to_string().contains("is required but not set"));
    }
}
