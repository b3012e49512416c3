//! Settings resolution for the `fetch` command.
//!
//! Precedence, highest first: command-line flag, config file, provider
//! policy, built-in default. The provider may also come from
//! `TICKRANGE_SOURCE`, between the flag and the file. Credentials
//! additionally fall back to the environment.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tickrange_core::adapters::{ACCESS_KEY_ENV, API_KEY_ENV, DEFAULT_PROXY_URL, DEMO_API_KEY};
use tickrange_core::http_client::DEFAULT_TIMEOUT_MS;
use tickrange_core::{BatchOptions, OutputSize, ProviderId, ProviderPolicy, RateLimitMode};

use crate::cli::FetchArgs;
use crate::error::CliError;

/// Environment override for the provider when `--source` is absent.
pub const SOURCE_ENV: &str = "TICKRANGE_SOURCE";

/// Contents of the optional `--config` TOML file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub provider: Option<ProviderId>,
    pub rate_budget: Option<u32>,
    pub rate_limit_mode: Option<RateLimitMode>,
    pub window_ms: Option<u64>,
    pub request_spacing_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub marketstack: MarketstackSection,
    pub alphavantage: AlphaVantageSection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketstackSection {
    pub access_key: Option<String>,
    pub proxy_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlphaVantageSection {
    pub api_key: Option<String>,
    pub output_size: Option<OutputSize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path).map_err(|error| CliError::Config {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        toml::from_str(&content).map_err(|error| CliError::Config {
            path: path.to_path_buf(),
            message: error.message().to_owned(),
        })
    }

    pub fn load_optional(path: Option<&Path>) -> Result<Self, CliError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }
}

/// Fully resolved inputs of one `fetch` run.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchSettings {
    pub provider: ProviderId,
    pub batch: BatchOptions,
    pub timeout_ms: u64,
    pub marketstack_access_key: Option<String>,
    pub marketstack_proxy_url: Option<String>,
    pub alphavantage_api_key: String,
    pub alphavantage_output_size: OutputSize,
}

impl FetchSettings {
    /// `env` looks up an environment variable; injected so resolution stays
    /// testable.
    pub fn resolve<F>(args: &FetchArgs, file: &FileConfig, env: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_provider = env(SOURCE_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(|value| value.parse::<ProviderId>())
            .transpose()?;
        let provider = args
            .source
            .or(env_provider)
            .or(file.provider)
            .unwrap_or(ProviderId::Marketstack);
        let policy = ProviderPolicy::default_for(provider);

        let rate_budget = args.rate_budget.or(file.rate_budget).or(policy.rate_budget);
        let rate_limit_mode = args
            .rate_limit_mode
            .or(file.rate_limit_mode)
            .unwrap_or(policy.rate_limit_mode);
        let window = args
            .window_ms
            .or(file.window_ms)
            .map_or(policy.window, Duration::from_millis);
        let request_spacing = args
            .spacing_ms
            .or(file.request_spacing_ms)
            .map(Duration::from_millis)
            .or(policy.request_spacing)
            .filter(|spacing| !spacing.is_zero());

        let non_blank = |value: &String| !value.trim().is_empty();
        let marketstack_access_key = file
            .marketstack
            .access_key
            .clone()
            .filter(non_blank)
            .or_else(|| env(ACCESS_KEY_ENV).filter(non_blank));
        let alphavantage_api_key = file
            .alphavantage
            .api_key
            .clone()
            .filter(non_blank)
            .or_else(|| env(API_KEY_ENV).filter(non_blank))
            .unwrap_or_else(|| String::from(DEMO_API_KEY));

        let marketstack_proxy_url = args
            .proxy_url
            .clone()
            .or_else(|| file.marketstack.proxy_url.clone())
            .unwrap_or_else(|| String::from(DEFAULT_PROXY_URL));

        Ok(Self {
            provider,
            batch: BatchOptions {
                rate_budget,
                rate_limit_mode,
                window,
                request_spacing,
            },
            timeout_ms: args
                .timeout_ms
                .or(file.timeout_ms)
                .unwrap_or(DEFAULT_TIMEOUT_MS),
            marketstack_access_key,
            marketstack_proxy_url: Some(marketstack_proxy_url).filter(non_blank),
            alphavantage_api_key,
            alphavantage_output_size: args
                .output_size
                .or(file.alphavantage.output_size)
                .unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn args(symbols: &str) -> FetchArgs {
        FetchArgs {
            symbols: symbols.to_owned(),
            source: None,
            rate_budget: None,
            rate_limit_mode: None,
            window_ms: None,
            spacing_ms: None,
            timeout_ms: None,
            proxy_url: None,
            output_size: None,
        }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn defaults_to_marketstack_through_proxy() {
        let settings = FetchSettings::resolve(&args("AAPL"), &FileConfig::default(), no_env)
            .expect("settings");

        assert_eq!(settings.provider, ProviderId::Marketstack);
        assert_eq!(settings.batch.rate_budget, None);
        assert_eq!(settings.marketstack_proxy_url.as_deref(), Some(DEFAULT_PROXY_URL));
        assert_eq!(settings.marketstack_access_key, None);
        assert_eq!(settings.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn alphavantage_picks_up_free_tier_policy_and_demo_key() {
        let mut fetch = args("IBM");
        fetch.source = Some(ProviderId::Alphavantage);

        let settings =
            FetchSettings::resolve(&fetch, &FileConfig::default(), no_env).expect("settings");

        assert_eq!(settings.batch.rate_budget, Some(5));
        assert_eq!(settings.batch.request_spacing, Some(Duration::from_secs(1)));
        assert_eq!(settings.alphavantage_api_key, DEMO_API_KEY);
    }

    #[test]
    fn flags_override_file_which_overrides_policy() {
        let file = FileConfig {
            provider: Some(ProviderId::Alphavantage),
            rate_budget: Some(3),
            rate_limit_mode: Some(RateLimitMode::RejectRemaining),
            window_ms: Some(5_000),
            ..FileConfig::default()
        };
        let mut fetch = args("IBM");
        fetch.rate_budget = Some(7);
        fetch.rate_limit_mode = Some(RateLimitMode::FailFast);

        let settings = FetchSettings::resolve(&fetch, &file, no_env).expect("settings");

        assert_eq!(settings.provider, ProviderId::Alphavantage);
        assert_eq!(settings.batch.rate_budget, Some(7));
        assert_eq!(settings.batch.rate_limit_mode, RateLimitMode::FailFast);
        assert_eq!(settings.batch.window, Duration::from_secs(5));
    }

    #[test]
    fn zero_spacing_disables_pacing() {
        let mut fetch = args("IBM");
        fetch.source = Some(ProviderId::Alphavantage);
        fetch.spacing_ms = Some(0);

        let settings =
            FetchSettings::resolve(&fetch, &FileConfig::default(), no_env).expect("settings");

        assert_eq!(settings.batch.request_spacing, None);
    }

    #[test]
    fn credentials_fall_back_to_environment() {
        let env = |key: &str| match key {
            ACCESS_KEY_ENV => Some(String::from("ms-env")),
            API_KEY_ENV => Some(String::from("av-env")),
            _ => None,
        };

        let settings =
            FetchSettings::resolve(&args("AAPL"), &FileConfig::default(), env).expect("settings");

        assert_eq!(settings.marketstack_access_key.as_deref(), Some("ms-env"));
        assert_eq!(settings.alphavantage_api_key, "av-env");
    }

    #[test]
    fn source_env_sits_between_flag_and_file() {
        let env = |key: &str| (key == SOURCE_ENV).then(|| String::from("Yahoo"));
        let file = FileConfig {
            provider: Some(ProviderId::Alphavantage),
            ..FileConfig::default()
        };

        let from_env = FetchSettings::resolve(&args("AAPL"), &file, env).expect("settings");
        assert_eq!(from_env.provider, ProviderId::Yahoo);

        let mut fetch = args("AAPL");
        fetch.source = Some(ProviderId::Marketstack);
        let from_flag = FetchSettings::resolve(&fetch, &file, env).expect("settings");
        assert_eq!(from_flag.provider, ProviderId::Marketstack);
    }

    #[test]
    fn unknown_source_env_is_a_validation_error() {
        let env = |key: &str| (key == SOURCE_ENV).then(|| String::from("polygon"));

        let error = FetchSettings::resolve(&args("AAPL"), &FileConfig::default(), env)
            .expect_err("must fail");

        assert!(matches!(error, CliError::Validation(_)));
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("invalid source 'polygon'"));
    }

    #[test]
    fn empty_proxy_flag_means_direct_call() {
        let mut fetch = args("AAPL");
        fetch.proxy_url = Some(String::new());

        let settings =
            FetchSettings::resolve(&fetch, &FileConfig::default(), no_env).expect("settings");

        assert_eq!(settings.marketstack_proxy_url, None);
    }

    #[test]
    fn loads_toml_file() {
        let file = write_config(
            r#"
provider = "yahoo"
rate_budget = 10
rate_limit_mode = "reject-remaining"
timeout_ms = 2500

[marketstack]
access_key = "abc"

[alphavantage]
output_size = "full"
"#,
        );

        let config = FileConfig::load(file.path()).expect("valid config");

        assert_eq!(config.provider, Some(ProviderId::Yahoo));
        assert_eq!(config.rate_budget, Some(10));
        assert_eq!(config.rate_limit_mode, Some(RateLimitMode::RejectRemaining));
        assert_eq!(config.timeout_ms, Some(2_500));
        assert_eq!(config.marketstack.access_key.as_deref(), Some("abc"));
        assert_eq!(config.alphavantage.output_size, Some(OutputSize::Full));
    }

    #[test]
    fn unknown_keys_are_config_errors() {
        let file = write_config("providr = \"yahoo\"\n");

        let error = FileConfig::load(file.path()).expect_err("must fail");

        assert_eq!(error.exit_code(), 7);
    }

    #[test]
    fn missing_file_is_config_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let error = FileConfig::load(&dir.path().join("absent.toml")).expect_err("must fail");

        assert!(matches!(error, CliError::Config { .. }));
    }
}
