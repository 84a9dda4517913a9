//! Settings loading with environment variable overrides
//!
//! Settings come from an `appsettings.json`-style document. Once the
//! `SwaggerOption` section is bound, any `SWAGGER_*` variable that is set
//! takes precedence:
//!
//! | Variable | Field |
//! |---|---|
//! | `SWAGGER_BASE_PATH` | `basePath` |
//! | `SWAGGER_ROUTE_PREFIX` | `routePrefix` |
//! | `SWAGGER_AUTHORIZATION_URL` | `authentication.authorizationUrl` |
//! | `SWAGGER_TOKEN_URL` | `authentication.tokenUrl` |
//! | `SWAGGER_OAUTH_CLIENT_ID` | `authentication.clientId` |
//! | `SWAGGER_OAUTH_CLIENT_SECRET` | `authentication.clientSecret` |
//! | `SWAGGER_HEALTH_CHECK_ENDPOINT` | `features.healthCheckEndpoint` |
//! | `SWAGGER_BEARER_AUTHENTICATION` | `features.bearerAuthentication` |
//! | `SWAGGER_OAUTH_AUTHENTICATION` | `features.oauthAuthentication` |
//!
//! ```ignore
//! use swaggerkit_core::config::{load_dotenv, Settings};
//!
//! load_dotenv();
//! let option = Settings::from_file("appsettings.json")?.swagger_option()?;
//! ```

use crate::error::ConfigError;
use crate::options::SwaggerOption;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Prefix of the environment variables that override the bound section
pub const ENV_PREFIX: &str = "SWAGGER_";

/// Parsed settings document
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    root: Value,
}

impl Settings {
    /// Settings with no sections
    pub fn empty() -> Self {
        Self {
            root: Value::Object(Default::default()),
        }
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(Self::from_value(serde_json::from_str(json)?))
    }

    /// Read a settings file; a missing file yields empty settings
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Settings file not found; using defaults");
                return Ok(Self::empty());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::from_json_str(&json)
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Bind `SwaggerOption` and apply `SWAGGER_*` overrides
    pub fn swagger_option(&self) -> Result<SwaggerOption, ConfigError> {
        let mut option = SwaggerOption::bind(&self.root);
        apply_env_overrides(&mut option)?;
        Ok(option)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::empty()
    }
}

/// `SWAGGER_*` variables, all optional
#[derive(Debug, Default, Deserialize)]
struct SwaggerEnv {
    base_path: Option<String>,
    route_prefix: Option<String>,
    authorization_url: Option<String>,
    token_url: Option<String>,
    oauth_client_id: Option<String>,
    oauth_client_secret: Option<String>,
    health_check_endpoint: Option<bool>,
    bearer_authentication: Option<bool>,
    oauth_authentication: Option<bool>,
}

/// Overwrite fields of `option` with the `SWAGGER_*` variables that are set
///
/// A variable that cannot be parsed (for example a non-boolean feature flag)
/// is a [`ConfigError::Env`].
pub fn apply_env_overrides(option: &mut SwaggerOption) -> Result<(), ConfigError> {
    let env: SwaggerEnv = envy::prefixed(ENV_PREFIX).from_env()?;

    fn set<T>(target: &mut T, value: Option<T>) {
        if let Some(value) = value {
            *target = value;
        }
    }

    set(&mut option.base_path, env.base_path);
    set(&mut option.route_prefix, env.route_prefix);

    let auth = &mut option.authentication;
    if env.authorization_url.is_some() {
        auth.authorization_url = env.authorization_url;
    }
    if env.token_url.is_some() {
        auth.token_url = env.token_url;
    }
    if env.oauth_client_id.is_some() {
        auth.client_id = env.oauth_client_id;
    }
    if env.oauth_client_secret.is_some() {
        auth.client_secret = env.oauth_client_secret;
    }

    let features = &mut option.features;
    set(&mut features.health_check_endpoint, env.health_check_endpoint);
    set(&mut features.bearer_authentication, env.bearer_authentication);
    set(&mut features.oauth_authentication, env.oauth_authentication);
    Ok(())
}

/// Load variables from `.env` in the current directory
///
/// Existing variables are not overridden and a missing file is ignored.
pub fn load_dotenv() {
    let _ = dotenvy::dotenv();
}

/// Load variables from a specific env file
pub fn load_dotenv_from<P: AsRef<Path>>(path: P) {
    let _ = dotenvy::from_path(path);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    const VARS: &[&str] = &[
        "SWAGGER_BASE_PATH",
        "SWAGGER_ROUTE_PREFIX",
        "SWAGGER_AUTHORIZATION_URL",
        "SWAGGER_TOKEN_URL",
        "SWAGGER_OAUTH_CLIENT_ID",
        "SWAGGER_OAUTH_CLIENT_SECRET",
        "SWAGGER_HEALTH_CHECK_ENDPOINT",
        "SWAGGER_BEARER_AUTHENTICATION",
        "SWAGGER_OAUTH_AUTHENTICATION",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_missing_file_yields_defaults() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::from_file(dir.path().join("appsettings.json")).unwrap();
        assert_eq!(settings, Settings::empty());
        assert_eq!(settings.swagger_option().unwrap(), SwaggerOption::default());
    }

    #[test]
    #[serial]
    fn test_file_is_bound() {
        clear_env();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "SwaggerOption": {{ "routePrefix": "swagger",
                 "documents": [{{ "version": "v1", "title": "Orders" }}] }} }}"#
        )
        .unwrap();

        let option = Settings::from_file(file.path()).unwrap().swagger_option().unwrap();
        assert_eq!(option.route_prefix, "swagger");
        assert_eq!(option.documents[0].title, "Orders");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let err = Settings::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    #[serial]
    fn test_env_overrides_bound_values() {
        clear_env();
        std::env::set_var("SWAGGER_ROUTE_PREFIX", "api-docs");
        std::env::set_var("SWAGGER_OAUTH_CLIENT_ID", "from-env");
        std::env::set_var("SWAGGER_BEARER_AUTHENTICATION", "true");

        let settings = Settings::from_json_str(
            r#"{ "SwaggerOption": { "routePrefix": "docs", "basePath": "/api/",
                 "authentication": { "clientId": "from-file" } } }"#,
        )
        .unwrap();
        let option = settings.swagger_option();
        clear_env();

        let option = option.unwrap();
        assert_eq!(option.route_prefix, "api-docs");
        assert_eq!(option.base_path, "/api/");
        assert_eq!(option.authentication.client_id.as_deref(), Some("from-env"));
        assert!(option.features.bearer_authentication);
        assert!(option.features.oauth_authentication);
    }

    #[test]
    #[serial]
    fn test_unparseable_env_flag_is_an_error() {
        clear_env();
        std::env::set_var("SWAGGER_OAUTH_AUTHENTICATION", "sometimes");
        let result = Settings::empty().swagger_option();
        clear_env();

        assert!(matches!(result, Err(ConfigError::Env(_))));
    }

    #[test]
    #[serial]
    fn test_dotenv_does_not_override_existing() {
        clear_env();
        std::env::set_var("SWAGGER_BASE_PATH", "/already/");
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "SWAGGER_BASE_PATH=/from-dotenv/").unwrap();
        writeln!(file, "SWAGGER_TOKEN_URL=https://auth.example.com/token").unwrap();

        load_dotenv_from(file.path());
        let option = Settings::empty().swagger_option();
        clear_env();

        let option = option.unwrap();
        assert_eq!(option.base_path, "/already/");
        assert_eq!(
            option.authentication.token_url.as_deref(),
            Some("https://auth.example.com/token")
        );
    }
}
