//! Swagger configuration model
//!
//! The `SwaggerOption` section describes the published documents, the
//! authentication schemes and a few feature toggles. Keys are camelCase:
//!
//! ```json
//! {
//!   "SwaggerOption": {
//!     "basePath": "/",
//!     "routePrefix": "docs",
//!     "authentication": {
//!       "authorizationUrl": "https://auth.example.com/authorize",
//!       "tokenUrl": "https://auth.example.com/token",
//!       "scopes": { "orders.read": "Read orders" },
//!       "clientId": "orders-ui",
//!       "clientSecret": "secret"
//!     },
//!     "documents": [
//!       { "version": "v1", "title": "Orders API", "description": "...",
//!         "contact": { "name": "Ops", "email": "ops@example.com", "url": "https://example.com" } }
//!     ],
//!     "features": { "healthCheckEndpoint": true, "bearerAuthentication": false, "oauthAuthentication": true }
//!   }
//! }
//! ```
//!
//! Binding is field by field: a missing key keeps its default and a key of
//! the wrong type is logged and ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

/// Name of the configuration section holding [`SwaggerOption`]
pub const SECTION_NAME: &str = "SwaggerOption";

/// Root Swagger configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SwaggerOption {
    pub base_path: String,
    pub route_prefix: String,
    pub authentication: AuthOption,
    pub documents: Vec<DocOption>,
    pub features: FeatureOption,
}

/// One published document version
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DocOption {
    pub version: String,
    pub title: String,
    pub description: String,
    pub contact: ContactOption,
}

/// Contact published in each document's `info`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContactOption {
    pub name: String,
    pub email: String,
    pub url: String,
}

/// OAuth2 settings, used only when OAuth is enabled
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AuthOption {
    pub authorization_url: Option<String>,
    pub token_url: Option<String>,
    /// Scope name to description
    pub scopes: BTreeMap<String, String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

/// Feature toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FeatureOption {
    pub health_check_endpoint: bool,
    pub bearer_authentication: bool,
    pub oauth_authentication: bool,
}

impl Default for SwaggerOption {
    fn default() -> Self {
        Self {
            base_path: "/".to_string(),
            route_prefix: "docs".to_string(),
            authentication: AuthOption::default(),
            documents: Vec::new(),
            features: FeatureOption::default(),
        }
    }
}

impl Default for ContactOption {
    fn default() -> Self {
        Self {
            name: "Thomas ILLIET".to_string(),
            email: "contact@thomas-illiet.fr".to_string(),
            url: "https://www.thomas-illiet.fr/".to_string(),
        }
    }
}

impl Default for FeatureOption {
    fn default() -> Self {
        Self {
            health_check_endpoint: true,
            bearer_authentication: false,
            oauth_authentication: true,
        }
    }
}

impl SwaggerOption {
    /// Bind the `SwaggerOption` section of a configuration root
    ///
    /// The section name and every key below it are matched
    /// case-insensitively, so `basePath` and `BasePath` bind alike. When the
    /// section is absent the defaults are returned.
    pub fn bind(root: &Value) -> Self {
        match find_section(root, SECTION_NAME) {
            Some(section) => Self::bind_section(section),
            None => Self::default(),
        }
    }

    /// Bind an already extracted section
    pub fn bind_section(section: &Value) -> Self {
        let mut option = Self::default();
        let Some(object) = as_object(section, SECTION_NAME) else {
            return option;
        };

        bind_field(object, SECTION_NAME, "basePath", &mut option.base_path);
        bind_field(object, SECTION_NAME, "routePrefix", &mut option.route_prefix);
        if let Some(auth) = find_key(object, "authentication") {
            option.authentication = AuthOption::bind_section(auth);
        }
        if let Some(features) = find_key(object, "features") {
            option.features = FeatureOption::bind_section(features);
        }
        match find_key(object, "documents") {
            Some(Value::Array(documents)) => {
                option.documents = documents
                    .iter()
                    .enumerate()
                    .filter_map(|(index, doc)| {
                        if doc.is_object() {
                            Some(DocOption::bind_section(doc))
                        } else {
                            warn!(index, "Ignoring SwaggerOption.documents entry that is not an object");
                            None
                        }
                    })
                    .collect();
            }
            Some(Value::Null) | None => {}
            Some(_) => warn!("Ignoring SwaggerOption.documents: expected an array"),
        }
        option
    }
}

impl DocOption {
    pub fn bind_section(section: &Value) -> Self {
        let mut option = Self::default();
        let path = "SwaggerOption.documents";
        let Some(object) = as_object(section, path) else {
            return option;
        };
        bind_field(object, path, "version", &mut option.version);
        bind_field(object, path, "title", &mut option.title);
        bind_field(object, path, "description", &mut option.description);
        if let Some(contact) = find_key(object, "contact") {
            option.contact = ContactOption::bind_section(contact);
        }
        option
    }
}

impl ContactOption {
    pub fn bind_section(section: &Value) -> Self {
        let mut option = Self::default();
        let path = "SwaggerOption.documents.contact";
        let Some(object) = as_object(section, path) else {
            return option;
        };
        bind_field(object, path, "name", &mut option.name);
        bind_field(object, path, "email", &mut option.email);
        bind_field(object, path, "url", &mut option.url);
        option
    }
}

impl AuthOption {
    pub fn bind_section(section: &Value) -> Self {
        let mut option = Self::default();
        let path = "SwaggerOption.authentication";
        let Some(object) = as_object(section, path) else {
            return option;
        };
        bind_field(object, path, "authorizationUrl", &mut option.authorization_url);
        bind_field(object, path, "tokenUrl", &mut option.token_url);
        bind_field(object, path, "scopes", &mut option.scopes);
        bind_field(object, path, "clientId", &mut option.client_id);
        bind_field(object, path, "clientSecret", &mut option.client_secret);
        option
    }

    /// Scope names in the order they are requested by the UI
    pub fn scope_names(&self) -> Vec<String> {
        self.scopes.keys().cloned().collect()
    }
}

impl FeatureOption {
    pub fn bind_section(section: &Value) -> Self {
        let mut option = Self::default();
        let path = "SwaggerOption.features";
        let Some(object) = as_object(section, path) else {
            return option;
        };
        bind_field(object, path, "healthCheckEndpoint", &mut option.health_check_endpoint);
        bind_field(object, path, "bearerAuthentication", &mut option.bearer_authentication);
        bind_field(object, path, "oauthAuthentication", &mut option.oauth_authentication);
        option
    }
}

fn find_section<'a>(root: &'a Value, name: &str) -> Option<&'a Value> {
    find_key(root.as_object()?, name)
}

/// Look up `key` ASCII-case-insensitively, preferring an exact match
fn find_key<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    object.get(key).or_else(|| {
        object
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(key))
            .map(|(_, value)| value)
    })
}

fn as_object<'a>(value: &'a Value, path: &str) -> Option<&'a Map<String, Value>> {
    match value {
        Value::Object(object) => Some(object),
        Value::Null => None,
        _ => {
            warn!(section = path, "Ignoring configuration section: expected an object");
            None
        }
    }
}

/// Overwrite `target` with `object[key]` when present and well-typed
fn bind_field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    path: &str,
    key: &str,
    target: &mut T,
) {
    let Some(value) = find_key(object, key) else {
        return;
    };
    if value.is_null() {
        return;
    }
    match T::deserialize(value) {
        Ok(bound) => *target = bound,
        Err(err) => warn!(
            section = path,
            key,
            error = %err,
            "Ignoring malformed configuration value; keeping default"
        ),
    }
}
