//! Swagger UI HTML generation

use serde::{Deserialize, Serialize};

/// Swagger UI assets are served from this `swagger-ui-dist` release
pub const SWAGGER_UI_DIST: &str = "https://unpkg.com/swagger-ui-dist@5.9.0";

/// How operations are expanded when the UI loads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocExpansion {
    #[default]
    List,
    Full,
    None,
}

/// One entry of the UI's document selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlDescriptor {
    pub url: String,
    pub name: String,
}

/// Parameters passed to `ui.initOAuth`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub scopes: Vec<String>,
    pub use_pkce_with_authorization_code_grant: bool,
}

/// Swagger UI configuration
///
/// Serialized fields become the `SwaggerUIBundle` configuration object.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwaggerUiOptions {
    #[serde(skip)]
    pub route_prefix: String,
    #[serde(skip)]
    pub document_title: String,
    pub urls: Vec<UrlDescriptor>,
    pub filter: bool,
    pub doc_expansion: DocExpansion,
    pub display_request_duration: bool,
    pub deep_linking: bool,
    #[serde(skip)]
    pub oauth: Option<OAuthConfig>,
}

impl SwaggerUiOptions {
    pub fn new() -> Self {
        Self {
            route_prefix: "swagger".to_string(),
            document_title: "Swagger UI".to_string(),
            deep_linking: true,
            ..Default::default()
        }
    }

    /// Route (without slashes) the UI is served from
    pub fn route_prefix(&mut self, prefix: impl Into<String>) -> &mut Self {
        self.route_prefix = prefix.into();
        self
    }

    pub fn document_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.document_title = title.into();
        self
    }

    /// Enable the tag filter box
    pub fn enable_filter(&mut self) -> &mut Self {
        self.filter = true;
        self
    }

    pub fn doc_expansion(&mut self, expansion: DocExpansion) -> &mut Self {
        self.doc_expansion = expansion;
        self
    }

    pub fn display_request_duration(&mut self) -> &mut Self {
        self.display_request_duration = true;
        self
    }

    /// Add a document to the selector
    pub fn swagger_endpoint(&mut self, url: impl Into<String>, name: impl Into<String>) -> &mut Self {
        self.urls.push(UrlDescriptor {
            url: url.into(),
            name: name.into(),
        });
        self
    }

    pub fn oauth_client_id(&mut self, client_id: impl Into<String>) -> &mut Self {
        self.oauth.get_or_insert_with(OAuthConfig::default).client_id = Some(client_id.into());
        self
    }

    pub fn oauth_client_secret(&mut self, client_secret: impl Into<String>) -> &mut Self {
        self.oauth.get_or_insert_with(OAuthConfig::default).client_secret =
            Some(client_secret.into());
        self
    }

    pub fn oauth_scopes<I, S>(&mut self, scopes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.oauth.get_or_insert_with(OAuthConfig::default).scopes =
            scopes.into_iter().map(Into::into).collect();
        self
    }

    /// Use PKCE with the authorization code grant
    pub fn oauth_use_pkce(&mut self) -> &mut Self {
        self.oauth
            .get_or_insert_with(OAuthConfig::default)
            .use_pkce_with_authorization_code_grant = true;
        self
    }
}

/// Serialize `value` for embedding inside a `<script>` element
fn script_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

/// Generate Swagger UI HTML page
pub fn generate_swagger_html(options: &SwaggerUiOptions) -> Result<String, serde_json::Error> {
    let config = script_json(options)?;
    let oauth = match &options.oauth {
        Some(oauth) => script_json(oauth)?,
        None => "null".to_string(),
    };
    let title = html_escape(&options.document_title);

    let mut html = String::with_capacity(2048 + config.len());
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>"#,
    );
    html.push_str(&title);
    html.push_str(
        r#"</title>
    <link rel="stylesheet" href=""#,
    );
    html.push_str(SWAGGER_UI_DIST);
    html.push_str(
        r#"/swagger-ui.css" />
    <style>
        body {
            margin: 0;
            padding: 0;
        }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src=""#,
    );
    html.push_str(SWAGGER_UI_DIST);
    html.push_str(
        r#"/swagger-ui-bundle.js"></script>
    <script src=""#,
    );
    html.push_str(SWAGGER_UI_DIST);
    html.push_str(
        r#"/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            const config = "#,
    );
    html.push_str(&config);
    html.push_str(
        r#";
            config.dom_id = '#swagger-ui';
            config.presets = [
                SwaggerUIBundle.presets.apis,
                SwaggerUIStandalonePreset
            ];
            config.layout = "StandaloneLayout";
            const ui = SwaggerUIBundle(config);
            const oauth = "#,
    );
    html.push_str(&oauth);
    html.push_str(
        r#";
            if (oauth) {
                ui.initOAuth(oauth);
            }
            window.ui = ui;
        };
    </script>
</body>
</html>"#,
    );
    Ok(html)
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
