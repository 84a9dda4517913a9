//! Turn a bound [`SwaggerOption`] into generator and UI options

use crate::options::{AuthOption, ContactOption, DocOption, SwaggerOption};
use swaggerkit_openapi::{
    ApiDescription, ApiInfo, Contact, DocExpansion, FilterRegistry, OAuthFlow, OAuthFlows,
    ParameterLocation, SecurityRequirement, SecurityScheme, SwaggerGenError, SwaggerGenOptions,
    SwaggerUiOptions,
};
use tracing::{debug, info, warn};

/// Name of the OAuth2 security scheme
pub const OAUTH2_SCHEME: &str = "Oauth2";
/// Name of the bearer token security scheme
pub const BEARER_SCHEME: &str = "Bearer";

const OAUTH2_DESCRIPTION: &str = "Standard authorisation using the Oauth2 scheme.";
const BEARER_DESCRIPTION: &str =
    "Standard authorisation using the Bearer scheme. Example: \"bearer {token}\"";

/// Configure the document generator from `option`
///
/// Returns `None` when no document is configured; nothing is registered in
/// that case. Otherwise every document, security scheme, policy and filter is
/// set up, and XML comments beside the executable are loaded when present.
pub fn add_swagger(option: &SwaggerOption, filters: FilterRegistry) -> Option<SwaggerGenOptions> {
    if option.documents.is_empty() {
        debug!("No Swagger documents configured; generator not registered");
        return None;
    }

    let mut gen = SwaggerGenOptions::new();

    for doc in &option.documents {
        gen.swagger_doc(doc.version.clone(), doc_info(doc));
    }

    if option.features.oauth_authentication {
        gen.add_security_definition(OAUTH2_SCHEME, oauth2_scheme(&option.authentication));
        gen.add_security_requirement(SecurityRequirement::new(OAUTH2_SCHEME, Vec::<String>::new()));
    }

    if option.features.bearer_authentication {
        gen.add_security_definition(
            BEARER_SCHEME,
            SecurityScheme::ApiKey {
                description: Some(BEARER_DESCRIPTION.to_string()),
                name: "Authorization".to_string(),
                location: ParameterLocation::Header,
            },
        );
        gen.add_security_requirement(SecurityRequirement::new(BEARER_SCHEME, Vec::<String>::new()));
    }

    gen.describe_all_parameters_in_camel_case()
        .resolve_conflicting_actions(first_description)
        .tag_actions_by(tag_by_group_or_controller)
        .doc_inclusion_predicate(|_, _| true)
        .add_filters(&filters);

    gen.include_xml_comments_beside_exe(true);

    info!(
        documents = option.documents.len(),
        oauth = option.features.oauth_authentication,
        bearer = option.features.bearer_authentication,
        "Swagger generator configured"
    );
    Some(gen)
}

/// Configure the Swagger UI from `option`
pub fn use_swagger_ui(option: &SwaggerOption) -> SwaggerUiOptions {
    let mut ui = SwaggerUiOptions::new();
    ui.route_prefix(option.route_prefix.clone())
        .enable_filter()
        .doc_expansion(DocExpansion::None)
        .display_request_duration();

    for doc in &option.documents {
        ui.swagger_endpoint(
            document_url(option, &doc.version),
            format!("{} {}", doc.title, doc.version),
        );
    }

    if option.features.oauth_authentication {
        let auth = &option.authentication;
        if let Some(client_id) = &auth.client_id {
            ui.oauth_client_id(client_id.clone());
        }
        if let Some(client_secret) = &auth.client_secret {
            ui.oauth_client_secret(client_secret.clone());
        }
        ui.oauth_scopes(auth.scope_names()).oauth_use_pkce();
    }

    ui
}

/// URL the UI fetches a document from: `{basePath}{routePrefix}/{version}/swagger.json`
pub fn document_url(option: &SwaggerOption, version: &str) -> String {
    format!("{}{}/{}/swagger.json", option.base_path, option.route_prefix, version)
}

fn doc_info(doc: &DocOption) -> ApiInfo {
    ApiInfo::new(doc.title.clone(), doc.version.clone())
        .description(doc.description.clone())
        .contact(contact(&doc.contact))
}

fn contact(contact: &ContactOption) -> Contact {
    Contact {
        name: Some(contact.name.clone()),
        email: Some(contact.email.clone()),
        url: Some(contact.url.clone()),
    }
}

fn oauth2_scheme(auth: &AuthOption) -> SecurityScheme {
    if auth.authorization_url.is_none() {
        warn!("OAuth2 enabled without authentication.authorizationUrl");
    }
    if auth.token_url.is_none() {
        warn!("OAuth2 enabled without authentication.tokenUrl");
    }

    SecurityScheme::OAuth2 {
        description: Some(OAUTH2_DESCRIPTION.to_string()),
        flows: OAuthFlows {
            authorization_code: Some(OAuthFlow {
                authorization_url: auth.authorization_url.clone(),
                token_url: auth.token_url.clone(),
                refresh_url: None,
                scopes: auth.scopes.clone(),
            }),
            client_credentials: None,
        },
    }
}

fn first_description(candidates: &[&ApiDescription]) -> ApiDescription {
    (*candidates[0]).clone()
}

fn tag_by_group_or_controller(description: &ApiDescription) -> Result<Vec<String>, SwaggerGenError> {
    if let Some(group) = &description.group_name {
        return Ok(vec![group.clone()]);
    }
    if let Some(controller) = &description.controller_name {
        return Ok(vec![controller.clone()]);
    }
    Err(SwaggerGenError::UnableToDetermineTag {
        operation: description.display_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use swaggerkit_openapi::SwaggerGenerator;

    fn option_with_docs(versions: &[&str]) -> SwaggerOption {
        SwaggerOption {
            documents: versions
                .iter()
                .map(|v| DocOption {
                    version: v.to_string(),
                    title: "Orders".to_string(),
                    description: "Orders API".to_string(),
                    contact: ContactOption::default(),
                })
                .collect(),
            ..SwaggerOption::default()
        }
    }

    #[test]
    fn test_zero_documents_registers_nothing() {
        assert!(add_swagger(&SwaggerOption::default(), FilterRegistry::new()).is_none());
    }

    #[test]
    fn test_documents_are_registered_with_contact() {
        let gen = add_swagger(&option_with_docs(&["v1", "v2"]), FilterRegistry::new()).unwrap();
        let docs = gen.swagger_docs();
        assert_eq!(docs.keys().collect::<Vec<_>>(), vec!["v1", "v2"]);

        let info = &docs["v1"];
        assert_eq!(info.title, "Orders");
        assert_eq!(info.description.as_deref(), Some("Orders API"));
        let contact = info.contact.as_ref().unwrap();
        assert_eq!(contact.name.as_deref(), Some("Thomas ILLIET"));
        assert_eq!(contact.url.as_deref(), Some("https://www.thomas-illiet.fr/"));
        assert!(gen.camel_case_parameters());
    }

    struct Noop;

    impl swaggerkit_openapi::DocumentFilter for Noop {
        fn apply(
            &self,
            _document: &mut swaggerkit_openapi::OpenApiSpec,
            _context: &swaggerkit_openapi::DocumentFilterContext<'_>,
        ) {
        }
    }

    impl swaggerkit_openapi::OperationFilter for Noop {
        fn apply(
            &self,
            _operation: &mut swaggerkit_openapi::Operation,
            _context: &swaggerkit_openapi::OperationFilterContext<'_>,
        ) {
        }
    }

    #[test]
    fn test_explicit_filters_are_registered() {
        let filters = FilterRegistry::new()
            .document_filter(Noop)
            .operation_filter(Noop)
            .operation_filter(Noop);
        let gen = add_swagger(&option_with_docs(&["v1"]), filters).unwrap();
        assert_eq!(gen.document_filter_count(), 1);
        assert_eq!(gen.operation_filter_count(), 2);

        let gen = add_swagger(&option_with_docs(&["v1"]), FilterRegistry::new()).unwrap();
        assert_eq!(gen.document_filter_count(), 0);
        assert_eq!(gen.operation_filter_count(), 0);
    }

    #[test]
    fn test_oauth_and_bearer_are_independent_requirements() {
        let mut option = option_with_docs(&["v1"]);
        option.features.bearer_authentication = true;
        option.authentication.authorization_url = Some("https://auth/authorize".to_string());
        option.authentication.token_url = Some("https://auth/token".to_string());
        option
            .authentication
            .scopes
            .insert("orders.read".to_string(), "Read orders".to_string());

        let gen = add_swagger(&option, FilterRegistry::new()).unwrap();
        assert_eq!(gen.security_schemes().len(), 2);

        let requirements = gen.security_requirements();
        assert_eq!(requirements.len(), 2);
        assert!(requirements[0].requires(OAUTH2_SCHEME) && !requirements[0].requires(BEARER_SCHEME));
        assert!(requirements[1].requires(BEARER_SCHEME) && !requirements[1].requires(OAUTH2_SCHEME));
        assert!(requirements.iter().all(|r| r.0.values().all(Vec::is_empty)));

        let oauth = serde_json::to_value(&gen.security_schemes()[OAUTH2_SCHEME]).unwrap();
        assert_eq!(oauth["type"], "oauth2");
        assert_eq!(oauth["description"], OAUTH2_DESCRIPTION);
        let flow = &oauth["flows"]["authorizationCode"];
        assert_eq!(flow["authorizationUrl"], "https://auth/authorize");
        assert_eq!(flow["tokenUrl"], "https://auth/token");
        assert_eq!(flow["scopes"]["orders.read"], "Read orders");

        let bearer = serde_json::to_value(&gen.security_schemes()[BEARER_SCHEME]).unwrap();
        assert_eq!(bearer["type"], "apiKey");
        assert_eq!(bearer["in"], "header");
        assert_eq!(bearer["name"], "Authorization");
        assert_eq!(
            bearer["description"],
            "Standard authorisation using the Bearer scheme. Example: \"bearer {token}\""
        );
    }

    #[test]
    fn test_no_auth_features_means_no_schemes() {
        let mut option = option_with_docs(&["v1"]);
        option.features.oauth_authentication = false;

        let gen = add_swagger(&option, FilterRegistry::new()).unwrap();
        assert!(gen.security_schemes().is_empty());
        assert!(gen.security_requirements().is_empty());
    }

    #[test]
    fn test_oauth_without_urls_omits_them() {
        let gen = add_swagger(&option_with_docs(&["v1"]), FilterRegistry::new()).unwrap();
        let oauth = serde_json::to_value(&gen.security_schemes()[OAUTH2_SCHEME]).unwrap();
        let flow = &oauth["flows"]["authorizationCode"];
        assert!(flow.get("authorizationUrl").is_none());
        assert!(flow.get("tokenUrl").is_none());
    }

    #[test]
    fn test_tag_policy() {
        let gen = add_swagger(&option_with_docs(&["v1"]), FilterRegistry::new()).unwrap();

        let grouped = ApiDescription::get("/orders")
            .group_name("Orders")
            .controller("OrderController");
        assert_eq!(gen.select_tags(&grouped).unwrap(), vec!["Orders"]);

        let controller_only = ApiDescription::get("/orders").controller("OrderController");
        assert_eq!(gen.select_tags(&controller_only).unwrap(), vec!["OrderController"]);

        let err = gen.select_tags(&ApiDescription::get("/ping")).unwrap_err();
        assert_eq!(err.to_string(), "Unable to determine tag for endpoint GET /ping");
    }

    #[test]
    fn test_every_description_is_included_and_first_conflict_wins() {
        let gen = add_swagger(&option_with_docs(&["v1", "v2"]), FilterRegistry::new()).unwrap();
        let descriptions = vec![
            ApiDescription::get("/orders")
                .group_name("v2")
                .action("list_orders")
                .summary("first"),
            ApiDescription::get("/orders")
                .group_name("v2")
                .action("list_orders_again")
                .summary("second"),
        ];

        let spec = SwaggerGenerator::new(gen).get_swagger("v1", &descriptions).unwrap();
        let operation = spec.operation("/orders", &http::Method::GET).unwrap();
        assert_eq!(operation.summary.as_deref(), Some("first"));
        assert_eq!(operation.tags, Some(vec!["v2".to_string()]));
    }

    #[test]
    fn test_ui_entries_per_document() {
        let mut option = option_with_docs(&["v1", "v2"]);
        option.base_path = "/api/".to_string();
        option.route_prefix = "swagger".to_string();
        option.authentication.client_id = Some("orders-ui".to_string());
        option
            .authentication
            .scopes
            .insert("b.write".to_string(), String::new());
        option
            .authentication
            .scopes
            .insert("a.read".to_string(), String::new());

        let ui = use_swagger_ui(&option);
        assert_eq!(ui.route_prefix, "swagger");
        assert!(ui.filter);
        assert!(ui.display_request_duration);
        assert_eq!(ui.doc_expansion, DocExpansion::None);

        let urls: Vec<_> = ui.urls.iter().map(|u| (u.url.as_str(), u.name.as_str())).collect();
        assert_eq!(
            urls,
            vec![
                ("/api/swagger/v1/swagger.json", "Orders v1"),
                ("/api/swagger/v2/swagger.json", "Orders v2"),
            ]
        );

        let oauth = ui.oauth.unwrap();
        assert_eq!(oauth.client_id.as_deref(), Some("orders-ui"));
        assert_eq!(oauth.client_secret, None);
        assert_eq!(oauth.scopes, vec!["a.read", "b.write"]);
        assert!(oauth.use_pkce_with_authorization_code_grant);
    }

    proptest::proptest! {
        #[test]
        fn prop_one_ui_entry_per_document(
            versions in proptest::collection::vec("v[0-9]{1,2}", 0..6),
            prefix in "[a-z]{1,8}",
        ) {
            let mut option = option_with_docs(&versions.iter().map(String::as_str).collect::<Vec<_>>());
            option.route_prefix = prefix.clone();

            let ui = use_swagger_ui(&option);
            proptest::prop_assert_eq!(ui.urls.len(), versions.len());
            for (entry, version) in ui.urls.iter().zip(&versions) {
                proptest::prop_assert_eq!(
                    &entry.url,
                    &format!("/{}/{}/swagger.json", prefix, version)
                );
                proptest::prop_assert_eq!(&entry.name, &format!("Orders {}", version));
            }
        }
    }

    #[test]
    fn test_ui_without_oauth() {
        let mut option = option_with_docs(&["v1"]);
        option.features.oauth_authentication = false;
        assert!(use_swagger_ui(&option).oauth.is_none());
    }
}
