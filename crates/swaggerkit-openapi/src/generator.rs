//! Swagger document generator
//!
//! [`SwaggerGenOptions`] collects everything the generator needs: the
//! documents to publish, security schemes, the tagging, inclusion and
//! conflict policies, filters and XML comments. [`SwaggerGenerator`] then
//! turns a list of [`ApiDescription`]s into one [`OpenApiSpec`] per document.

use crate::description::ApiDescription;
use crate::error::SwaggerGenError;
use crate::filter::{
    DocumentFilter, DocumentFilterContext, FilterRegistry, OperationFilter,
    OperationFilterContext,
};
use crate::spec::{
    ApiInfo, OpenApiSpec, Operation, Parameter, ParameterLocation, ResponseSpec,
    SecurityRequirement, SecurityScheme, Tag,
};
use crate::xml_comments::XmlComments;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves the tags of an operation
pub type TagSelector =
    Arc<dyn Fn(&ApiDescription) -> Result<Vec<String>, SwaggerGenError> + Send + Sync>;

/// Picks one description out of several sharing a method/path pair
pub type ConflictingActionsResolver =
    Arc<dyn Fn(&[&ApiDescription]) -> ApiDescription + Send + Sync>;

/// Decides whether an operation belongs to a document
pub type DocInclusionPredicate = Arc<dyn Fn(&str, &ApiDescription) -> bool + Send + Sync>;

/// Generator configuration
#[derive(Clone, Default)]
pub struct SwaggerGenOptions {
    swagger_docs: BTreeMap<String, ApiInfo>,
    security_schemes: BTreeMap<String, SecurityScheme>,
    security_requirements: Vec<SecurityRequirement>,
    describe_all_parameters_in_camel_case: bool,
    conflicting_actions_resolver: Option<ConflictingActionsResolver>,
    tag_selector: Option<TagSelector>,
    doc_inclusion_predicate: Option<DocInclusionPredicate>,
    document_filters: Vec<Arc<dyn DocumentFilter>>,
    operation_filters: Vec<Arc<dyn OperationFilter>>,
    xml_comments: Vec<XmlComments>,
    include_controller_xml_comments: bool,
    schemas: BTreeMap<String, serde_json::Value>,
}

impl SwaggerGenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document published under `name`
    pub fn swagger_doc(&mut self, name: impl Into<String>, info: ApiInfo) -> &mut Self {
        let name = name.into();
        if self.swagger_docs.contains_key(&name) {
            warn!(document = %name, "Swagger document registered twice; keeping the last one");
        }
        debug!(document = %name, title = %info.title, "Registered Swagger document");
        self.swagger_docs.insert(name, info);
        self
    }

    /// Advertise a security scheme under `components.securitySchemes`
    pub fn add_security_definition(
        &mut self,
        name: impl Into<String>,
        scheme: SecurityScheme,
    ) -> &mut Self {
        self.security_schemes.insert(name.into(), scheme);
        self
    }

    /// Add a global security requirement
    pub fn add_security_requirement(&mut self, requirement: SecurityRequirement) -> &mut Self {
        self.security_requirements.push(requirement);
        self
    }

    /// Publish every parameter name in camelCase
    ///
    /// Besides lowercasing the first character, `_`-separated segments are
    /// joined (`order_id` becomes `orderId`). Path templates are rewritten to
    /// match. See [`to_camel_case`].
    pub fn describe_all_parameters_in_camel_case(&mut self) -> &mut Self {
        self.describe_all_parameters_in_camel_case = true;
        self
    }

    pub fn resolve_conflicting_actions<F>(&mut self, resolver: F) -> &mut Self
    where
        F: Fn(&[&ApiDescription]) -> ApiDescription + Send + Sync + 'static,
    {
        self.conflicting_actions_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn tag_actions_by<F>(&mut self, selector: F) -> &mut Self
    where
        F: Fn(&ApiDescription) -> Result<Vec<String>, SwaggerGenError> + Send + Sync + 'static,
    {
        self.tag_selector = Some(Arc::new(selector));
        self
    }

    pub fn doc_inclusion_predicate<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&str, &ApiDescription) -> bool + Send + Sync + 'static,
    {
        self.doc_inclusion_predicate = Some(Arc::new(predicate));
        self
    }

    pub fn document_filter<F: DocumentFilter>(&mut self, filter: F) -> &mut Self {
        self.document_filters.push(Arc::new(filter));
        self
    }

    pub fn operation_filter<F: OperationFilter>(&mut self, filter: F) -> &mut Self {
        self.operation_filters.push(Arc::new(filter));
        self
    }

    /// Append every filter held by `registry`, explicit ones first
    pub fn add_filters(&mut self, registry: &FilterRegistry) -> &mut Self {
        let documents = registry.document_filters();
        let operations = registry.operation_filters();
        debug!(
            document_filters = documents.len(),
            operation_filters = operations.len(),
            "Registered Swagger filters"
        );
        self.document_filters.extend(documents);
        self.operation_filters.extend(operations);
        self
    }

    pub fn include_xml_comments(
        &mut self,
        comments: XmlComments,
        include_controller_xml_comments: bool,
    ) -> &mut Self {
        self.xml_comments.push(comments);
        self.include_controller_xml_comments |= include_controller_xml_comments;
        self
    }

    /// Load XML comments from `path` when it exists
    ///
    /// A missing file is skipped silently. A malformed one is logged and skipped.
    /// Returns whether comments were loaded.
    pub fn include_xml_comments_file(
        &mut self,
        path: impl AsRef<Path>,
        include_controller_xml_comments: bool,
    ) -> bool {
        let path = path.as_ref();
        match XmlComments::from_file(path) {
            Ok(Some(comments)) => {
                debug!(path = %path.display(), members = comments.len(), "Loaded XML comments");
                self.include_xml_comments(comments, include_controller_xml_comments);
                true
            }
            Ok(None) => false,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Ignoring unreadable XML comments");
                false
            }
        }
    }

    /// Load `<exe-stem>.xml` from the directory of the running executable
    pub fn include_xml_comments_beside_exe(&mut self, include_controller_xml_comments: bool) -> bool {
        match XmlComments::beside_current_exe() {
            Some(path) => self.include_xml_comments_file(path, include_controller_xml_comments),
            None => false,
        }
    }

    /// Register a component schema inferred by utoipa
    pub fn register_schema<T: for<'a> utoipa::ToSchema<'a>>(&mut self) -> &mut Self {
        let (name, schema) = T::schema();
        if let Ok(json_schema) = serde_json::to_value(schema) {
            self.schemas.insert(name.to_string(), json_schema);
        }
        self
    }

    pub fn swagger_docs(&self) -> &BTreeMap<String, ApiInfo> {
        &self.swagger_docs
    }

    pub fn security_schemes(&self) -> &BTreeMap<String, SecurityScheme> {
        &self.security_schemes
    }

    pub fn security_requirements(&self) -> &[SecurityRequirement] {
        &self.security_requirements
    }

    pub fn camel_case_parameters(&self) -> bool {
        self.describe_all_parameters_in_camel_case
    }

    pub fn document_filter_count(&self) -> usize {
        self.document_filters.len()
    }

    pub fn operation_filter_count(&self) -> usize {
        self.operation_filters.len()
    }

    /// Tags for `description` using the configured selector (controller name by default)
    pub fn select_tags(&self, description: &ApiDescription) -> Result<Vec<String>, SwaggerGenError> {
        match &self.tag_selector {
            Some(selector) => selector(description),
            None => description
                .controller_name
                .clone()
                .map(|c| vec![c])
                .ok_or_else(|| SwaggerGenError::UnableToDetermineTag {
                    operation: description.display_name(),
                }),
        }
    }

    /// Whether `description` belongs to `document_name`
    ///
    /// Without a predicate an operation is included when it has no group
    /// name or its group name equals the document name.
    pub fn includes(&self, document_name: &str, description: &ApiDescription) -> bool {
        match &self.doc_inclusion_predicate {
            Some(predicate) => predicate(document_name, description),
            None => description
                .group_name
                .as_deref()
                .map_or(true, |group| group == document_name),
        }
    }
}

impl fmt::Debug for SwaggerGenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwaggerGenOptions")
            .field("swagger_docs", &self.swagger_docs)
            .field("security_schemes", &self.security_schemes)
            .field("security_requirements", &self.security_requirements)
            .field(
                "describe_all_parameters_in_camel_case",
                &self.describe_all_parameters_in_camel_case,
            )
            .field(
                "conflicting_actions_resolver",
                &self.conflicting_actions_resolver.is_some(),
            )
            .field("tag_selector", &self.tag_selector.is_some())
            .field("doc_inclusion_predicate", &self.doc_inclusion_predicate.is_some())
            .field("document_filters", &self.document_filters.len())
            .field("operation_filters", &self.operation_filters.len())
            .field("xml_comments", &self.xml_comments.len())
            .finish()
    }
}

/// Generates documents from [`ApiDescription`]s
#[derive(Debug, Clone)]
pub struct SwaggerGenerator {
    options: SwaggerGenOptions,
}

impl SwaggerGenerator {
    pub fn new(options: SwaggerGenOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SwaggerGenOptions {
        &self.options
    }

    /// Names of every registered document
    pub fn document_names(&self) -> impl Iterator<Item = &str> {
        self.options.swagger_docs.keys().map(String::as_str)
    }

    /// Generate the document registered under `document_name`
    pub fn get_swagger(
        &self,
        document_name: &str,
        descriptions: &[ApiDescription],
    ) -> Result<OpenApiSpec, SwaggerGenError> {
        let info = self
            .options
            .swagger_docs
            .get(document_name)
            .ok_or_else(|| SwaggerGenError::UnknownDocument(document_name.to_string()))?;

        let applicable: Vec<&ApiDescription> = descriptions
            .iter()
            .filter(|d| self.options.includes(document_name, d))
            .collect();

        let mut spec = OpenApiSpec::with_info(info.clone());
        spec.components.schemas = self.options.schemas.clone();

        for description in self.resolve_conflicts(&applicable)? {
            let operation = self.build_operation(document_name, &description, &mut spec)?;
            let path = self.document_path(&description);
            if !spec
                .paths
                .entry(path)
                .or_default()
                .set(&description.method, operation)
            {
                warn!(
                    operation = %description.display_name(),
                    "Skipping operation with a method OpenAPI cannot describe"
                );
            }
        }

        spec.components.security_schemes = self.options.security_schemes.clone();
        spec.security = self.options.security_requirements.clone();
        self.apply_schema_comments(&mut spec);

        let context = DocumentFilterContext {
            document_name,
            api_descriptions: &applicable,
        };
        for filter in &self.options.document_filters {
            filter.apply(&mut spec, &context);
        }

        Ok(spec)
    }

    /// Group by method and published path, preserving first appearance, and
    /// apply the conflict policy
    ///
    /// The published path is the one written to the document, so templates
    /// that only differ before camelCasing share a slot.
    fn resolve_conflicts(
        &self,
        applicable: &[&ApiDescription],
    ) -> Result<Vec<ApiDescription>, SwaggerGenError> {
        let mut groups: Vec<(String, Vec<&ApiDescription>)> = Vec::new();
        for description in applicable.iter().copied() {
            let path = self.document_path(description);
            let existing = groups
                .iter_mut()
                .find(|(key, group)| group[0].method == description.method && *key == path);
            match existing {
                Some((_, group)) => group.push(description),
                None => groups.push((path, vec![description])),
            }
        }

        groups
            .into_iter()
            .map(|(_, group)| {
                if group.len() == 1 {
                    return Ok(group[0].clone());
                }
                match &self.options.conflicting_actions_resolver {
                    Some(resolver) => Ok(resolver(&group)),
                    None => Err(SwaggerGenError::ConflictingActions {
                        method: group[0].method.to_string(),
                        path: group[0].relative_path.clone(),
                        actions: group
                            .iter()
                            .map(|d| d.action_name.as_deref().unwrap_or("<unnamed>"))
                            .collect::<Vec<_>>()
                            .join(", "),
                    }),
                }
            })
            .collect()
    }

    fn document_path(&self, description: &ApiDescription) -> String {
        let mut path = description.relative_path.clone();
        if self.options.describe_all_parameters_in_camel_case {
            for parameter in &description.parameters {
                if parameter.location == ParameterLocation::Path {
                    let camel = to_camel_case(&parameter.name);
                    if camel != parameter.name {
                        path = path.replace(
                            &format!("{{{}}}", parameter.name),
                            &format!("{{{}}}", camel),
                        );
                    }
                }
            }
        }
        path
    }

    fn build_operation(
        &self,
        document_name: &str,
        description: &ApiDescription,
        spec: &mut OpenApiSpec,
    ) -> Result<Operation, SwaggerGenError> {
        let tags = self.options.select_tags(description)?;
        let xml = description.action_name.as_deref().and_then(|action| {
            self.options
                .xml_comments
                .iter()
                .find_map(|c| c.operation(description.controller_name.as_deref(), action))
        });

        let parameters: Vec<Parameter> = description
            .parameters
            .iter()
            .map(|p| Parameter {
                name: if self.options.describe_all_parameters_in_camel_case {
                    to_camel_case(&p.name)
                } else {
                    p.name.clone()
                },
                location: p.location,
                required: p.required,
                description: p
                    .description
                    .clone()
                    .or_else(|| xml.and_then(|doc| doc.params.get(&p.name).cloned())),
                schema: p.schema.clone(),
            })
            .collect();

        let mut responses = description.responses.clone();
        let generated_success = responses.is_empty();
        if generated_success {
            responses.insert(
                "200".to_string(),
                ResponseSpec {
                    description: DEFAULT_SUCCESS_DESCRIPTION.to_string(),
                    content: None,
                },
            );
        }

        let mut operation = Operation {
            tags: Some(tags.clone()),
            summary: description.summary.clone(),
            description: description.description.clone(),
            operation_id: description.action_name.clone(),
            parameters: (!parameters.is_empty()).then_some(parameters),
            request_body: description.request_body.clone(),
            responses,
            deprecated: description.deprecated,
        };

        if let Some(doc) = xml {
            if operation.summary.is_none() {
                operation.summary = doc.summary.clone();
            }
            if operation.description.is_none() {
                operation.description = doc.remarks.clone();
            }
            for (code, text) in &doc.responses {
                merge_response_doc(&mut operation.responses, code, text, generated_success);
            }
            if let Some(returns) = &doc.returns {
                let code = success_code(&operation.responses);
                merge_response_doc(&mut operation.responses, &code, returns, generated_success);
            }
        }

        for (name, schema) in &description.schemas {
            spec.components
                .schemas
                .entry(name.clone())
                .or_insert_with(|| schema.clone());
        }

        for tag in tags {
            if spec.tag(&tag).is_none() {
                let tag_description = self.tag_description(&tag);
                spec.tags.push(Tag {
                    name: tag,
                    description: tag_description,
                });
            }
        }

        let context = OperationFilterContext {
            document_name,
            api_description: description,
        };
        for filter in &self.options.operation_filters {
            filter.apply(&mut operation, &context);
        }

        Ok(operation)
    }

    fn tag_description(&self, tag: &str) -> Option<String> {
        if !self.options.include_controller_xml_comments {
            return None;
        }
        self.options
            .xml_comments
            .iter()
            .find_map(|c| c.type_doc(tag).and_then(|doc| doc.summary.clone()))
    }

    fn apply_schema_comments(&self, spec: &mut OpenApiSpec) {
        if self.options.xml_comments.is_empty() {
            return;
        }
        for (name, schema) in spec.components.schemas.iter_mut() {
            let Some(object) = schema.as_object_mut() else {
                continue;
            };
            if object.contains_key("description") {
                continue;
            }
            let summary = self
                .options
                .xml_comments
                .iter()
                .find_map(|c| c.type_doc(name).and_then(|doc| doc.summary.clone()));
            if let Some(summary) = summary {
                object.insert("description".to_string(), serde_json::Value::String(summary));
            }
        }
    }
}

/// Description of the `200` response generated for operations that declare none
pub const DEFAULT_SUCCESS_DESCRIPTION: &str = "Success";

/// Lowest declared 2xx status, `200` when there is none
fn success_code(responses: &BTreeMap<String, ResponseSpec>) -> String {
    responses
        .keys()
        .find(|code| code.starts_with('2'))
        .cloned()
        .unwrap_or_else(|| "200".to_string())
}

/// Merge an XML response description
///
/// Empty descriptions and the generated success text are replaced. Text
/// supplied by the host is kept.
fn merge_response_doc(
    responses: &mut BTreeMap<String, ResponseSpec>,
    code: &str,
    text: &str,
    generated_success: bool,
) {
    match responses.get_mut(code) {
        Some(response) => {
            let generated = generated_success
                && code == "200"
                && response.description == DEFAULT_SUCCESS_DESCRIPTION;
            if response.description.is_empty() || generated {
                response.description = text.to_string();
            }
        }
        None => {
            responses.insert(
                code.to_string(),
                ResponseSpec {
                    description: text.to_string(),
                    content: None,
                },
            );
        }
    }
}

/// camelCase a parameter name
///
/// The first character is lowercased and `_`-separated segments are joined
/// with an uppercased initial: `OrderId` and `order_id` both become `orderId`.
/// A name made only of underscores is returned unchanged.
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (index, segment) in name.split('_').filter(|s| !s.is_empty()).enumerate() {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            if index == 0 {
                out.extend(first.to_lowercase());
            } else {
                out.extend(first.to_uppercase());
            }
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        return name.to_string();
    }
    out
}
