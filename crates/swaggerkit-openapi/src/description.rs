//! Descriptions of the operations a host application exposes
//!
//! An [`ApiDescription`] is the generator's input: one route/method pair with
//! the metadata needed to document it. Hosts build them next to their routes
//! and hand the full list to the generator at startup.
//!
//! ```rust,ignore
//! use swaggerkit_openapi::{ApiDescription, ApiParameter};
//!
//! let description = ApiDescription::get("/orders/{order_id}")
//!     .controller("OrderController")
//!     .action("get_order")
//!     .parameter(ApiParameter::path("order_id"))
//!     .returns::<Order>(200, "The order");
//! ```

use crate::spec::{MediaType, ParameterLocation, RequestBody, ResponseSpec, SchemaRef};
use http::Method;
use std::collections::BTreeMap;

/// One operation discovered in the host application
#[derive(Debug, Clone)]
pub struct ApiDescription {
    pub method: Method,
    /// Path template using `{param}` placeholders
    pub relative_path: String,
    /// Explicit group; wins over the controller name when tagging
    pub group_name: Option<String>,
    /// Owning controller (the logical handler group)
    pub controller_name: Option<String>,
    /// Handler name, published as `operationId`
    pub action_name: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<ApiParameter>,
    pub request_body: Option<RequestBody>,
    pub responses: BTreeMap<String, ResponseSpec>,
    /// Component schemas referenced by the bodies above
    pub schemas: BTreeMap<String, serde_json::Value>,
    pub deprecated: bool,
}

/// A parameter of an [`ApiDescription`]
#[derive(Debug, Clone)]
pub struct ApiParameter {
    pub name: String,
    pub location: ParameterLocation,
    pub required: bool,
    pub description: Option<String>,
    pub schema: SchemaRef,
}

impl ApiParameter {
    fn new(name: impl Into<String>, location: ParameterLocation, required: bool) -> Self {
        Self {
            name: name.into(),
            location,
            required,
            description: None,
            schema: SchemaRef::string(),
        }
    }

    /// A path segment parameter (always required)
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Path, true)
    }

    /// An optional query string parameter
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Query, false)
    }

    /// An optional request header
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Header, false)
    }

    /// An optional cookie
    pub fn cookie(name: impl Into<String>) -> Self {
        Self::new(name, ParameterLocation::Cookie, false)
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Replace the default `{"type": "string"}` schema
    pub fn schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = SchemaRef::Inline(schema);
        self
    }
}

impl ApiDescription {
    /// Describe `method` on `path`
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            relative_path: path.into(),
            group_name: None,
            controller_name: None,
            action_name: None,
            summary: None,
            description: None,
            parameters: Vec::new(),
            request_body: None,
            responses: BTreeMap::new(),
            schemas: BTreeMap::new(),
            deprecated: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Set the explicit group name
    pub fn group_name(mut self, group: impl Into<String>) -> Self {
        self.group_name = Some(group.into());
        self
    }

    /// Set the owning controller name
    pub fn controller(mut self, controller: impl Into<String>) -> Self {
        self.controller_name = Some(controller.into());
        self
    }

    /// Set the handler name
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action_name = Some(action.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parameter(mut self, parameter: ApiParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Document a response without a body
    pub fn response(mut self, status: u16, description: impl Into<String>) -> Self {
        self.responses.insert(
            status.to_string(),
            ResponseSpec {
                description: description.into(),
                content: None,
            },
        );
        self
    }

    /// Document a JSON response whose schema is inferred by utoipa
    pub fn returns<T: for<'a> utoipa::ToSchema<'a>>(
        mut self,
        status: u16,
        description: impl Into<String>,
    ) -> Self {
        let schema = self.reference_schema::<T>();
        self.responses.insert(
            status.to_string(),
            ResponseSpec {
                description: description.into(),
                content: Some(json_content(schema)),
            },
        );
        self
    }

    /// Document a required JSON request body whose schema is inferred by utoipa
    pub fn accepts<T: for<'a> utoipa::ToSchema<'a>>(mut self) -> Self {
        let schema = self.reference_schema::<T>();
        self.request_body = Some(RequestBody {
            description: None,
            required: true,
            content: json_content(schema),
        });
        self
    }

    /// `METHOD path`, used to identify the operation in logs and errors
    pub fn display_name(&self) -> String {
        format!("{} {}", self.method, self.relative_path)
    }

    fn reference_schema<T: for<'a> utoipa::ToSchema<'a>>(&mut self) -> SchemaRef {
        let (name, schema) = T::schema();
        if let Ok(json_schema) = serde_json::to_value(schema) {
            self.schemas.insert(name.to_string(), json_schema);
        }
        SchemaRef::component(name)
    }
}

fn json_content(schema: SchemaRef) -> BTreeMap<String, MediaType> {
    BTreeMap::from([("application/json".to_string(), MediaType { schema })])
}

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::ToSchema;

    #[derive(ToSchema)]
    #[allow(dead_code)]
    struct Order {
        id: i64,
        reference: String,
    }

    #[test]
    fn test_returns_registers_component_schema() {
        let description = ApiDescription::get("/orders/{id}").returns::<Order>(200, "The order");

        assert!(description.schemas.contains_key("Order"));
        let response = &description.responses["200"];
        let media = &response.content.as_ref().unwrap()["application/json"];
        match &media.schema {
            SchemaRef::Ref { reference } => assert_eq!(reference, "#/components/schemas/Order"),
            other => panic!("expected a reference, got {:?}", other),
        }
    }

    #[test]
    fn test_accepts_sets_required_body() {
        let description = ApiDescription::post("/orders").accepts::<Order>();
        let body = description.request_body.unwrap();
        assert!(body.required);
        assert!(body.content.contains_key("application/json"));
    }

    #[test]
    fn test_parameter_defaults() {
        assert!(ApiParameter::path("id").required);
        assert!(!ApiParameter::query("page").required);
        assert_eq!(ApiParameter::header("X-Trace").location, ParameterLocation::Header);
    }

    #[test]
    fn test_display_name() {
        let description = ApiDescription::delete("/orders/{id}");
        assert_eq!(description.display_name(), "DELETE /orders/{id}");
    }
}
