//! OpenAPI document generation for swaggerkit
//!
//! This crate holds the document model, the generator and its extension
//! points, and the Swagger UI page. Schema inference for request and response
//! types is delegated to `utoipa`.
//!
//! # Features
//!
//! - Multiple named documents generated from [`ApiDescription`]s
//! - Security schemes and global security requirements
//! - Pluggable tagging, inclusion and conflict policies
//! - Document and operation filters, explicit or discovered through `inventory`
//! - XML documentation comments merged into operations, tags and schemas
//! - Swagger UI page with document selector and OAuth2 PKCE support
//!
//! # Usage
//!
//! ```rust,ignore
//! use swaggerkit_openapi::{ApiDescription, ApiInfo, SwaggerGenOptions, SwaggerGenerator};
//!
//! let mut options = SwaggerGenOptions::new();
//! options.swagger_doc("v1", ApiInfo::new("Orders API", "v1"));
//!
//! let generator = SwaggerGenerator::new(options);
//! let spec = generator.get_swagger("v1", &[
//!     ApiDescription::get("/orders").controller("OrderController"),
//! ])?;
//! ```

mod description;
mod error;
mod filter;
mod generator;
mod spec;
mod swagger;
mod xml_comments;

pub use description::{ApiDescription, ApiParameter};
pub use error::{SwaggerGenError, XmlCommentsError};
pub use filter::{
    discover_document_filters, discover_operation_filters, DocumentFilter,
    DocumentFilterContext, DocumentFilterRegistration, FilterRegistry, OperationFilter,
    OperationFilterContext, OperationFilterRegistration,
};
pub use generator::{
    to_camel_case, ConflictingActionsResolver, DocInclusionPredicate, SwaggerGenOptions,
    SwaggerGenerator, TagSelector, DEFAULT_SUCCESS_DESCRIPTION,
};
pub use spec::{
    ApiInfo, Components, Contact, MediaType, OAuthFlow, OAuthFlows, OpenApiSpec, Operation,
    Parameter, ParameterLocation, PathItem, RequestBody, ResponseSpec, SchemaRef,
    SecurityRequirement, SecurityScheme, Tag, OPENAPI_VERSION,
};
pub use swagger::{
    generate_swagger_html, DocExpansion, OAuthConfig, SwaggerUiOptions, UrlDescriptor,
    SWAGGER_UI_DIST,
};
pub use xml_comments::{MemberDoc, XmlComments};

// Re-export utoipa's ToSchema derive macro as Schema
pub use utoipa::ToSchema as Schema;

// Re-export utoipa types for advanced usage
pub mod utoipa_types {
    pub use utoipa::{openapi, ToSchema};
}

#[doc(hidden)]
pub use inventory;
