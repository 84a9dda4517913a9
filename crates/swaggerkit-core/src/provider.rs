//! Generated documents, rendered once at startup

use bytes::Bytes;
use std::collections::BTreeMap;
use swaggerkit_openapi::{ApiDescription, SwaggerGenError, SwaggerGenOptions, SwaggerGenerator};
use tracing::debug;

/// Serves the pretty-printed JSON of every registered document
#[derive(Debug, Clone, Default)]
pub struct SwaggerProvider {
    documents: BTreeMap<String, Bytes>,
}

impl SwaggerProvider {
    /// Generate every document registered in `options`
    ///
    /// Without options the provider is empty and every lookup fails with
    /// [`SwaggerGenError::UnknownDocument`].
    pub fn build(
        options: Option<SwaggerGenOptions>,
        descriptions: &[ApiDescription],
    ) -> Result<Self, SwaggerGenError> {
        let Some(options) = options else {
            return Ok(Self::default());
        };

        let generator = SwaggerGenerator::new(options);
        let mut documents = BTreeMap::new();
        for name in generator.document_names() {
            let spec = generator.get_swagger(name, descriptions)?;
            let json = serde_json::to_vec_pretty(&spec.to_json())?;
            debug!(
                document = name,
                paths = spec.paths.len(),
                bytes = json.len(),
                "Generated Swagger document"
            );
            documents.insert(name.to_string(), Bytes::from(json));
        }
        Ok(Self { documents })
    }

    /// JSON body of `document_name`
    pub fn get_swagger(&self, document_name: &str) -> Result<Bytes, SwaggerGenError> {
        self.documents
            .get(document_name)
            .cloned()
            .ok_or_else(|| SwaggerGenError::UnknownDocument(document_name.to_string()))
    }

    pub fn document_names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swaggerkit_openapi::ApiInfo;

    fn options() -> SwaggerGenOptions {
        let mut options = SwaggerGenOptions::new();
        options
            .swagger_doc("v1", ApiInfo::new("Orders", "v1"))
            .swagger_doc("v2", ApiInfo::new("Orders", "v2"));
        options
    }

    #[test]
    fn test_documents_are_generated_eagerly() {
        let descriptions = vec![
            ApiDescription::get("/orders").controller("OrderController"),
            ApiDescription::get("/v2/orders")
                .controller("OrderController")
                .group_name("v2"),
        ];
        let provider = SwaggerProvider::build(Some(options()), &descriptions).unwrap();
        assert_eq!(provider.document_names().collect::<Vec<_>>(), vec!["v1", "v2"]);

        let v1: serde_json::Value =
            serde_json::from_slice(&provider.get_swagger("v1").unwrap()).unwrap();
        assert_eq!(v1["openapi"], "3.0.3");
        assert_eq!(v1["info"]["version"], "v1");
        assert!(v1["paths"].get("/orders").is_some());
        assert!(v1["paths"].get("/v2/orders").is_none());

        let v2: serde_json::Value =
            serde_json::from_slice(&provider.get_swagger("v2").unwrap()).unwrap();
        assert!(v2["paths"].get("/v2/orders").is_some());
    }

    #[test]
    fn test_unknown_document() {
        let provider = SwaggerProvider::build(Some(options()), &[]).unwrap();
        assert!(matches!(
            provider.get_swagger("v3"),
            Err(SwaggerGenError::UnknownDocument(name)) if name == "v3"
        ));
    }

    #[test]
    fn test_no_options_is_empty() {
        let provider = SwaggerProvider::build(None, &[]).unwrap();
        assert!(provider.is_empty());
    }

    #[test]
    fn test_tag_failure_aborts_build() {
        let result = SwaggerProvider::build(Some(options()), &[ApiDescription::get("/ping")]);
        assert!(matches!(result, Err(SwaggerGenError::UnableToDetermineTag { .. })));
    }
}
