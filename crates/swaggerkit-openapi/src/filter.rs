//! Document and operation filters
//!
//! Filters mutate a generated document (or a single operation) after the
//! generator has built it. They reach the generator in two ways:
//!
//! - explicitly, by adding instances to a [`FilterRegistry`];
//! - by convention, by submitting a [`DocumentFilterRegistration`] or
//!   [`OperationFilterRegistration`] through `inventory` anywhere in the
//!   linked program (the `#[document_filter]` / `#[operation_filter]`
//!   attributes do this for you).
//!
//! Discovered filters are constructed with no arguments. Their order follows
//! link order and is **unspecified**; do not rely on one discovered filter
//! running before another.

use crate::description::ApiDescription;
use crate::spec::{OpenApiSpec, Operation};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Mutates a whole document after generation
pub trait DocumentFilter: Send + Sync + 'static {
    fn apply(&self, document: &mut OpenApiSpec, context: &DocumentFilterContext<'_>);
}

/// Mutates one operation after generation
pub trait OperationFilter: Send + Sync + 'static {
    fn apply(&self, operation: &mut Operation, context: &OperationFilterContext<'_>);
}

/// What a [`DocumentFilter`] knows about the document being generated
pub struct DocumentFilterContext<'a> {
    pub document_name: &'a str,
    /// Descriptions that made it into this document
    pub api_descriptions: &'a [&'a ApiDescription],
}

/// What an [`OperationFilter`] knows about the operation being generated
pub struct OperationFilterContext<'a> {
    pub document_name: &'a str,
    pub api_description: &'a ApiDescription,
}

/// Process-wide registration of a [`DocumentFilter`] implementor
pub struct DocumentFilterRegistration {
    name: &'static str,
    constructor: fn() -> Box<dyn DocumentFilter>,
}

impl DocumentFilterRegistration {
    pub const fn new(name: &'static str, constructor: fn() -> Box<dyn DocumentFilter>) -> Self {
        Self { name, constructor }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instantiate(&self) -> Box<dyn DocumentFilter> {
        (self.constructor)()
    }
}

/// Process-wide registration of an [`OperationFilter`] implementor
pub struct OperationFilterRegistration {
    name: &'static str,
    constructor: fn() -> Box<dyn OperationFilter>,
}

impl OperationFilterRegistration {
    pub const fn new(name: &'static str, constructor: fn() -> Box<dyn OperationFilter>) -> Self {
        Self { name, constructor }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn instantiate(&self) -> Box<dyn OperationFilter> {
        (self.constructor)()
    }
}

inventory::collect!(DocumentFilterRegistration);
inventory::collect!(OperationFilterRegistration);

/// Instantiate every registered document filter, in unspecified order
pub fn discover_document_filters() -> Vec<(&'static str, Arc<dyn DocumentFilter>)> {
    inventory::iter::<DocumentFilterRegistration>
        .into_iter()
        .map(|registration| {
            debug!(filter = registration.name(), "Discovered document filter");
            let filter: Arc<dyn DocumentFilter> = Arc::from(registration.instantiate());
            (registration.name(), filter)
        })
        .collect()
}

/// Instantiate every registered operation filter, in unspecified order
pub fn discover_operation_filters() -> Vec<(&'static str, Arc<dyn OperationFilter>)> {
    inventory::iter::<OperationFilterRegistration>
        .into_iter()
        .map(|registration| {
            debug!(filter = registration.name(), "Discovered operation filter");
            let filter: Arc<dyn OperationFilter> = Arc::from(registration.instantiate());
            (registration.name(), filter)
        })
        .collect()
}

/// The filters handed to the generator
///
/// Explicit filters run first, in insertion order. When discovery is enabled
/// the `inventory` registrations follow, in unspecified order.
#[derive(Clone, Default)]
pub struct FilterRegistry {
    document_filters: Vec<Arc<dyn DocumentFilter>>,
    operation_filters: Vec<Arc<dyn OperationFilter>>,
    discover: bool,
}

impl FilterRegistry {
    /// An empty registry with discovery disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty registry that also picks up `inventory` registrations
    pub fn discovered() -> Self {
        Self::new().with_discovery(true)
    }

    pub fn with_discovery(mut self, enabled: bool) -> Self {
        self.discover = enabled;
        self
    }

    pub fn document_filter<F: DocumentFilter>(mut self, filter: F) -> Self {
        self.document_filters.push(Arc::new(filter));
        self
    }

    pub fn operation_filter<F: OperationFilter>(mut self, filter: F) -> Self {
        self.operation_filters.push(Arc::new(filter));
        self
    }

    pub fn discovery_enabled(&self) -> bool {
        self.discover
    }

    /// Explicit document filters followed by discovered ones
    pub fn document_filters(&self) -> Vec<Arc<dyn DocumentFilter>> {
        let mut filters = self.document_filters.clone();
        if self.discover {
            filters.extend(discover_document_filters().into_iter().map(|(_, f)| f));
        }
        filters
    }

    /// Explicit operation filters followed by discovered ones
    pub fn operation_filters(&self) -> Vec<Arc<dyn OperationFilter>> {
        let mut filters = self.operation_filters.clone();
        if self.discover {
            filters.extend(discover_operation_filters().into_iter().map(|(_, f)| f));
        }
        filters
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("document_filters", &self.document_filters.len())
            .field("operation_filters", &self.operation_filters.len())
            .field("discover", &self.discover)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct StampVersion;

    impl DocumentFilter for StampVersion {
        fn apply(&self, document: &mut OpenApiSpec, context: &DocumentFilterContext<'_>) {
            document.info.description = Some(format!("stamped {}", context.document_name));
        }
    }

    #[derive(Default)]
    struct MarkDeprecated;

    impl OperationFilter for MarkDeprecated {
        fn apply(&self, operation: &mut Operation, _context: &OperationFilterContext<'_>) {
            operation.deprecated = true;
        }
    }

    fn new_stamp_version() -> Box<dyn DocumentFilter> {
        Box::new(StampVersion)
    }

    fn new_mark_deprecated() -> Box<dyn OperationFilter> {
        Box::new(MarkDeprecated)
    }

    inventory::submit! {
        DocumentFilterRegistration::new("filter::tests::StampVersion", new_stamp_version)
    }

    inventory::submit! {
        OperationFilterRegistration::new("filter::tests::MarkDeprecated", new_mark_deprecated)
    }

    #[test]
    fn test_discovery_finds_submitted_filters() {
        let documents = discover_document_filters();
        assert!(documents
            .iter()
            .any(|(name, _)| *name == "filter::tests::StampVersion"));

        let operations = discover_operation_filters();
        assert!(operations
            .iter()
            .any(|(name, _)| *name == "filter::tests::MarkDeprecated"));
    }

    #[test]
    fn test_registry_without_discovery_only_has_explicit_filters() {
        let registry = FilterRegistry::new().document_filter(StampVersion);
        assert!(!registry.discovery_enabled());
        assert_eq!(registry.document_filters().len(), 1);
        assert!(registry.operation_filters().is_empty());
    }

    #[test]
    fn test_registry_explicit_filters_come_first() {
        let registry = FilterRegistry::discovered().operation_filter(MarkDeprecated);
        assert!(registry.discovery_enabled());
        let filters = registry.operation_filters();
        assert!(filters.len() >= 2);

        let mut op = Operation::new();
        let description = ApiDescription::get("/orders");
        filters[0].apply(
            &mut op,
            &OperationFilterContext {
                document_name: "v1",
                api_description: &description,
            },
        );
        assert!(op.deprecated);
    }

    #[test]
    fn test_discovered_filter_is_invocable() {
        let (_, filter) = discover_document_filters()
            .into_iter()
            .find(|(name, _)| *name == "filter::tests::StampVersion")
            .expect("registered in this module");

        let mut doc = OpenApiSpec::new("Orders", "v1");
        filter.apply(
            &mut doc,
            &DocumentFilterContext {
                document_name: "v1",
                api_descriptions: &[],
            },
        );
        assert_eq!(doc.info.description.as_deref(), Some("stamped v1"));
    }
}
