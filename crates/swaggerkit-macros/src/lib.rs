//! Procedural macros for swaggerkit
//!
//! - `#[swaggerkit::document_filter]` registers a `DocumentFilter` implementor
//! - `#[swaggerkit::operation_filter]` registers an `OperationFilter` implementor
//!
//! Registered filters are discovered at startup through `inventory` and
//! constructed with `Default::default()`.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{parse_macro_input, Generics, Ident, Item};

#[derive(Clone, Copy)]
enum FilterKind {
    Document,
    Operation,
}

impl FilterKind {
    fn attribute(self) -> &'static str {
        match self {
            Self::Document => "document_filter",
            Self::Operation => "operation_filter",
        }
    }
}

/// Internal helper generating the registration for a filter type
fn generate_filter_registration(kind: FilterKind, attr: TokenStream, item: TokenStream) -> TokenStream {
    if !attr.is_empty() {
        let message = format!("#[{}] takes no arguments", kind.attribute());
        return syn::Error::new(Span::call_site(), message)
            .to_compile_error()
            .into();
    }

    let input = parse_macro_input!(item as Item);
    let (ident, generics): (&Ident, &Generics) = match &input {
        Item::Struct(item) => (&item.ident, &item.generics),
        Item::Enum(item) => (&item.ident, &item.generics),
        other => {
            let message = format!("#[{}] can only be applied to a struct or an enum", kind.attribute());
            return syn::Error::new_spanned(other, message).to_compile_error().into();
        }
    };

    if !generics.params.is_empty() {
        let message = format!("#[{}] does not support generic filter types", kind.attribute());
        return syn::Error::new_spanned(generics, message).to_compile_error().into();
    }

    let constructor = Ident::new(
        &format!("__swaggerkit_{}_{}", kind.attribute(), ident),
        ident.span(),
    );
    let (filter_trait, registration) = match kind {
        FilterKind::Document => (
            quote!(::swaggerkit::DocumentFilter),
            quote!(::swaggerkit::DocumentFilterRegistration),
        ),
        FilterKind::Operation => (
            quote!(::swaggerkit::OperationFilter),
            quote!(::swaggerkit::OperationFilterRegistration),
        ),
    };

    let expanded = quote! {
        #input

        #[doc(hidden)]
        #[allow(non_snake_case)]
        fn #constructor() -> ::std::boxed::Box<dyn #filter_trait> {
            ::std::boxed::Box::new(<#ident as ::core::default::Default>::default())
        }

        ::swaggerkit::__private::inventory::submit! {
            #registration::new(
                ::core::concat!(::core::module_path!(), "::", ::core::stringify!(#ident)),
                #constructor,
            )
        }
    };

    TokenStream::from(expanded)
}

/// Register a document filter for discovery
///
/// The type must implement `DocumentFilter` and `Default`.
///
/// # Example
///
/// ```rust,ignore
/// use swaggerkit::prelude::*;
///
/// #[derive(Default)]
/// #[swaggerkit::document_filter]
/// struct LowercasePaths;
///
/// impl DocumentFilter for LowercasePaths {
///     fn apply(&self, document: &mut OpenApiSpec, _context: &DocumentFilterContext<'_>) {
///         document.paths = std::mem::take(&mut document.paths)
///             .into_iter()
///             .map(|(path, item)| (path.to_lowercase(), item))
///             .collect();
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn document_filter(attr: TokenStream, item: TokenStream) -> TokenStream {
    generate_filter_registration(FilterKind::Document, attr, item)
}

/// Register an operation filter for discovery
///
/// The type must implement `OperationFilter` and `Default`.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Default)]
/// #[swaggerkit::operation_filter]
/// struct MarkInternal;
///
/// impl OperationFilter for MarkInternal {
///     fn apply(&self, operation: &mut Operation, context: &OperationFilterContext<'_>) {
///         if context.api_description.relative_path.starts_with("/internal") {
///             operation.deprecated = true;
///         }
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn operation_filter(attr: TokenStream, item: TokenStream) -> TokenStream {
    generate_filter_registration(FilterKind::Operation, attr, item)
}
