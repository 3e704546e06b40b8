//! The schema registry.
//!
//! [`SchemaRegistry`] holds the route table (route name → HTTP method →
//! [`Resource`]) and the code table ([`ResultCode`] → [`CodeDefinition`]).
//! It is validated once when built and never mutated afterwards, so it can be
//! shared across any number of concurrent requests behind an `Arc` without
//! locking.
//!
//! # Example
//!
//! ```
//! use hermes_core::{CodeDefinition, Lookup, Resource, ResultCode, SchemaRegistry};
//! use http::Method;
//!
//! let registry = SchemaRegistry::builder()
//!     .route("index", Method::GET, Resource::new("index"))
//!     .code(ResultCode::OK, CodeDefinition::new(200))
//!     .code(ResultCode::INTERNAL_PANIC, CodeDefinition::new(500))
//!     .code(ResultCode::INTERNAL_UNEXPECTED, CodeDefinition::new(500))
//!     .code(ResultCode::UNKNOWN_HANDLER, CodeDefinition::new(500))
//!     .build()
//!     .unwrap();
//!
//! assert!(matches!(registry.lookup("index", &Method::GET), Lookup::Found(_)));
//! assert!(matches!(registry.lookup("nope", &Method::GET), Lookup::UnknownRoute));
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use http::Method;

use crate::code::{CodeDefinition, ResultCode};
use crate::context::INDEX_ROUTE;
use crate::error::{SchemaError, SchemaResult};
use crate::resource::{ParameterKind, Resource};

/// Raw routes table as it appears in a routes file:
/// `{ routeName: { HTTPVerb: Resource } }`.
pub type RoutesTable = BTreeMap<String, BTreeMap<String, Resource>>;

/// Raw codes table as it appears in a codes file:
/// `{ resultCode: CodeDefinition }`.
pub type CodesTable = BTreeMap<String, CodeDefinition>;

/// Outcome of looking up a (route, method) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The pair resolves to a resource.
    Found(Arc<Resource>),
    /// No route with that name.
    UnknownRoute,
    /// The route exists but declares no resource for the method.
    UnknownMethod,
}

/// Immutable route and code tables.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    routes: HashMap<String, HashMap<Method, Arc<Resource>>>,
    codes: HashMap<ResultCode, CodeDefinition>,
    fallback: CodeDefinition,
}

impl SchemaRegistry {
    /// Creates a new registry builder.
    #[must_use]
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new()
    }

    /// Builds a registry from the raw routes and codes tables.
    ///
    /// Method keys are matched case-insensitively (`"get"` and `"GET"` are the
    /// same method).
    pub fn from_tables(routes: RoutesTable, codes: CodesTable) -> SchemaResult<Self> {
        let mut builder = Self::builder();

        for (route, methods) in routes {
            for (verb, resource) in methods {
                let method = Method::from_bytes(verb.to_ascii_uppercase().as_bytes())
                    .map_err(|_| SchemaError::invalid_method(&route, &verb))?;
                builder = builder.route(route.clone(), method, resource);
            }
        }

        for (code, definition) in codes {
            builder = builder.code(ResultCode::from(code), definition);
        }

        builder.build()
    }

    /// Looks up the resource for a route name and method.
    #[must_use]
    pub fn lookup(&self, route: &str, method: &Method) -> Lookup {
        match self.routes.get(route) {
            None => Lookup::UnknownRoute,
            Some(methods) => match methods.get(method) {
                Some(resource) => Lookup::Found(Arc::clone(resource)),
                None => Lookup::UnknownMethod,
            },
        }
    }

    /// Returns the definition of a code, if present.
    #[must_use]
    pub fn code(&self, code: &str) -> Option<&CodeDefinition> {
        self.codes.get(code)
    }

    /// Returns the definition of a code, falling back to the `I002`
    /// definition for codes the table does not know.
    #[must_use]
    pub fn code_or_fallback(&self, code: &str) -> &CodeDefinition {
        self.codes.get(code).unwrap_or(&self.fallback)
    }

    /// Returns the number of routes.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// Returns the number of defined codes.
    #[must_use]
    pub fn code_count(&self) -> usize {
        self.codes.len()
    }

    /// Returns every function key declared by a resource, sorted and
    /// deduplicated.
    #[must_use]
    pub fn functions(&self) -> Vec<&str> {
        let mut functions: Vec<&str> = self
            .routes
            .values()
            .flat_map(HashMap::values)
            .map(|resource| resource.function.as_str())
            .collect();
        functions.sort_unstable();
        functions.dedup();
        functions
    }
}

/// Builder for [`SchemaRegistry`].
///
/// Entries are collected as given and validated together in
/// [`build`](SchemaRegistryBuilder::build).
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    routes: Vec<(String, Method, Resource)>,
    codes: Vec<(ResultCode, CodeDefinition)>,
}

impl SchemaRegistryBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource. A later entry for the same pair replaces an earlier one.
    #[must_use]
    pub fn route(mut self, route: impl Into<String>, method: Method, resource: Resource) -> Self {
        self.routes.push((route.into(), method, resource));
        self
    }

    /// Adds a code definition. A later entry for the same code replaces an
    /// earlier one.
    #[must_use]
    pub fn code(mut self, code: ResultCode, definition: CodeDefinition) -> Self {
        self.codes.push((code, definition));
        self
    }

    /// Validates the collected entries and builds the registry.
    ///
    /// # Errors
    ///
    /// Fails if:
    /// - an enum parameter has no options, or parameter names repeat
    /// - a code maps to an invalid HTTP status
    /// - there is no `index` route with a `GET` resource
    /// - one of [`ResultCode::REQUIRED`] is missing
    pub fn build(self) -> SchemaResult<SchemaRegistry> {
        let mut routes: HashMap<String, HashMap<Method, Arc<Resource>>> = HashMap::new();

        for (route, method, resource) in self.routes {
            validate_parameters(&route, &method, &resource)?;
            routes
                .entry(route)
                .or_default()
                .insert(method, Arc::new(resource));
        }

        let mut codes = HashMap::with_capacity(self.codes.len());
        for (code, definition) in self.codes {
            if http::StatusCode::from_u16(definition.status).is_err() {
                return Err(SchemaError::invalid_status(code.as_str(), definition.status));
            }
            codes.insert(code, definition);
        }

        let has_index = routes
            .get(INDEX_ROUTE)
            .is_some_and(|methods| methods.contains_key(&Method::GET));
        if !has_index {
            return Err(SchemaError::MissingIndexRoute);
        }

        for required in &ResultCode::REQUIRED {
            if !codes.contains_key(required) {
                return Err(SchemaError::missing_code(required.as_str()));
            }
        }

        let fallback = codes
            .get(&ResultCode::INTERNAL_UNEXPECTED)
            .cloned()
            .ok_or_else(|| SchemaError::missing_code(ResultCode::INTERNAL_UNEXPECTED.as_str()))?;

        tracing::debug!(
            routes = routes.len(),
            codes = codes.len(),
            "schema registry built"
        );

        Ok(SchemaRegistry {
            routes,
            codes,
            fallback,
        })
    }
}

fn validate_parameters(route: &str, method: &Method, resource: &Resource) -> SchemaResult<()> {
    let mut seen = HashSet::with_capacity(resource.parameters.len());

    for spec in &resource.parameters {
        if !seen.insert(spec.name.as_str()) {
            return Err(SchemaError::duplicate_parameter(route, method.as_str(), &spec.name));
        }
        if spec.kind == ParameterKind::Enum && spec.options.is_empty() {
            return Err(SchemaError::empty_enum(route, method.as_str(), &spec.name));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::resource::ParameterSpec;
    use proptest::prelude::*;

    fn required_codes(builder: SchemaRegistryBuilder) -> SchemaRegistryBuilder {
        ResultCode::REQUIRED
            .into_iter()
            .fold(builder, |b, code| b.code(code, CodeDefinition::new(200)))
    }

    fn minimal() -> SchemaRegistryBuilder {
        required_codes(SchemaRegistry::builder().route("index", Method::GET, Resource::new("index")))
    }

    #[test]
    fn test_minimal_registry_builds() {
        let registry = minimal().build().unwrap();
        assert_eq!(registry.route_count(), 1);
        assert_eq!(registry.code_count(), 4);
    }

    #[test]
    fn test_missing_index_route() {
        let result = required_codes(SchemaRegistry::builder())
            .route("users", Method::GET, Resource::new("list"))
            .build();
        assert_eq!(result.unwrap_err(), SchemaError::MissingIndexRoute);
    }

    #[test]
    fn test_index_route_without_get() {
        let result = required_codes(SchemaRegistry::builder())
            .route("index", Method::POST, Resource::new("index"))
            .build();
        assert_eq!(result.unwrap_err(), SchemaError::MissingIndexRoute);
    }

    #[test]
    fn test_each_required_code_is_checked() {
        for missing in ResultCode::REQUIRED {
            let builder = ResultCode::REQUIRED
                .into_iter()
                .filter(|code| *code != missing)
                .fold(
                    SchemaRegistry::builder().route("index", Method::GET, Resource::new("index")),
                    |b, code| b.code(code, CodeDefinition::new(200)),
                );
            assert_eq!(
                builder.build().unwrap_err(),
                SchemaError::missing_code(missing.as_str())
            );
        }
    }

    #[test]
    fn test_enum_without_options_rejected() {
        let resource = Resource::new("create")
            .parameter(ParameterSpec::new("color", ParameterKind::Enum));
        let result = minimal().route("paint", Method::POST, resource).build();
        assert_eq!(
            result.unwrap_err(),
            SchemaError::empty_enum("paint", "POST", "color")
        );
    }

    #[test]
    fn test_duplicate_parameter_rejected() {
        let resource = Resource::new("create")
            .parameter(ParameterSpec::new("name", ParameterKind::String))
            .parameter(ParameterSpec::new("name", ParameterKind::Number));
        let result = minimal().route("users", Method::POST, resource).build();
        assert!(matches!(
            result.unwrap_err(),
            SchemaError::DuplicateParameter { .. }
        ));
    }

    #[test]
    fn test_invalid_status_rejected() {
        let result = minimal()
            .code(ResultCode::new("X001"), CodeDefinition::new(1200))
            .build();
        assert_eq!(result.unwrap_err(), SchemaError::invalid_status("X001", 1200));
    }

    #[test]
    fn test_lookup_outcomes() {
        let registry = fixtures::sample_registry().unwrap();

        assert!(matches!(registry.lookup("index", &Method::GET), Lookup::Found(_)));
        assert_eq!(registry.lookup("missing", &Method::GET), Lookup::UnknownRoute);
        assert_eq!(registry.lookup("index", &Method::DELETE), Lookup::UnknownMethod);
    }

    #[test]
    fn test_code_fallback() {
        let registry = fixtures::sample_registry().unwrap();
        let fallback = registry.code_or_fallback("Z999");
        assert_eq!(fallback, registry.code("I002").unwrap());
        assert_eq!(registry.code_or_fallback("G001").status, 404);
    }

    #[test]
    fn test_from_tables_normalizes_method_case() {
        let routes: RoutesTable = serde_json::from_str(
            r#"{"index": {"get": {"function": "index"}}}"#,
        )
        .unwrap();
        let registry = SchemaRegistry::from_tables(routes, fixtures::sample_codes()).unwrap();
        assert!(matches!(registry.lookup("index", &Method::GET), Lookup::Found(_)));
    }

    #[test]
    fn test_from_tables_rejects_bad_method() {
        let routes: RoutesTable = serde_json::from_str(
            r#"{"index": {"GET": {"function": "index"}, "BAD VERB": {"function": "x"}}}"#,
        )
        .unwrap();
        let result = SchemaRegistry::from_tables(routes, fixtures::sample_codes());
        assert!(matches!(result.unwrap_err(), SchemaError::InvalidMethod { .. }));
    }

    #[test]
    fn test_functions_sorted_and_unique() {
        let registry = fixtures::sample_registry().unwrap();
        assert_eq!(
            registry.functions(),
            vec!["create_user", "explode", "index", "list_users"]
        );
    }

    proptest! {
        #[test]
        fn prop_lookup_is_idempotent(route in "[a-z/]{0,12}", verb in prop::sample::select(vec![
            Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS, Method::PATCH,
        ])) {
            let registry = fixtures::sample_registry().unwrap();
            prop_assert_eq!(registry.lookup(&route, &verb), registry.lookup(&route, &verb));
        }
    }
}
