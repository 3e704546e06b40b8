//! Sample schema tables and handlers shared by tests across the workspace.
//!
//! # Example
//!
//! ```
//! use hermes_core::fixtures;
//!
//! let registry = fixtures::sample_registry().unwrap();
//! assert_eq!(registry.route_count(), 3);
//!
//! let handlers = fixtures::sample_handlers();
//! assert!(handlers.contains("create_user"));
//! ```

use std::collections::BTreeMap;

use serde_json::{json, Value};

use crate::code::{CodeDefinition, ResultCode};
use crate::error::SchemaResult;
use crate::handler::{HandlerOutput, HandlerRegistry};
use crate::registry::{CodesTable, RoutesTable, SchemaRegistry};
use crate::resource::{ParameterKind, ParameterSpec, Resource};

/// Codes table defining every well-known code with `en` and `pt` messages.
#[must_use]
pub fn sample_codes() -> CodesTable {
    let entries = [
        ("OK", 200, "Success", "Sucesso"),
        ("G001", 404, "Route not found", "Rota não encontrada"),
        ("G002", 200, "Preflight accepted", "Preflight aceito"),
        ("G003", 405, "Method not allowed", "Método não permitido"),
        ("G004", 400, "Malformed payload", "Payload malformado"),
        ("G005", 400, "Invalid parameters", "Parâmetros inválidos"),
        ("G006", 401, "Missing authorization", "Autorização ausente"),
        ("G007", 401, "Malformed authorization", "Autorização malformada"),
        ("I001", 500, "Internal error", "Erro interno"),
        ("I002", 500, "Unexpected error", "Erro inesperado"),
        ("I003", 500, "Unknown handler", "Handler desconhecido"),
    ];

    entries
        .into_iter()
        .map(|(code, status, en, pt)| {
            (
                code.to_owned(),
                CodeDefinition::new(status)
                    .with_message("en", en)
                    .with_message("pt", pt),
            )
        })
        .collect()
}

/// Routes table with:
///
/// - `index` / `GET` → `index`
/// - `users` / `GET` (authenticated) → `list_users`
/// - `users` / `POST` → `create_user`, with one parameter of every kind
/// - `explode` / `GET` → `explode`, whose sample handler panics
#[must_use]
pub fn sample_routes() -> RoutesTable {
    let mut routes = RoutesTable::new();

    routes.insert(
        "index".to_owned(),
        BTreeMap::from([("GET".to_owned(), Resource::new("index"))]),
    );

    routes.insert(
        "users".to_owned(),
        BTreeMap::from([
            ("GET".to_owned(), Resource::new("list_users").authenticated()),
            (
                "POST".to_owned(),
                Resource::new("create_user")
                    .parameter(
                        ParameterSpec::new("name", ParameterKind::String)
                            .required()
                            .max_length(64),
                    )
                    .parameter(ParameterSpec::new("age", ParameterKind::Number))
                    .parameter(ParameterSpec::new("active", ParameterKind::Bool))
                    .parameter(ParameterSpec::new("tags", ParameterKind::Array))
                    .parameter(ParameterSpec::new("meta", ParameterKind::Map))
                    .parameter(
                        ParameterSpec::new("color", ParameterKind::Enum).options(["red", "blue"]),
                    ),
            ),
        ]),
    );

    routes.insert(
        "explode".to_owned(),
        BTreeMap::from([("GET".to_owned(), Resource::new("explode"))]),
    );

    routes
}

/// Builds a registry from [`sample_routes`] and [`sample_codes`].
pub fn sample_registry() -> SchemaResult<SchemaRegistry> {
    SchemaRegistry::from_tables(sample_routes(), sample_codes())
}

/// Handlers matching every function key in [`sample_routes`].
///
/// - `index` returns `{"hello": "world"}`
/// - `list_users` returns `{"token": <bearer token>}`
/// - `create_user` echoes the validated parameters
/// - `explode` panics with `"boom"`
#[must_use]
pub fn sample_handlers() -> HandlerRegistry {
    let mut handlers = HandlerRegistry::new();

    handlers
        .register_fn("index", |_ctx| HandlerOutput::ok(json!({ "hello": "world" })))
        .register_fn("list_users", |ctx| {
            HandlerOutput::ok(json!({ "token": ctx.token() }))
        })
        .register_fn("create_user", |ctx| {
            let params = ctx.parameters().cloned().map_or(Value::Null, Value::Object);
            HandlerOutput::new(params, ResultCode::OK)
        })
        .register_fn("explode", |_ctx| panic!("boom"));

    handlers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_codes_cover_required() {
        let codes = sample_codes();
        for required in ResultCode::REQUIRED {
            assert!(codes.contains_key(required.as_str()));
        }
        assert_eq!(codes.len(), 11);
    }

    #[test]
    fn test_sample_handlers_cover_routes() {
        let handlers = sample_handlers();
        for methods in sample_routes().values() {
            for resource in methods.values() {
                assert!(handlers.contains(&resource.function), "{}", resource.function);
            }
        }
    }

    #[test]
    fn test_sample_registry_builds() {
        let registry = sample_registry().unwrap();
        assert_eq!(registry.route_count(), 3);
        assert_eq!(registry.code_count(), 11);
    }
}
