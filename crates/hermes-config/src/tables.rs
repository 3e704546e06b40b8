//! Loading the routes and codes tables into a [`SchemaRegistry`].
//!
//! The routes table maps route name → HTTP verb → resource:
//!
//! ```json
//! {
//!   "index": { "GET": { "function": "index" } },
//!   "users": {
//!     "POST": {
//!       "function": "create_user",
//!       "authentication": true,
//!       "parameters": [{ "name": "name", "kind": "string", "required": true }]
//!     }
//!   }
//! }
//! ```
//!
//! The codes table maps result code → status and localized messages:
//!
//! ```json
//! { "OK": { "status": 200, "message": { "en": "Success" } } }
//! ```

use std::fs;
use std::path::Path;

use hermes_core::{CodesTable, RoutesTable, SchemaRegistry};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::ConfigError;

/// Reads both tables from disk and builds the registry.
///
/// # Errors
///
/// Returns `ConfigError` if a file is missing or unreadable, a table does
/// not decode, or the tables fail schema validation.
pub fn load_registry(
    routes_path: impl AsRef<Path>,
    codes_path: impl AsRef<Path>,
) -> Result<SchemaRegistry, ConfigError> {
    let routes_path = routes_path.as_ref();
    let codes_path = codes_path.as_ref();

    let routes = read_file(routes_path)?;
    let codes = read_file(codes_path)?;
    let registry = registry_from_str(&routes, &codes)?;

    info!(
        routes_path = %routes_path.display(),
        codes_path = %codes_path.display(),
        routes = registry.route_count(),
        codes = registry.code_count(),
        "schema tables loaded"
    );
    Ok(registry)
}

/// Builds the registry from the two tables' JSON text.
///
/// # Errors
///
/// Returns `ConfigError::TableError` if a table does not decode and
/// `ConfigError::Schema` if the tables fail validation.
///
/// # Example
///
/// ```
/// use hermes_config::registry_from_str;
///
/// let routes = r#"{ "index": { "GET": { "function": "index" } } }"#;
/// let codes = r#"{
///     "OK":   { "status": 200 },
///     "G001": { "status": 404 },
///     "G002": { "status": 200 },
///     "G003": { "status": 405 },
///     "G004": { "status": 400 },
///     "G005": { "status": 400 },
///     "G006": { "status": 401 },
///     "G007": { "status": 401 },
///     "I001": { "status": 500 },
///     "I002": { "status": 500 },
///     "I003": { "status": 500 }
/// }"#;
///
/// let registry = registry_from_str(routes, codes).unwrap();
/// assert_eq!(registry.route_count(), 1);
/// ```
pub fn registry_from_str(routes: &str, codes: &str) -> Result<SchemaRegistry, ConfigError> {
    let routes: RoutesTable = decode("routes", routes)?;
    let codes: CodesTable = decode("codes", codes)?;
    Ok(SchemaRegistry::from_tables(routes, codes)?)
}

fn decode<T: DeserializeOwned>(table: &'static str, text: &str) -> Result<T, ConfigError> {
    serde_json::from_str(text).map_err(|e| ConfigError::table_error(table, e))
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::file_not_found(path));
    }
    fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermes_core::{fixtures, SchemaError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_routes_json() -> String {
        serde_json::to_string(&fixtures::sample_routes()).unwrap()
    }

    fn sample_codes_json() -> String {
        serde_json::to_string(&fixtures::sample_codes()).unwrap()
    }

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_registry_from_sample_tables() {
        let registry = registry_from_str(&sample_routes_json(), &sample_codes_json()).unwrap();
        assert_eq!(registry.route_count(), 3);
        assert_eq!(registry.code_count(), 11);
    }

    #[test]
    fn test_load_registry_from_files() {
        let routes = write(&sample_routes_json());
        let codes = write(&sample_codes_json());
        let registry = load_registry(routes.path(), codes.path()).unwrap();
        assert_eq!(registry.code("G005").unwrap().status, 400);
    }

    #[test]
    fn test_missing_file() {
        let codes = write(&sample_codes_json());
        let err = load_registry("/nonexistent/routes.json", codes.path()).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }

    #[test]
    fn test_undecodable_table() {
        let err = registry_from_str("[]", &sample_codes_json()).unwrap_err();
        assert!(matches!(err, ConfigError::TableError { table: "routes", .. }));

        let err = registry_from_str(&sample_routes_json(), r#"{"OK": {"status": "200"}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::TableError { table: "codes", .. }));
    }

    #[test]
    fn test_unknown_parameter_kind_rejected() {
        let routes = r#"{"index": {"GET": {"function": "index",
            "parameters": [{"name": "x", "kind": "date"}]}}}"#;
        let err = registry_from_str(routes, &sample_codes_json()).unwrap_err();
        assert!(matches!(err, ConfigError::TableError { table: "routes", .. }));
    }

    #[test]
    fn test_schema_validation_fails_closed() {
        let routes = r#"{"users": {"GET": {"function": "list_users"}}}"#;
        let err = registry_from_str(routes, &sample_codes_json()).unwrap_err();
        assert!(matches!(err, ConfigError::Schema(SchemaError::MissingIndexRoute)));

        let codes = r#"{"OK": {"status": 200}}"#;
        let err = registry_from_str(&sample_routes_json(), codes).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Schema(SchemaError::MissingRequiredCode { .. })
        ));
    }

    #[test]
    fn test_lowercase_method_keys_accepted() {
        let routes = r#"{"index": {"get": {"function": "index"}}}"#;
        let registry = registry_from_str(routes, &sample_codes_json()).unwrap();
        assert_eq!(registry.route_count(), 1);
    }
}
