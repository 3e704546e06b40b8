//! Schema build errors.

use thiserror::Error;

/// Result type alias using [`SchemaError`].
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors detected while building a [`SchemaRegistry`](crate::SchemaRegistry).
///
/// These are configuration errors: the registry build fails closed and
/// nothing is served with a partial schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// No `index` route with a `GET` resource.
    #[error("there must be an `index` route with a GET resource")]
    MissingIndexRoute,

    /// A code from [`ResultCode::REQUIRED`](crate::ResultCode::REQUIRED) is not defined.
    #[error("required result code `{code}` is not defined")]
    MissingRequiredCode {
        /// The missing code.
        code: String,
    },

    /// A route declares a method key that is not a valid HTTP method.
    #[error("route `{route}` declares invalid HTTP method `{method}`")]
    InvalidMethod {
        /// Route name.
        route: String,
        /// The rejected method key.
        method: String,
    },

    /// A code maps to a status outside `100..=999`.
    #[error("result code `{code}` has invalid HTTP status {status}")]
    InvalidStatus {
        /// The offending code.
        code: String,
        /// The rejected status.
        status: u16,
    },

    /// An enum parameter has no options.
    #[error("enum parameter `{parameter}` on {method} {route} has no options")]
    EmptyEnumOptions {
        /// Route name.
        route: String,
        /// HTTP method.
        method: String,
        /// Parameter name.
        parameter: String,
    },

    /// Two parameters of one resource share a name.
    #[error("parameter `{parameter}` is declared more than once on {method} {route}")]
    DuplicateParameter {
        /// Route name.
        route: String,
        /// HTTP method.
        method: String,
        /// Parameter name.
        parameter: String,
    },
}

impl SchemaError {
    /// Creates a missing required code error.
    pub fn missing_code(code: impl Into<String>) -> Self {
        Self::MissingRequiredCode { code: code.into() }
    }

    /// Creates an invalid method error.
    pub fn invalid_method(route: impl Into<String>, method: impl Into<String>) -> Self {
        Self::InvalidMethod {
            route: route.into(),
            method: method.into(),
        }
    }

    /// Creates an invalid status error.
    pub fn invalid_status(code: impl Into<String>, status: u16) -> Self {
        Self::InvalidStatus {
            code: code.into(),
            status,
        }
    }

    /// Creates an empty enum options error.
    pub fn empty_enum(
        route: impl Into<String>,
        method: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Self {
        Self::EmptyEnumOptions {
            route: route.into(),
            method: method.into(),
            parameter: parameter.into(),
        }
    }

    /// Creates a duplicate parameter error.
    pub fn duplicate_parameter(
        route: impl Into<String>,
        method: impl Into<String>,
        parameter: impl Into<String>,
    ) -> Self {
        Self::DuplicateParameter {
            route: route.into(),
            method: method.into(),
            parameter: parameter.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_code_message() {
        let err = SchemaError::missing_code("I002");
        assert!(err.to_string().contains("I002"));
    }

    #[test]
    fn test_empty_enum_message() {
        let err = SchemaError::empty_enum("users", "POST", "color");
        let msg = err.to_string();
        assert!(msg.contains("color"));
        assert!(msg.contains("POST users"));
    }

    #[test]
    fn test_invalid_status_message() {
        let err = SchemaError::invalid_status("G001", 42);
        assert!(err.to_string().contains("42"));
    }
}
