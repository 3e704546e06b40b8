//! Result codes and their definitions.
//!
//! A [`ResultCode`] is an opaque string classifying the outcome of a request.
//! The [`SchemaRegistry`](crate::SchemaRegistry) maps each code to a
//! [`CodeDefinition`] carrying the HTTP status and the localized messages.
//!
//! | Code | Meaning |
//! |------|---------|
//! | `OK` | handler succeeded |
//! | `G001` | route not found |
//! | `G002` | CORS preflight on a route without an `OPTIONS` resource |
//! | `G003` | method not allowed |
//! | `G004` | malformed payload |
//! | `G005` | payload validation failed |
//! | `G006` | missing `Authorization` header |
//! | `G007` | malformed `Authorization` header |
//! | `I001` | handler or hook panicked |
//! | `I002` | unexpected result, also the response fallback |
//! | `I003` | no handler registered for the resource function |

use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::fmt;

use http::StatusCode;
use serde::{Deserialize, Serialize};

/// An opaque outcome key such as `"OK"` or `"G001"`.
///
/// # Example
///
/// ```
/// use hermes_core::ResultCode;
///
/// let code = ResultCode::new("X042");
/// assert_eq!(code.as_str(), "X042");
/// assert!(ResultCode::OK.is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultCode(Cow<'static, str>);

impl ResultCode {
    /// Successful outcome.
    pub const OK: Self = Self(Cow::Borrowed("OK"));
    /// Route not found.
    pub const ROUTE_NOT_FOUND: Self = Self(Cow::Borrowed("G001"));
    /// Preflight accepted on a route with no explicit `OPTIONS` resource.
    pub const PREFLIGHT_OK: Self = Self(Cow::Borrowed("G002"));
    /// Route exists but does not accept the method.
    pub const METHOD_NOT_ALLOWED: Self = Self(Cow::Borrowed("G003"));
    /// Body is not a JSON object.
    pub const MALFORMED_PAYLOAD: Self = Self(Cow::Borrowed("G004"));
    /// Declared parameters are missing or invalid.
    pub const VALIDATION_FAILED: Self = Self(Cow::Borrowed("G005"));
    /// `Authorization` header absent.
    pub const MISSING_AUTHORIZATION: Self = Self(Cow::Borrowed("G006"));
    /// `Authorization` header not in `<scheme> <token>` shape.
    pub const MALFORMED_AUTHORIZATION: Self = Self(Cow::Borrowed("G007"));
    /// A handler or hook panicked.
    pub const INTERNAL_PANIC: Self = Self(Cow::Borrowed("I001"));
    /// Unexpected outcome; used when the final code has no definition or
    /// the response body could not be encoded.
    pub const INTERNAL_UNEXPECTED: Self = Self(Cow::Borrowed("I002"));
    /// The resource function key has no registered handler.
    pub const UNKNOWN_HANDLER: Self = Self(Cow::Borrowed("I003"));

    /// Codes every registry must define.
    pub const REQUIRED: [Self; 4] = [
        Self::OK,
        Self::INTERNAL_PANIC,
        Self::INTERNAL_UNEXPECTED,
        Self::UNKNOWN_HANDLER,
    ];

    /// Creates a code from any string.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self(Cow::Owned(code.into()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for [`ResultCode::OK`].
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.as_str() == "OK"
    }

    /// Returns `true` if the code is the empty string.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResultCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResultCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for ResultCode {
    fn from(code: String) -> Self {
        Self(Cow::Owned(code))
    }
}

/// HTTP status and localized messages attached to a [`ResultCode`].
///
/// Serialized as `{"status": 404, "message": {"en": "..."}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeDefinition {
    /// HTTP status code returned with this result.
    pub status: u16,

    /// Human-readable message keyed by locale tag.
    #[serde(default)]
    pub message: BTreeMap<String, String>,
}

impl CodeDefinition {
    /// Creates a definition with no messages.
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            message: BTreeMap::new(),
        }
    }

    /// Adds a message for a locale.
    #[must_use]
    pub fn with_message(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.message.insert(locale.into(), text.into());
        self
    }

    /// Returns the status as an [`http::StatusCode`].
    ///
    /// Registries reject out-of-range statuses, so the 500 fallback is only
    /// reachable for definitions built by hand.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}
