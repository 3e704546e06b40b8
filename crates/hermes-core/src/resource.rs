//! Resource descriptors and parameter specifications.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The declared type of a payload parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    /// JSON string.
    String,
    /// JSON boolean.
    Bool,
    /// Any JSON number.
    Number,
    /// JSON array.
    Array,
    /// JSON object.
    Map,
    /// JSON string restricted to [`ParameterSpec::options`].
    Enum,
}

impl ParameterKind {
    /// Returns the lowercase name used in schema files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Number => "number",
            Self::Array => "array",
            Self::Map => "map",
            Self::Enum => "enum",
        }
    }

    /// Returns `true` if a non-null value of `value` kind satisfies this
    /// declared kind.
    ///
    /// `null` is never accepted here; whether a `null` passes depends on the
    /// parameter's `required` flag and is decided by the validation stage.
    ///
    /// # Example
    ///
    /// ```
    /// use hermes_core::{ParameterKind, ValueKind};
    ///
    /// assert!(ParameterKind::Enum.accepts(ValueKind::String));
    /// assert!(!ParameterKind::Map.accepts(ValueKind::Array));
    /// ```
    #[must_use]
    pub const fn accepts(self, value: ValueKind) -> bool {
        matches!(
            (self, value),
            (Self::String | Self::Enum, ValueKind::String)
                | (Self::Bool, ValueKind::Bool)
                | (Self::Number, ValueKind::Number)
                | (Self::Array, ValueKind::Array)
                | (Self::Map, ValueKind::Object)
        )
    }
}

/// The dynamic kind of a decoded JSON value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `"..."`
    String,
    /// `true` / `false`
    Bool,
    /// Any number, integer or float.
    Number,
    /// `[...]`
    Array,
    /// `{...}`
    Object,
    /// `null`
    Null,
}

impl ValueKind {
    /// Classifies a JSON value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Bool(_) => Self::Bool,
            Value::Number(_) => Self::Number,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Null => Self::Null,
        }
    }
}

/// Specification of one payload parameter.
///
/// Serialized as `{"name", "kind", "required", "options", "max_length"}`.
/// The same shape is echoed back to clients inside validation reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name, unique within a resource.
    pub name: String,

    /// Declared kind.
    pub kind: ParameterKind,

    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,

    /// Allowed values when `kind` is [`ParameterKind::Enum`].
    #[serde(default)]
    pub options: Vec<String>,

    /// Advisory maximum length. Not enforced.
    #[serde(default)]
    pub max_length: usize,
}

impl ParameterSpec {
    /// Creates an optional parameter of the given kind.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            options: Vec::new(),
            max_length: 0,
        }
    }

    /// Marks the parameter as required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the enum options.
    #[must_use]
    pub fn options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the advisory maximum length.
    #[must_use]
    pub fn max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Returns `true` if `value` is one of the enum options.
    #[must_use]
    pub fn allows_option(&self, value: &str) -> bool {
        self.options.iter().any(|option| option == value)
    }
}

/// Schema entry for one (route, HTTP method) pair.
///
/// # Example
///
/// ```
/// use hermes_core::{ParameterKind, ParameterSpec, Resource};
///
/// let resource = Resource::new("create_user")
///     .authenticated()
///     .parameter(ParameterSpec::new("name", ParameterKind::String).required());
///
/// assert!(resource.authentication);
/// assert_eq!(resource.parameters.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Handler function key looked up in the handler registry.
    pub function: String,

    /// Whether a bearer token is required.
    #[serde(default)]
    pub authentication: bool,

    /// Declared payload parameters, in validation order.
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl Resource {
    /// Creates an unauthenticated resource with no parameters.
    #[must_use]
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            authentication: false,
            parameters: Vec::new(),
        }
    }

    /// Requires bearer authentication.
    #[must_use]
    pub fn authenticated(mut self) -> Self {
        self.authentication = true;
        self
    }

    /// Appends a parameter specification.
    #[must_use]
    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kind_classification() {
        assert_eq!(ValueKind::of(&json!("x")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!(true)), ValueKind::Bool);
        assert_eq!(ValueKind::of(&json!(1)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!(-1.5)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!([1, 2])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({"a": 1})), ValueKind::Object);
        assert_eq!(ValueKind::of(&Value::Null), ValueKind::Null);
    }

    #[test]
    fn test_kind_mapping_table() {
        use ParameterKind as P;
        use ValueKind as V;

        let accepted = [
            (P::String, V::String),
            (P::Enum, V::String),
            (P::Bool, V::Bool),
            (P::Number, V::Number),
            (P::Array, V::Array),
            (P::Map, V::Object),
        ];
        let kinds = [P::String, P::Bool, P::Number, P::Array, P::Map, P::Enum];
        let values = [V::String, V::Bool, V::Number, V::Array, V::Object, V::Null];

        for kind in kinds {
            for value in values {
                assert_eq!(
                    kind.accepts(value),
                    accepted.contains(&(kind, value)),
                    "{kind:?} vs {value:?}"
                );
            }
        }
    }

    #[test]
    fn test_parameter_spec_defaults_from_json() {
        let spec: ParameterSpec = serde_json::from_str(r#"{"name": "color", "kind": "enum"}"#).unwrap();
        assert_eq!(spec.kind, ParameterKind::Enum);
        assert!(!spec.required);
        assert!(spec.options.is_empty());
        assert_eq!(spec.max_length, 0);
    }

    #[test]
    fn test_parameter_spec_serializes_every_field() {
        let spec = ParameterSpec::new("color", ParameterKind::Enum)
            .required()
            .options(["red", "blue"]);
        let value = serde_json::to_value(&spec).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "color",
                "kind": "enum",
                "required": true,
                "options": ["red", "blue"],
                "max_length": 0
            })
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result: Result<ParameterSpec, _> =
            serde_json::from_str(r#"{"name": "x", "kind": "date"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_resource_from_json() {
        let resource: Resource = serde_json::from_str(
            r#"{"function": "list_users", "authentication": true,
                "parameters": [{"name": "page", "kind": "number"}]}"#,
        )
        .unwrap();
        assert_eq!(resource.function, "list_users");
        assert!(resource.authentication);
        assert_eq!(resource.parameters[0].name, "page");
    }

    #[test]
    fn test_allows_option() {
        let spec = ParameterSpec::new("c", ParameterKind::Enum).options(["red", "blue"]);
        assert!(spec.allows_option("red"));
        assert!(!spec.allows_option("green"));
    }
}
