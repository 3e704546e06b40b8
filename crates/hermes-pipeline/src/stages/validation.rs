//! Payload parsing and parameter checks.
//!
//! For each declared parameter, in declaration order:
//!
//! | Payload value | Outcome |
//! |---------------|---------|
//! | key absent | **missing** |
//! | `null`, parameter required | **invalid** |
//! | `null`, parameter optional | accepted, not stored |
//! | kind mismatch | **invalid** |
//! | enum value outside the options | **invalid** |
//! | otherwise | stored |
//!
//! Keys the resource does not declare are dropped. `max_length` is carried
//! in the report but never checked.

use hermes_core::{ParameterKind, ParameterSpec, RequestContext, ResultCode, ValueKind};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::stage::{Outcome, Stage, StageResult};

/// Parameters that failed validation, serialized as the `G005` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Declared parameters absent from the payload, required or not.
    pub missing: Vec<ParameterSpec>,
    /// Parameters present with a value of the wrong kind, outside the enum
    /// options, or `null` while required.
    pub invalid: Vec<ParameterSpec>,
}

impl ValidationReport {
    /// Returns `true` if nothing failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.invalid.is_empty()
    }
}

/// Parses the body and validates it against the resolved resource.
///
/// Skipped when the resource declares no parameters.
pub fn run(ctx: &mut RequestContext) -> StageResult {
    let stage = Stage::ValidatePayload.name();

    let Some(resource) = ctx.resource().cloned() else {
        return Ok(());
    };
    if resource.parameters.is_empty() {
        return Ok(());
    }

    let payload = parse_payload(ctx.body()).ok_or_else(|| {
        info!(stage, body_len = ctx.body().len(), "payload is not a JSON object");
        Outcome::new(ResultCode::MALFORMED_PAYLOAD)
    })?;

    match validate_parameters(&resource.parameters, payload) {
        Ok(parameters) => {
            debug!(stage, accepted = parameters.len(), "payload validated");
            ctx.set_parameters(parameters);
            Ok(())
        }
        Err(report) => {
            info!(
                stage,
                missing = report.missing.len(),
                invalid = report.invalid.len(),
                "payload validation failed"
            );
            let data = serde_json::to_value(&report).unwrap_or_default();
            Err(Outcome::with_data(ResultCode::VALIDATION_FAILED, data))
        }
    }
}

/// Parses a body into a JSON object. An empty body is an empty object.
fn parse_payload(body: &[u8]) -> Option<Map<String, Value>> {
    if body.is_empty() {
        return Some(Map::new());
    }
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Checks a decoded payload against parameter specifications.
///
/// Returns the declared subset of the payload, or a report of every
/// parameter that was missing or invalid.
///
/// # Example
///
/// ```
/// use hermes_core::{ParameterKind, ParameterSpec};
/// use hermes_pipeline::validate_parameters;
/// use serde_json::json;
///
/// let specs = [ParameterSpec::new("name", ParameterKind::String).required()];
/// let payload = json!({ "name": "ana", "extra": 1 });
///
/// let accepted = validate_parameters(&specs, payload.as_object().unwrap().clone()).unwrap();
/// assert_eq!(accepted.len(), 1);
/// ```
pub fn validate_parameters(
    specs: &[ParameterSpec],
    mut payload: Map<String, Value>,
) -> Result<Map<String, Value>, ValidationReport> {
    let mut report = ValidationReport::default();
    let mut accepted = Map::new();

    for spec in specs {
        match payload.remove(&spec.name) {
            None => report.missing.push(spec.clone()),
            Some(Value::Null) => {
                if spec.required {
                    report.invalid.push(spec.clone());
                }
            }
            Some(value) => {
                if is_valid(spec, &value) {
                    accepted.insert(spec.name.clone(), value);
                } else {
                    report.invalid.push(spec.clone());
                }
            }
        }
    }

    if report.is_empty() {
        Ok(accepted)
    } else {
        Err(report)
    }
}

fn is_valid(spec: &ParameterSpec, value: &Value) -> bool {
    if !spec.kind.accepts(ValueKind::of(value)) {
        return false;
    }
    if spec.kind == ParameterKind::Enum {
        return value.as_str().is_some_and(|option| spec.allows_option(option));
    }
    true
}
