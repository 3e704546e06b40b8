//! Request ID rewriting.
//!
//! With [`RequestIdPolicy::Tagged`], the transport-supplied ID becomes
//! `base64(tag_1:…:tag_n:unix_seconds:original_id)`, so an ID seen in a client
//! report can be decoded back to the host that served it and when.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::Utc;
use hermes_core::RequestId;

/// How the pipeline treats the transport-supplied request ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestIdPolicy {
    /// Keep the ID as supplied.
    #[default]
    Passthrough,
    /// Prefix the ID with host tags and the current Unix time, then base64
    /// encode it.
    Tagged {
        /// Host identification (region, instance, ...).
        host_tags: Vec<String>,
    },
}

impl RequestIdPolicy {
    /// Creates a tagging policy.
    #[must_use]
    pub fn tagged<I, S>(host_tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Tagged {
            host_tags: host_tags.into_iter().map(Into::into).collect(),
        }
    }

    /// Applies the policy at the current time.
    #[must_use]
    pub fn apply(&self, id: &RequestId) -> RequestId {
        self.apply_at(id, Utc::now().timestamp())
    }

    /// Applies the policy with an explicit Unix timestamp.
    #[must_use]
    pub fn apply_at(&self, id: &RequestId, unix_seconds: i64) -> RequestId {
        match self {
            Self::Passthrough => id.clone(),
            Self::Tagged { host_tags } => {
                let timestamp = unix_seconds.to_string();
                let joined = host_tags
                    .iter()
                    .map(String::as_str)
                    .chain([timestamp.as_str(), id.as_str()])
                    .collect::<Vec<_>>()
                    .join(":");
                RequestId::from(STANDARD.encode(joined))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(id: &RequestId) -> String {
        String::from_utf8(STANDARD.decode(id.as_str()).unwrap()).unwrap()
    }

    #[test]
    fn test_passthrough() {
        let id = RequestId::from("abc");
        assert_eq!(RequestIdPolicy::Passthrough.apply(&id), id);
    }

    #[test]
    fn test_tagged_layout() {
        let policy = RequestIdPolicy::tagged(["gru", "vm-7"]);
        let id = policy.apply_at(&RequestId::from("abc"), 1_700_000_000);
        assert_eq!(decode(&id), "gru:vm-7:1700000000:abc");
    }

    #[test]
    fn test_tagged_without_tags() {
        let policy = RequestIdPolicy::tagged(Vec::<String>::new());
        let id = policy.apply_at(&RequestId::from("abc"), 42);
        assert_eq!(decode(&id), "42:abc");
    }

    #[test]
    fn test_tagged_uses_current_time() {
        let before = Utc::now().timestamp();
        let id = RequestIdPolicy::tagged(["h"]).apply(&RequestId::from("x"));
        let decoded = decode(&id);
        let seconds: i64 = decoded.split(':').nth(1).unwrap().parse().unwrap();
        assert!(seconds >= before);
    }
}
