use std::fmt::{Display, Formatter};

use ferrofolio_core::{EnvelopeMeta, ValidationError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request identifier (UUID v4) attached to every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// Command metadata collected while a command runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub request_id: RequestId,
    pub source: Option<String>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(source: Option<&str>, latency_ms: u64, cache_hit: bool) -> Self {
        Self {
            request_id: RequestId::new_v4(),
            source: source.map(str::to_owned),
            latency_ms,
            cache_hit,
            warnings: Vec::new(),
        }
    }

    pub fn push_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub fn into_envelope_meta(self) -> Result<EnvelopeMeta, ValidationError> {
        let mut envelope_meta =
            EnvelopeMeta::new(self.request_id.to_string(), self.latency_ms, self.cache_hit)?;
        if let Some(source) = self.source {
            envelope_meta = envelope_meta.with_source(source);
        }

        for warning in self.warnings {
            envelope_meta.push_warning(warning);
        }

        Ok(envelope_meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_uuid_v4() {
        let request_id = RequestId::new_v4();
        assert_eq!(request_id.0.get_version_num(), 4);
    }

    #[test]
    fn envelope_meta_keeps_warnings_and_source() {
        let mut metadata = Metadata::new(Some("yahoo"), 42, false);
        metadata.push_warning("price for 'VT' unavailable");

        let meta = metadata.into_envelope_meta().expect("valid meta");

        assert_eq!(meta.source.as_deref(), Some("yahoo"));
        assert_eq!(meta.latency_ms, 42);
        assert_eq!(meta.warnings, vec![String::from("price for 'VT' unavailable")]);
        assert_eq!(meta.schema_version, "v1.0.0");
    }
}
