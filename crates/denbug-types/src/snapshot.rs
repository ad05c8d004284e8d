use serde::{Deserialize, Serialize};

/// Version written into every saved snapshot.
pub const SNAPSHOT_VERSION: &str = "1.0.0";

/// Serialized registry state: local (not effective) flags per domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    pub timestamp: i64,
    pub max_traces: usize,
    pub domains: Vec<DomainSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSnapshot {
    pub name: String,
    pub local_state: bool,
}

impl Snapshot {
    /// Local state recorded for `name`, if present.
    pub fn local_state(&self, name: &str) -> Option<bool> {
        self.domains
            .iter()
            .find(|domain| domain.name == name)
            .map(|domain| domain.local_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format_is_camel_case() {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION.to_string(),
            timestamp: 10,
            max_traces: 50,
            domains: vec![DomainSnapshot {
                name: "test".to_string(),
                local_state: true,
            }],
        };

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "version": "1.0.0",
                "timestamp": 10,
                "maxTraces": 50,
                "domains": [{ "name": "test", "localState": true }]
            })
        );
        assert_eq!(snapshot.local_state("test"), Some(true));
        assert_eq!(snapshot.local_state("missing"), None);
    }
}
