use denbug_types::{Snapshot, is_valid_name};
use serde_json::Value;

use crate::error::{Error, Result};

/// Validated content of a snapshot, ready to apply to the registry.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct LoadPlan {
    pub max_traces: Option<usize>,
    pub domains: Vec<(String, bool)>,
}

impl From<&Snapshot> for LoadPlan {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            max_traces: Some(snapshot.max_traces),
            domains: snapshot
                .domains
                .iter()
                .filter(|domain| is_valid_name(&domain.name))
                .map(|domain| (domain.name.clone(), domain.local_state))
                .collect(),
        }
    }
}

/// Read an untyped snapshot.
///
/// Strict mode rejects any shape problem. Lenient mode drops the offending
/// part and keeps going.
///
/// Accepted domain entries: `{"name": .., "localState": ..}` (state defaults
/// to true) or a bare name string. A legacy `enabled` name list is honored
/// after `domains`.
pub(crate) fn plan(value: &Value, strict: bool) -> Result<LoadPlan> {
    let reject = |message: &str| -> Result<()> {
        if strict {
            tracing::warn!(message, "rejecting snapshot");
            return Err(Error::Contract(message.to_string()));
        }
        tracing::debug!(message, "skipping invalid snapshot content");
        Ok(())
    };

    let mut plan = LoadPlan::default();

    let Some(fields) = value.as_object() else {
        reject("snapshot must be an object")?;
        return Ok(plan);
    };

    if let Some(raw) = fields.get("maxTraces") {
        match raw.as_u64().and_then(|n| usize::try_from(n).ok()) {
            Some(max) => plan.max_traces = Some(max),
            None => reject("maxTraces must be a non-negative integer")?,
        }
    }

    if let Some(raw) = fields.get("domains") {
        match raw.as_array() {
            Some(entries) => {
                for entry in entries {
                    match domain_entry(entry) {
                        Some(domain) => plan.domains.push(domain),
                        None => reject("domain entries need a valid name")?,
                    }
                }
            }
            None => reject("domains must be an array")?,
        }
    }

    if let Some(raw) = fields.get("enabled") {
        match raw.as_array() {
            Some(entries) => {
                for entry in entries {
                    match entry.as_str().filter(|name| is_valid_name(name)) {
                        Some(name) => plan.domains.push((name.to_string(), true)),
                        None => reject("enabled entries must be domain names")?,
                    }
                }
            }
            None => reject("enabled must be an array")?,
        }
    }

    Ok(plan)
}

fn domain_entry(entry: &Value) -> Option<(String, bool)> {
    match entry {
        Value::String(name) if is_valid_name(name) => Some((name.clone(), true)),
        Value::Object(map) => {
            let name = map.get("name")?.as_str().filter(|name| is_valid_name(name))?;
            let local = match map.get("localState") {
                None | Some(Value::Null) => true,
                Some(state) => state.as_bool()?,
            };
            Some((name.to_string(), local))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plan_reads_current_format() {
        let value = json!({
            "version": "1.0.0",
            "timestamp": 0,
            "maxTraces": 50,
            "domains": [
                {"name": "app", "localState": true},
                {"name": "app:ui", "localState": false},
                {"name": "db"},
                "cache"
            ]
        });

        let plan = plan(&value, true).unwrap();
        assert_eq!(plan.max_traces, Some(50));
        assert_eq!(
            plan.domains,
            vec![
                ("app".to_string(), true),
                ("app:ui".to_string(), false),
                ("db".to_string(), true),
                ("cache".to_string(), true),
            ]
        );
    }

    #[test]
    fn test_plan_reads_legacy_enabled_list() {
        let plan = plan(&json!({"enabled": ["a", "b:c"]}), true).unwrap();
        assert_eq!(plan.max_traces, None);
        assert_eq!(plan.domains.len(), 2);
    }

    #[test]
    fn test_strict_rejects_bad_shapes() {
        for value in [
            json!([]),
            json!({"maxTraces": -1}),
            json!({"maxTraces": "lots"}),
            json!({"domains": "app"}),
            json!({"domains": [{"localState": true}]}),
            json!({"domains": [{"name": "a", "localState": "yes"}]}),
            json!({"domains": [{"name": ":x"}]}),
            json!({"domains": ["a::b"]}),
            json!({"enabled": ["a:"]}),
        ] {
            assert!(
                matches!(plan(&value, true), Err(Error::Contract(_))),
                "expected {} to be rejected",
                value
            );
        }
    }

    #[test]
    fn test_lenient_skips_bad_parts() {
        let value = json!({
            "maxTraces": "lots",
            "domains": [42, {"name": ":x"}, "a::b", {"name": "ok", "localState": false}],
            "enabled": ["b:"]
        });
        let plan = plan(&value, false).unwrap();
        assert_eq!(plan.max_traces, None);
        assert_eq!(plan.domains, vec![("ok".to_string(), false)]);

        assert_eq!(super::plan(&json!(null), false).unwrap(), LoadPlan::default());
    }
}
