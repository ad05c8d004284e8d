use denbug_types::*;
use serde_json::json;

#[test]
fn test_trace_wire_shape() {
    let trace = Trace::new(
        "app:ui",
        vec![json!("clicked"), json!({ "structured": { "button": "ok" } })],
        1_700_000_000_000,
        CallStack::from_stack_text("Error\n    at click (/ui.js:3:9)"),
    );

    insta::assert_json_snapshot!(trace, @r#"
    {
      "timestamp": 1700000000000,
      "domain": "app:ui",
      "args": [
        "clicked",
        {
          "structured": {
            "button": "ok"
          }
        }
      ],
      "error": {
        "stack": "Error\n    at click (/ui.js:3:9)"
      },
      "structured": {
        "button": "ok"
      }
    }
    "#);
}

#[test]
fn test_exported_traces_parse_back() {
    let original = vec![
        Trace::new("a", vec![json!(1)], 10, CallStack::empty()),
        Trace::new("a:b", vec![json!("two")], 20, CallStack::from_stack_text("Error")),
    ];
    let text = serde_json::to_string(&original).unwrap();

    let values = parse_trace_text(&text).unwrap();
    let restored: Vec<Trace> = values
        .into_iter()
        .map(|value| Trace::from_value(value, 0, CallStack::empty))
        .collect();

    assert_eq!(restored.len(), 2);
    assert_eq!(restored[1].domain, "a:b");
    assert_eq!(restored[1].timestamp, 20);
    assert_eq!(restored[1].args, vec![json!("two")]);
    assert_eq!(restored[1].error.frames(), vec!["Error".to_string()]);
    assert!(restored[0].extra.is_empty());
}

#[test]
fn test_snapshot_reads_camel_case() {
    let snapshot: Snapshot = serde_json::from_value(json!({
        "version": SNAPSHOT_VERSION,
        "timestamp": 5,
        "maxTraces": 20,
        "domains": [
            { "name": "net", "localState": false },
            { "name": "net:echo", "localState": true }
        ]
    }))
    .unwrap();

    assert_eq!(snapshot.max_traces, 20);
    assert_eq!(snapshot.local_state("net"), Some(false));
    assert_eq!(snapshot.local_state("net:echo"), Some(true));
    assert_eq!(snapshot.local_state("db"), None);
}

#[test]
fn test_event_names_and_domains() {
    let created = Event::DomainCreated {
        domain: "x".to_string(),
    };
    assert_eq!(created.name(), "domainCreated");
    assert_eq!(created.domain(), Some("x"));

    let custom = Event::Custom {
        name: "deploy".to_string(),
        payload: json!({ "v": 2 }),
    };
    assert_eq!(custom.name(), "deploy");
    assert_eq!(custom.domain(), None);
    assert_eq!(Event::Cleared.name(), "cleared");
}

#[test]
fn test_path_helpers() {
    assert_eq!(ancestor_paths("a:b:echo"), vec!["a", "a:b", "a:b:echo"]);
    assert_eq!(echo_name("a:b"), "a:b:echo");
    assert!(is_echo(&echo_name("a")));
    assert_eq!(parent_name("a:b:echo"), Some("a:b"));
    assert!(is_within("a:b:echo", "a"));
}
