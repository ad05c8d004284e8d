use denbug_sdk::types::FilterOptions;
use denbug_sdk::{Denbug, Error, ManualClock, PatternSet, TraceOptions, config, trace};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

fn denbug() -> Denbug {
    Denbug::builder().capture_stacks(false).build()
}

#[test]
fn test_domain_handle_records_only_when_enabled() {
    let denbug = denbug();
    let log = denbug.domain("test").unwrap();

    assert!(trace!(log, "test message").is_some());
    log.disable().unwrap();
    assert!(trace!(log, "hidden").is_none());

    let traces = denbug.traces();
    assert_eq!(traces.len(), 1);
    assert_eq!(traces[0].args, vec![json!("test message")]);
}

#[test]
fn test_empty_domain_name_is_rejected_with_contracts() {
    let denbug = denbug();
    let err = denbug.domain("").unwrap_err();
    assert!(matches!(
        err,
        Error::Engine(denbug_engine::Error::InvalidDomainName(_))
    ));

    denbug.set_contracts_enabled(false);
    let detached = denbug.domain("").unwrap();
    assert!(trace!(detached, "nothing").is_none());
}

#[test]
fn test_nested_domain_rejects_empty_segment() {
    let denbug = denbug();
    let app = denbug.domain("app").unwrap();

    assert!(matches!(
        app.domain(""),
        Err(Error::Engine(denbug_engine::Error::InvalidDomainName(_)))
    ));

    denbug.set_contracts_enabled(false);
    let detached = app.domain("").unwrap();
    assert!(detached.is_detached());
    assert!(trace!(detached, "nothing").is_none());
    assert_eq!(denbug.domains(), vec!["app", "app:echo"]);
}

#[test]
fn test_demand_checks() {
    let denbug = denbug();
    let demand = denbug.demand("assert-test").unwrap();

    demand.check(true, vec![json!("ok")]).unwrap();

    let err = demand.check(false, vec![json!("fail")]).unwrap_err();
    assert!(err.to_string().contains("Assertion failed"));
    assert_eq!(err.to_string(), "Assertion failed in assert-test: fail");

    let recorded = denbug.traces();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].args, vec![json!("Assertion failed"), json!("fail")]);
}

#[test]
fn test_demand_condition_type_follows_contract_switch() {
    let denbug = denbug();
    let demand = denbug.demand("demand-test").unwrap();

    denbug.set_contracts_enabled(false);
    demand.check_value(&json!("non-boolean"), vec![]).unwrap();
    assert!(demand.check_value(&json!(0), vec![]).is_err());

    denbug.set_contracts_enabled(true);
    let err = demand.check_value(&json!("non-boolean"), vec![]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Contract violation: demand requires a boolean condition"
    );
}

#[test]
fn test_enabled_only_filter_after_disable() {
    let denbug = denbug();
    let on = denbug.domain("test:enabled").unwrap();
    let off = denbug.domain("test:disabled").unwrap();

    trace!(on, "enabled message");
    trace!(off, "disabled message");
    off.disable().unwrap();

    let filtered = denbug.filter(&denbug.traces(), &FilterOptions::new().enabled_only());
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].domain, "test:enabled");
}

#[test]
fn test_max_traces_eviction_through_facade() {
    let denbug = denbug();
    denbug.configure(TraceOptions::max_traces(2));
    let log = denbug.domain("limited").unwrap();

    for word in ["one", "two", "three", "four"] {
        trace!(log, word);
    }

    let args: Vec<_> = denbug.traces().into_iter().map(|t| t.args[0].clone()).collect();
    assert_eq!(args, vec![json!("three"), json!("four")]);
}

#[test]
fn test_snapshot_file_round_trip_toml_and_json() {
    let temp = TempDir::new().unwrap();
    let source = denbug();
    source.domain("config:a").unwrap();
    source.domain("config:b").unwrap();
    source.set_state("config:a:echo", false).unwrap();
    source.disable("config:b").unwrap();

    for file in ["snap.toml", "snap.json"] {
        let path = temp.path().join(file);
        source.save_file(&path).unwrap();

        let target = denbug();
        target.load_file(&path).unwrap();

        assert_eq!(target.domains(), source.domains());
        assert!(!target.enabled("config:a:echo"));
        assert!(!target.enabled("config:b"));
        assert!(!target.enabled("config:b:echo"));
        assert!(target.enabled("config:a"));
    }
}

#[test]
fn test_env_patterns_apply_in_order() {
    let denbug = denbug();
    let applied = config::apply_env_value(&denbug, "net:**,-net:noisy");

    assert_eq!(applied, 2);
    assert!(denbug.enabled("net"));
    assert!(!denbug.enabled("net:noisy"));
}

#[test]
fn test_post_round_trip_with_fixed_clock() {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let source = Denbug::builder()
        .capture_stacks(false)
        .clock(clock.clone())
        .build();
    let log = source.domain("import").unwrap();
    trace!(log, "message 1");
    clock.advance(10);
    trace!(log, "message 2", {"structured": {"severity": "high"}});

    let exported = serde_json::to_string(&source.traces()).unwrap();
    let target = denbug();
    let imported = target.post(&exported).unwrap();

    assert_eq!(imported.len(), 2);
    assert_eq!(imported[1].timestamp, 1_700_000_000_010);
    let high = target.filter(
        &target.traces(),
        &FilterOptions::new().structured("severity", "high"),
    );
    assert_eq!(high.len(), 1);

    let decoded = target.decode(&imported[0]);
    insta::assert_snapshot!(decoded.timestamp, @"2023-11-14T22:13:20.000Z");
}

#[test]
fn test_apply_patterns_list_form() {
    let denbug = denbug();
    for name in ["a", "b", "c"] {
        denbug.domain(name).unwrap();
    }

    denbug.apply_patterns(&PatternSet::List(vec!["a".into(), "c".into(), "-c".into()]));

    assert!(denbug.enabled("a"));
    assert!(!denbug.enabled("b"));
    assert!(!denbug.enabled("c"));
}
