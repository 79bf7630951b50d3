//! Finalizers, call-time errors and host settings.

mod common;

use common::{Trace, diamond, names, recorder};
use cooper_core::{ClassDef, CoopError, Kwargs, Method, ProtocolViolation, Value, kwargs};
use cooper_host::{Host, HostError, init_logging};
use miette::IntoDiagnostic;
use tempfile::TempDir;

#[test]
fn test_finalizer_chain_runs_on_finalize() {
    init_logging();
    let host = Host::new();
    let trace = Trace::new();

    let x = host
        .define(ClassDef::new("X").method(Method::cooperate("finalize", recorder(&trace, "X", None))))
        .unwrap();
    let y = host
        .define(
            ClassDef::new("Y")
                .base(&x)
                .method(Method::cooperate("finalize", recorder(&trace, "Y", None))),
        )
        .unwrap();
    let z = host
        .define(
            ClassDef::new("Z")
                .base(&x)
                .method(Method::post_cooperate("finalize", recorder(&trace, "Z", None))),
        )
        .unwrap();

    y.instantiate(Kwargs::new()).unwrap().finalize().unwrap();
    assert_eq!(trace.take(), names(&["X", "Y"]));

    z.instantiate(Kwargs::new()).unwrap().finalize().unwrap();
    assert_eq!(trace.take(), names(&["Z", "X"]));
}

#[test]
fn test_finalizer_rules() {
    let host = Host::new();
    let plain = host
        .define(ClassDef::new("P").method(Method::plain("finalize", |_| Ok(Value::Unit))))
        .unwrap_err();
    assert_eq!(plain.configuration_code(), Some("finalizer-must-cooperate"));

    let shaped = host
        .define(
            ClassDef::new("Q")
                .method(Method::cooperate("finalize", |_| Ok(Value::Unit)).keyword("now", true)),
        )
        .unwrap_err();
    assert_eq!(shaped.configuration_code(), Some("bad-finalizer-shape"));
}

#[test]
fn test_unclaimed_constructor_keyword_reaches_universal_base() {
    let host = Host::new();
    let trace = Trace::new();
    let h = diamond(&host, &trace);

    let err = h.d.instantiate(kwargs! { "bogus" => 1 }).unwrap_err();
    let unrecognized = err.unrecognized().unwrap();
    assert_eq!(unrecognized.owner, "object");
    assert_eq!(unrecognized.method, "init");
    assert_eq!(unrecognized.keys, vec!["bogus".to_string()]);
}

#[test]
fn test_unclaimed_method_keyword_is_reported_by_root() {
    let host = Host::new();
    let trace = Trace::new();
    let h = diamond(&host, &trace);

    let mut obj = h.d.instantiate(Kwargs::new()).unwrap();
    trace.take();
    let err = obj
        .invoke("method", &[Value::from("m")], kwargs! { "bogus" => 1, "b_mparam" => "x" })
        .unwrap_err();
    let unrecognized = err.unrecognized().unwrap();
    assert_eq!(unrecognized.owner, "A");
    assert_eq!(unrecognized.keys, vec!["bogus".to_string()]);
    assert!(trace.take().is_empty(), "no body runs before the root claims");
}

#[test]
fn test_root_with_variadic_keywords_absorbs_leftovers() {
    let host = Host::new();
    let collector = host
        .define(ClassDef::new("Collector").method(
            Method::cooperative("collect", |call| Ok(Value::from(call.kwargs().len() as i64)))
                .variadic_keyword(),
        ))
        .unwrap();
    let mut obj = collector.instantiate(Kwargs::new()).unwrap();
    let got = obj
        .invoke("collect", &[], kwargs! { "x" => 1, "y" => 2 })
        .unwrap();
    assert_eq!(got, Value::from(2));
}

#[test]
fn test_wrong_positional_count_is_an_arity_error() {
    let host = Host::new();
    let trace = Trace::new();
    let h = diamond(&host, &trace);

    let mut obj = h.d.instantiate(Kwargs::new()).unwrap();
    let err = obj.invoke("method", &[], Kwargs::new()).unwrap_err();
    match err {
        CoopError::Arity(arity) => {
            assert_eq!(arity.owner, "D");
            assert_eq!(arity.expected, "1");
            assert_eq!(arity.got, 0);
        }
        other => panic!("expected arity error, got {other:?}"),
    }
}

#[test]
fn test_unknown_method_is_an_attribute_error() {
    let host = Host::new();
    let trace = Trace::new();
    let h = diamond(&host, &trace);

    let mut obj = h.d.instantiate(Kwargs::new()).unwrap();
    let err = obj.invoke("missing", &[], Kwargs::new()).unwrap_err();
    assert!(matches!(err, CoopError::Attribute(ref e) if e.class == "D" && e.method == "missing"));
}

#[test]
fn test_calling_past_the_last_implementation() {
    let host = Host::new();
    let helper = host
        .define(ClassDef::new("Helper").method(Method::plain("helper", |call| call.forward())))
        .unwrap();
    let mut obj = helper.instantiate(Kwargs::new()).unwrap();
    let err = obj.invoke("helper", &[], Kwargs::new()).unwrap_err();
    let violation = err.protocol_violation().unwrap();
    assert_eq!(violation.kind, ProtocolViolation::NoNextImplementation);
    assert_eq!(violation.owner, "Helper");
}

#[test]
fn test_pre_body_has_no_continuation() {
    let host = Host::new();
    let trace = Trace::new();
    let h = diamond(&host, &trace);

    let eager = host
        .define(ClassDef::new("Eager").base(&h.d).method(
            Method::cooperate("method", |call| call.next(Kwargs::new())).required("mparam"),
        ))
        .unwrap();
    let mut obj = eager.instantiate(Kwargs::new()).unwrap();
    let err = obj
        .invoke("method", &[Value::from("m")], Kwargs::new())
        .unwrap_err();
    assert_eq!(
        err.protocol_violation().map(|v| v.reason_code()),
        Some("no-next-implementation")
    );
}

#[test]
fn test_body_failure_propagates_to_caller() {
    let host = Host::new();
    let failing = host
        .define(ClassDef::new("Failing").method(Method::cooperate("init", |_| {
            Err(CoopError::raise("constructor refused"))
        })))
        .unwrap();
    let err = failing.instantiate(Kwargs::new()).unwrap_err();
    assert_eq!(err.to_string(), "constructor refused");
}

#[test]
fn test_host_reads_lifecycle_names_from_file() -> miette::Result<()> {
    let temp = TempDir::new().into_diagnostic()?;
    let path = temp.path().join("cooper.toml");
    std::fs::write(&path, "constructor = \"setup\"\nfinalizer = \"teardown\"\n").into_diagnostic()?;

    let host = Host::from_config_file(&path)?;
    assert_eq!(host.config().constructor, "setup");

    let trace = Trace::new();
    let class = host.define(
        ClassDef::new("Configured")
            .method(Method::cooperate("setup", recorder(&trace, "setup", None)))
            .method(Method::cooperate("teardown", recorder(&trace, "teardown", None))),
    )?;
    let obj = host.instantiate("Configured", Kwargs::new())?;
    obj.finalize()?;
    assert_eq!(trace.take(), names(&["setup", "teardown"]));
    assert!(class.declared("setup").is_some_and(|m| !m.is_root()));

    let err = host
        .define(ClassDef::new("Strict").method(Method::plain("setup", |_| Ok(Value::Unit))))
        .unwrap_err();
    assert_eq!(err.configuration_code(), Some("constructor-must-cooperate"));
    Ok(())
}

#[test]
fn test_bad_settings_file_is_reported() {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().join("cooper.toml");
    std::fs::write(&path, "constructor = 3\n").unwrap();
    assert!(matches!(
        Host::from_config_file(&path),
        Err(HostError::Settings { .. })
    ));

    let missing = temp.path().join("absent.toml");
    assert!(matches!(
        Host::from_config_file(&missing),
        Err(HostError::Settings { .. })
    ));
}
