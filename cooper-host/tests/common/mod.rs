#![allow(dead_code)]

use std::sync::Arc;

use cooper_core::{Call, ClassDef, ClassNode, CoopError, Method, Value};
use cooper_host::Host;
use parking_lot::Mutex;

/// Shared record of which levels ran, in order.
#[derive(Clone, Default)]
pub struct Trace(Arc<Mutex<Vec<String>>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.lock())
    }
}

pub fn names(entries: &[&str]) -> Vec<String> {
    entries.iter().map(|e| e.to_string()).collect()
}

/// A body that records `label` and copies the first positional argument into
/// `field`, if a field is given.
pub fn recorder(
    trace: &Trace,
    label: &'static str,
    field: Option<&'static str>,
) -> impl Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static {
    let trace = trace.clone();
    move |call| {
        trace.push(label);
        if let (Some(field), Some(arg)) = (field, call.arg(0).cloned()) {
            call.set(field, arg);
        }
        Ok(Value::Unit)
    }
}

/// A body that records `label` and stores its keyword `name` into `field`.
pub fn keyword_recorder(
    trace: &Trace,
    label: &'static str,
    name: &'static str,
    field: &'static str,
) -> impl Fn(&mut Call<'_>) -> Result<Value, CoopError> + Send + Sync + 'static {
    let trace = trace.clone();
    move |call| {
        trace.push(label);
        let value = call.kw(name).cloned().unwrap_or_default();
        call.set(field, value);
        Ok(Value::Unit)
    }
}

pub struct Hierarchy {
    pub a: Arc<ClassNode>,
    pub b: Arc<ClassNode>,
    pub c: Arc<ClassNode>,
    pub d: Arc<ClassNode>,
    pub f: Arc<ClassNode>,
}

/// The diamond `D(B, C)` over `A`, plus `F(D, A)`.
///
/// Every class cooperates on `init`, `method` (positional `mparam`) and
/// `post_method` (positional `pmparam`). `A` introduces both methods.
pub fn diamond(host: &Host, trace: &Trace) -> Hierarchy {
    let a = host
        .define(
            ClassDef::new("A")
                .method(Method::cooperate("init", recorder(trace, "A", None)))
                .method(
                    Method::cooperative("method", recorder(trace, "A", Some("_a_mparam")))
                        .required("mparam"),
                )
                .method(Method::cooperative("post_method", recorder(trace, "A", None)).required("pmparam")),
        )
        .unwrap();

    let b = host
        .define(
            ClassDef::new("B")
                .base(&a)
                .method(
                    Method::cooperate("init", keyword_recorder(trace, "B", "b_param", "_b_param"))
                        .keyword("b_param", "default_b_param"),
                )
                .method(
                    Method::cooperate(
                        "method",
                        keyword_recorder(trace, "B", "b_mparam", "_b_mparam"),
                    )
                    .required("mparam")
                    .keyword("b_mparam", "default_b_mparam"),
                )
                .method(Method::post_cooperate("post_method", recorder(trace, "B", None)).required("pmparam")),
        )
        .unwrap();

    let c = host
        .define(
            ClassDef::new("C")
                .base(&a)
                .method(Method::cooperate("init", recorder(trace, "C", None)))
                .method(Method::cooperate("method", recorder(trace, "C", None)).required("mparam"))
                .method(Method::post_cooperate("post_method", recorder(trace, "C", None)).required("pmparam")),
        )
        .unwrap();

    let d = host
        .define(
            ClassDef::new("D")
                .base(&b)
                .base(&c)
                .method(
                    Method::cooperate("init", keyword_recorder(trace, "D", "d_param", "_d_param"))
                        .keyword("d_param", "default_d_param"),
                )
                .method(
                    Method::cooperate(
                        "method",
                        keyword_recorder(trace, "D", "d_mparam", "_d_mparam"),
                    )
                    .required("mparam")
                    .keyword("d_mparam", "default_d_mparam"),
                )
                .method(Method::post_cooperate("post_method", recorder(trace, "D", None)).required("pmparam")),
        )
        .unwrap();

    let f = host.define(ClassDef::new("F").base(&d).base(&a)).unwrap();

    Hierarchy { a, b, c, d, f }
}
