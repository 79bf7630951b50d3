use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::method::Discipline;

/// Root of everything the protocol reports.
///
/// Composition-time defects arrive as [`ConfigurationError`]; the remaining
/// variants surface synchronously to the caller of the offending method.
#[derive(Debug, Error, Diagnostic)]
pub enum CoopError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ProtocolViolation(#[from] ProtocolViolationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    UnrecognizedParameter(#[from] UnrecognizedParameterError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    AbstractInstantiation(#[from] AbstractInstantiationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Arity(#[from] ArityError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Attribute(#[from] AttributeError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Raised(#[from] RaisedError),
}

impl CoopError {
    /// Failure raised by a method body.
    pub fn raise(message: impl Into<String>) -> Self {
        CoopError::Raised(RaisedError {
            message: message.into(),
        })
    }

    pub fn configuration(&self) -> Option<&ConfigurationError> {
        match self {
            CoopError::Configuration(e) => Some(e),
            _ => None,
        }
    }

    pub fn protocol_violation(&self) -> Option<&ProtocolViolationError> {
        match self {
            CoopError::ProtocolViolation(e) => Some(e),
            _ => None,
        }
    }

    pub fn unrecognized(&self) -> Option<&UnrecognizedParameterError> {
        match self {
            CoopError::UnrecognizedParameter(e) => Some(e),
            _ => None,
        }
    }

    pub fn abstract_instantiation(&self) -> Option<&AbstractInstantiationError> {
        match self {
            CoopError::AbstractInstantiation(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("class `{class}`: {reason}")]
#[diagnostic(code(cooper::configuration))]
pub struct ConfigurationError {
    pub class: String,
    pub reason: ConfigReason,
}

impl ConfigurationError {
    pub fn new(class: impl Into<String>, reason: ConfigReason) -> Self {
        Self {
            class: class.into(),
            reason,
        }
    }

    /// Stable reason string, e.g. `conflicting-root`.
    pub fn reason_code(&self) -> &'static str {
        self.reason.code()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigReason {
    BadConstructorShape { detail: String },
    BadFinalizerShape { detail: String },
    ConstructorMustCooperate,
    FinalizerMustCooperate,
    ConstructorDiscipline { discipline: Discipline },
    OverrideWithoutCooperation { method: String },
    CooperativeOverrides { method: String },
    ConflictingRoot { method: String, roots: Vec<String> },
    NonCooperativeMultipleInheritance { bases: Vec<String> },
    FixedParamsUnsupported { method: String },
    DuplicateMethod { method: String },
    InconsistentHierarchy { detail: String },
}

impl ConfigReason {
    pub fn code(&self) -> &'static str {
        match self {
            ConfigReason::BadConstructorShape { .. } => "bad-constructor-shape",
            ConfigReason::BadFinalizerShape { .. } => "bad-finalizer-shape",
            ConfigReason::ConstructorMustCooperate => "constructor-must-cooperate",
            ConfigReason::FinalizerMustCooperate => "finalizer-must-cooperate",
            ConfigReason::ConstructorDiscipline { .. } => "constructor-discipline",
            ConfigReason::OverrideWithoutCooperation { .. } => "override-without-cooperation",
            ConfigReason::CooperativeOverrides { .. } => "cooperative-overrides",
            ConfigReason::ConflictingRoot { .. } => "conflicting-root",
            ConfigReason::NonCooperativeMultipleInheritance { .. } => {
                "non-cooperative-multiple-inheritance"
            }
            ConfigReason::FixedParamsUnsupported { .. } => "fixed-params-unsupported",
            ConfigReason::DuplicateMethod { .. } => "duplicate-method",
            ConfigReason::InconsistentHierarchy { .. } => "inconsistent-hierarchy",
        }
    }
}

impl fmt::Display for ConfigReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.code())?;
        match self {
            ConfigReason::BadConstructorShape { detail } => {
                write!(f, "constructor {detail}")
            }
            ConfigReason::BadFinalizerShape { detail } => write!(f, "finalizer {detail}"),
            ConfigReason::ConstructorMustCooperate => {
                f.write_str("constructor should cooperate in a cooperative class")
            }
            ConfigReason::FinalizerMustCooperate => {
                f.write_str("finalizer should cooperate in a cooperative class")
            }
            ConfigReason::ConstructorDiscipline { discipline } => {
                write!(f, "constructor cannot use {discipline} cooperation")
            }
            ConfigReason::OverrideWithoutCooperation { method } => {
                write!(f, "`{method}` overrides a cooperative method without cooperating")
            }
            ConfigReason::CooperativeOverrides { method } => {
                write!(f, "`{method}` introduces a cooperative method but overrides an existing one")
            }
            ConfigReason::ConflictingRoot { method, roots } => write!(
                f,
                "`{method}` has conflicting declarations in {}",
                roots.join(", ")
            ),
            ConfigReason::NonCooperativeMultipleInheritance { bases } => write!(
                f,
                "can not multiple-inherit non cooperative {}",
                bases.join(", ")
            ),
            ConfigReason::FixedParamsUnsupported { method } => write!(
                f,
                "`{method}` fixes keyword parameters but does not use pre or post cooperation"
            ),
            ConfigReason::DuplicateMethod { method } => {
                write!(f, "`{method}` is declared more than once")
            }
            ConfigReason::InconsistentHierarchy { detail } => f.write_str(detail),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("`{owner}.{method}`: {kind}")]
#[diagnostic(code(cooper::protocol))]
pub struct ProtocolViolationError {
    pub owner: String,
    pub method: String,
    pub kind: ProtocolViolation,
}

impl ProtocolViolationError {
    pub fn reason_code(&self) -> &'static str {
        self.kind.code()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProtocolViolation {
    /// The inner continuation ran `calls` times instead of exactly once.
    InnerCallCount { calls: u32 },
    NoNextImplementation,
}

impl ProtocolViolation {
    pub fn code(&self) -> &'static str {
        match self {
            ProtocolViolation::InnerCallCount { .. } => "inner-call-count",
            ProtocolViolation::NoNextImplementation => "no-next-implementation",
        }
    }
}

impl fmt::Display for ProtocolViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolViolation::InnerCallCount { calls } => write!(
                f,
                "inner-call-count: next method must be called exactly once (called {calls} times)"
            ),
            ProtocolViolation::NoNextImplementation => {
                f.write_str("no-next-implementation: nothing further in the chain to call")
            }
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
#[error("`{owner}.{method}` got unexpected keyword arguments: {}", .keys.join(", "))]
#[diagnostic(code(cooper::unrecognized_parameter))]
pub struct UnrecognizedParameterError {
    pub owner: String,
    pub method: String,
    pub keys: Vec<String>,
}

#[derive(Debug, Error, Diagnostic)]
#[error("can't instantiate abstract class `{class}` with abstract methods {}", .missing.join(", "))]
#[diagnostic(code(cooper::abstract_instantiation))]
pub struct AbstractInstantiationError {
    pub class: String,
    pub missing: Vec<String>,
}

#[derive(Debug, Error, Diagnostic)]
#[error("`{owner}.{method}` takes {expected} positional arguments but {got} were given")]
#[diagnostic(code(cooper::arity))]
pub struct ArityError {
    pub owner: String,
    pub method: String,
    /// Rendered as "2" or "at least 2".
    pub expected: String,
    pub got: usize,
}

#[derive(Debug, Error, Diagnostic)]
#[error("`{class}` has no method `{method}`")]
#[diagnostic(code(cooper::attribute))]
pub struct AttributeError {
    pub class: String,
    pub method: String,
}

#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(cooper::raised))]
pub struct RaisedError {
    pub message: String,
}

/// Reported by a host [`crate::Linearizer`] that cannot order a set of bases.
#[derive(Debug, Error, Diagnostic)]
#[error("linearization error: {message}")]
#[diagnostic(code(cooper::linearization))]
pub struct LinearizationError {
    pub message: String,
}

impl LinearizationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
