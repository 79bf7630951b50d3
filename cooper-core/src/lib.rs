#![forbid(unsafe_code)]

mod abstracts;
mod chain;
mod class;
mod compose;
mod config;
mod error;
mod kwargs;
mod method;
mod partition;
mod signature;
mod validate;
mod value;

pub use abstracts::check_instantiable;
pub use chain::{Call, InnerCallToken, ResolutionChain};
pub use class::{ClassId, ClassNode, Object, UNIVERSAL_BASE};
pub use compose::{ClassDef, Composer, Linearizer};
pub use config::{ConfigLoadError, CooperConfig};
pub use error::{
    AbstractInstantiationError, ArityError, AttributeError, ConfigReason, ConfigurationError,
    CoopError, LinearizationError, ProtocolViolation, ProtocolViolationError, RaisedError,
    UnrecognizedParameterError,
};
pub use kwargs::Kwargs;
pub use method::{Cooperation, Discipline, Method, MethodBody, MethodDescriptor};
pub use partition::{claim_remaining, extract_own};
pub use signature::{
    Classification, Signature, check_constructor_shape, check_finalizer_shape, classify,
};
pub use value::Value;
