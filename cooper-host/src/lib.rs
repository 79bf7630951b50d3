#![forbid(unsafe_code)]

mod error;
mod logging;
mod mro;
mod registry;

pub use error::HostError;
pub use logging::{LOG_ENV, init_logging};
pub use mro::{C3Linearizer, c3_linearize};
pub use registry::Host;
