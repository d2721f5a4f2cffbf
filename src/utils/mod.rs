//! The `utils` module holds the pieces shared by every layer of `pullsub`:
//! the error type and logging setup.

pub mod error;
pub mod logging;

pub use error::{BrokerError, ErrorKind, Result};
