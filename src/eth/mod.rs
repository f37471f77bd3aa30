//! Chain data types shared by the tracker and its collaborators.

mod header;
mod log;
mod selector;

pub use header::BlockHeader;
pub use log::{EventLog, LogError, UntrustedBytes};
pub use selector::{FUNCTION_SELECTOR_LENGTH, FunctionSelector, SelectorError};
