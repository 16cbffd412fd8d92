//! Core data models

mod credentials;
mod redactor;
mod session;
mod transaction;

pub use credentials::*;
pub use redactor::*;
pub use session::*;
pub use transaction::*;
