//! # oget – core
//!
//! Types shared by every stage of the mailbox pipeline:
//!   • `ConnectionTarget` / `Credentials` produced by configuration
//!   • `OgetError`, tagged with the `Stage` that produced it

pub mod error;
pub mod types;

pub use error::{OgetError, OgetErrorKind, OgetResult, Stage};
pub use types::{ConnectionTarget, Credentials};
