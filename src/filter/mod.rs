//! Token admission
//!
//! [`admission`] holds the static safety filter; [`matcher`] the operator's
//! optional name and creator selection.

pub mod admission;
pub mod matcher;

pub use admission::{evaluate, passes, FilterReason, FilterResult};
pub use matcher::TokenMatcher;
