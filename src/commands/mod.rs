//! Command handlers
//!
//! Entry points a host shell calls into. They take shared state, lock it and
//! report failures as plain strings.

pub mod session;
