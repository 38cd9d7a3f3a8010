//! Helpers for unit tests.

#[macro_use]
pub(crate) mod io;
