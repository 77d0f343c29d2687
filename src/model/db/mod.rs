//! Store-compatible (e.g. de/serialisable) types.
//!
//! The types in this module are exactly what gets written to the document
//! store. Identifiers are kept alongside by the store, never inside.

pub mod question;
pub mod text;
pub mod user;
