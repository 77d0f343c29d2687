//! API-friendly request and response bodies.

pub mod question;
pub mod response;
pub mod text;
pub mod user;
