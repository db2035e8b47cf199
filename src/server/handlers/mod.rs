//! HTTP handlers.
//!
//! Session endpoints are public. Bucket and object handlers take an
//! [`AuthSession`](super::extract::AuthSession) and so only run for callers
//! holding a live session.

pub mod bucket;
pub mod object;
pub mod session;
