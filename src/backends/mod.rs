//! Storage client implementations.

#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "s3")]
pub mod s3;
