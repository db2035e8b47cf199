//! Bucket and object data structures returned by storage clients.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A bucket visible to the connected credentials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bucket {
    /// Bucket name
    pub name: String,

    /// Creation timestamp as reported by the service (RFC 3339)
    pub creation_date: String,
}

/// An object listed from a bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size: i64,

    /// Entity tag, quoted as returned by S3
    pub etag: String,

    /// Storage class (e.g. "STANDARD")
    pub storage_class: String,
}

/// A fetched object body with its metadata.
#[derive(Debug, Clone)]
pub struct ObjectData {
    /// Raw object bytes
    pub body: Bytes,

    /// Content type stored with the object, if any
    pub content_type: Option<String>,

    /// Content length reported by the service
    pub content_length: Option<i64>,
}

/// Guesses a content type from the key's extension.
///
/// Falls back to `application/octet-stream` for unknown or missing extensions.
///
/// # Example
///
/// ```
/// use s3browser::item::guess_content_type;
///
/// assert_eq!(guess_content_type("photos/cat.PNG"), "image/png");
/// assert_eq!(guess_content_type("README"), "application/octet-stream");
/// ```
pub fn guess_content_type(key: &str) -> String {
    mime_guess::from_path(key.to_ascii_lowercase())
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}
