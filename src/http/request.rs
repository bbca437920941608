//! Decoded requests handed to handlers.
//!
//! # Design Decisions
//! - Owned data: a request outlives the read buffer it was parsed from,
//!   so handlers may hold it across suspension points
//! - Header order and duplicates are preserved as received

use bytes::Bytes;

/// A single header, value kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: Vec<u8>,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Case-insensitive name comparison.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}

/// A complete request with its body already delimited by `Content-Length`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub headers: Vec<Header>,
    pub body: Bytes,
}

impl Request {
    /// First header value with the given name.
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|h| h.is(name))
            .map(|h| h.value.as_slice())
    }
}
