//! Incremental HTTP/1.1 request parser.
//!
//! `parse_request` looks at the start of a byte window and decodes the next
//! request head. It performs no I/O and keeps no state, so the pipeline can
//! call it again on the same buffer after advancing past a request.
//!
//! Bodies are framed only by `Content-Length`; the parser reports where the
//! head ends and how long the body is, and the caller slices the body.

use bytes::Bytes;
use thiserror::Error;

use crate::http::request::{Header, Request};

/// Maximum number of headers accepted in one request.
pub const MAX_HEADERS: usize = 64;

/// Malformed request bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed request head: {0}")]
    Syntax(#[from] httparse::Error),
    #[error("header value is not valid UTF-8: {0}")]
    Encoding(String),
    #[error("invalid Content-Length {0:?}")]
    ContentLength(String),
    #[error("conflicting Content-Length headers")]
    ConflictingContentLength,
    #[error("Transfer-Encoding is not supported")]
    TransferEncoding,
}

/// Outcome of a parse attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseStatus {
    /// A full request head was found.
    Complete(ParsedRequest),
    /// The head is not complete yet; wait for more bytes.
    Incomplete,
}

/// A decoded request head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<Header>,
    /// Declared body length, `-1` when the header is absent.
    pub content_length: i64,
    /// Offset of the first body byte, relative to the parsed window.
    pub header_len: usize,
}

impl ParsedRequest {
    /// Body length in bytes; an absent `Content-Length` means no body.
    pub fn body_len(&self) -> usize {
        usize::try_from(self.content_length).unwrap_or(0)
    }

    /// Total bytes this request occupies in the window.
    pub fn frame_len(&self) -> usize {
        self.header_len.saturating_add(self.body_len())
    }

    pub fn into_request(self, body: Bytes) -> Request {
        Request {
            method: self.method,
            path: self.path,
            headers: self.headers,
            body,
        }
    }
}

/// Parse the request head at the start of `window`.
pub fn parse_request(window: &[u8]) -> Result<ParseStatus, ParseError> {
    let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
    let mut req = httparse::Request::new(&mut slots);

    let header_len = match req.parse(window)? {
        httparse::Status::Complete(n) => n,
        httparse::Status::Partial => return Ok(ParseStatus::Incomplete),
    };

    // Both are always set on a complete parse.
    let method = req.method.unwrap_or_default().to_string();
    let path = req.path.unwrap_or_default().to_string();

    let mut content_length: i64 = -1;
    let mut headers = Vec::with_capacity(req.headers.len());
    for h in req.headers.iter() {
        if h.name.eq_ignore_ascii_case("transfer-encoding") {
            return Err(ParseError::TransferEncoding);
        }
        if h.name.eq_ignore_ascii_case("content-length") {
            let declared = parse_content_length(h.value)?;
            if content_length >= 0 && content_length != declared {
                return Err(ParseError::ConflictingContentLength);
            }
            content_length = declared;
        }
        headers.push(Header::new(h.name, h.value));
    }

    Ok(ParseStatus::Complete(ParsedRequest {
        method,
        path,
        headers,
        content_length,
        header_len,
    }))
}

fn parse_content_length(value: &[u8]) -> Result<i64, ParseError> {
    let text = std::str::from_utf8(value)
        .map_err(|_| ParseError::Encoding(String::from_utf8_lossy(value).into_owned()))?
        .trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::ContentLength(text.to_string()));
    }
    text.parse::<i64>()
        .map_err(|_| ParseError::ContentLength(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete(bytes: &[u8]) -> ParsedRequest {
        match parse_request(bytes).unwrap() {
            ParseStatus::Complete(parsed) => parsed,
            ParseStatus::Incomplete => panic!("expected a complete head"),
        }
    }

    #[test]
    fn parses_request_without_body() {
        let raw = b"GET /hello HTTP/1.1\r\nHost: localhost\r\nAccept: */*\r\n\r\n";
        let parsed = complete(raw);
        assert_eq!(parsed.method, "GET");
        assert_eq!(parsed.path, "/hello");
        assert_eq!(parsed.content_length, -1);
        assert_eq!(parsed.body_len(), 0);
        assert_eq!(parsed.header_len, raw.len());
        assert_eq!(parsed.headers[0], Header::new("Host", "localhost"));
    }

    #[test]
    fn reports_body_offset_and_length() {
        let raw = b"POST /clientes/1/transacoes HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";
        let parsed = complete(raw);
        assert_eq!(parsed.content_length, 5);
        assert_eq!(&raw[parsed.header_len..parsed.frame_len()], b"hello");
    }

    #[test]
    fn partial_head_is_incomplete() {
        assert_eq!(
            parse_request(b"GET /hello HTTP/1.1\r\nHost: loc").unwrap(),
            ParseStatus::Incomplete
        );
        assert_eq!(parse_request(b"").unwrap(), ParseStatus::Incomplete);
    }

    #[test]
    fn stops_at_first_request_of_a_pipeline() {
        let first = b"GET /hello HTTP/1.1\r\n\r\n";
        let mut raw = first.to_vec();
        raw.extend_from_slice(b"GET /clientes HTTP/1.1\r\n\r\n");

        let parsed = complete(&raw);
        assert_eq!(parsed.path, "/hello");
        assert_eq!(parsed.frame_len(), first.len());

        let next = complete(&raw[parsed.frame_len()..]);
        assert_eq!(next.path, "/clientes");
    }

    #[test]
    fn keeps_duplicate_headers_in_order() {
        let parsed = complete(b"GET / HTTP/1.1\r\nX-A: 1\r\nX-B: 2\r\nX-A: 3\r\n\r\n");
        let names: Vec<_> = parsed.headers.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["X-A", "X-B", "X-A"]);
        assert_eq!(parsed.headers[2].value, b"3");
    }

    #[test]
    fn malformed_start_line_is_an_error() {
        assert!(matches!(
            parse_request(b"GET /hello NOPE\r\n\r\n"),
            Err(ParseError::Syntax(_))
        ));
        assert!(parse_request(b"\x01\x02garbage\r\n\r\n").is_err());
    }

    #[test]
    fn rejects_bad_content_length() {
        assert_eq!(
            parse_request(b"POST / HTTP/1.1\r\nContent-Length: -4\r\n\r\n"),
            Err(ParseError::ContentLength("-4".into()))
        );
        assert_eq!(
            parse_request(b"POST / HTTP/1.1\r\nContent-Length: 2\r\nContent-Length: 3\r\n\r\n"),
            Err(ParseError::ConflictingContentLength)
        );
    }

    #[test]
    fn repeated_equal_content_length_is_accepted() {
        let parsed = complete(b"POST / HTTP/1.1\r\nContent-Length: 2\r\ncontent-length: 2\r\n\r\nok");
        assert_eq!(parsed.content_length, 2);
    }

    fn with_headers(count: usize) -> Vec<u8> {
        let mut raw = b"GET / HTTP/1.1\r\n".to_vec();
        for i in 0..count {
            raw.extend_from_slice(format!("X-H{}: v\r\n", i).as_bytes());
        }
        raw.extend_from_slice(b"\r\n");
        raw
    }

    #[test]
    fn header_count_is_capped() {
        assert_eq!(complete(&with_headers(MAX_HEADERS)).headers.len(), MAX_HEADERS);
        assert!(matches!(
            parse_request(&with_headers(MAX_HEADERS + 1)),
            Err(ParseError::Syntax(httparse::Error::TooManyHeaders))
        ));
    }

    #[test]
    fn rejects_transfer_encoding() {
        assert_eq!(
            parse_request(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n"),
            Err(ParseError::TransferEncoding)
        );
    }
}
