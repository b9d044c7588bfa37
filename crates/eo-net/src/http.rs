//! Minimal HTTP/1.1 request encoding and status-line parsing.

use eo_core::OverlayError;
use eo_core::OverlayResult;
use std::io::Read;
use std::io::Write;

const MAX_STATUS_LINE_BYTES: usize = 8 * 1024;

/// Single HTTP header with validated wire-safe name/value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: &str, value: &str) -> OverlayResult<Self> {
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(OverlayError::new(
                "net.http.header_name_invalid",
                format!("invalid HTTP header name `{name}`"),
            ));
        }

        if value.bytes().any(|byte| matches!(byte, b'\r' | b'\n' | 0)) {
            return Err(OverlayError::new(
                "net.http.header_value_invalid",
                format!("invalid characters found in HTTP header `{name}`"),
            ));
        }

        Ok(Self {
            name: name.to_owned(),
            value: value.to_owned(),
        })
    }
}

/// Body-less `GET` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetRequest {
    pub target: String,
    pub headers: Vec<Header>,
}

impl GetRequest {
    pub fn new(target: &str, host: &str) -> OverlayResult<Self> {
        if !target.starts_with('/') || target.bytes().any(|byte| byte <= b' ') {
            return Err(OverlayError::new(
                "net.http.target_invalid",
                format!("invalid request target `{target}`"),
            ));
        }

        Ok(Self {
            target: target.to_owned(),
            headers: vec![
                Header::new("Host", host)?,
                Header::new("Accept", "*/*")?,
                Header::new("Connection", "close")?,
            ],
        })
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|header| header.name.eq_ignore_ascii_case(name))
            .map(|header| header.value.as_str())
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut encoded = Vec::new();
        encoded.extend_from_slice(b"GET ");
        encoded.extend_from_slice(self.target.as_bytes());
        encoded.extend_from_slice(b" HTTP/1.1\r\n");
        for header in &self.headers {
            encoded.extend_from_slice(header.name.as_bytes());
            encoded.extend_from_slice(b": ");
            encoded.extend_from_slice(header.value.as_bytes());
            encoded.extend_from_slice(b"\r\n");
        }
        encoded.extend_from_slice(b"\r\n");
        encoded
    }
}

pub fn write_request(stream: &mut dyn Write, request: &GetRequest) -> OverlayResult<()> {
    stream.write_all(&request.encode()).map_err(|error| {
        OverlayError::new(
            "net.http.write_failed",
            format!("failed to write HTTP request bytes: {error}"),
        )
    })?;
    stream.flush().map_err(|error| {
        OverlayError::new(
            "net.http.flush_failed",
            format!("failed to flush HTTP request bytes: {error}"),
        )
    })
}

/// Reads the response status code and discards everything after it.
pub fn read_status(stream: &mut dyn Read) -> OverlayResult<u16> {
    let mut line = Vec::new();
    let mut byte = [0_u8; 1];
    while line.len() < MAX_STATUS_LINE_BYTES {
        let read = stream.read(&mut byte).map_err(|error| {
            OverlayError::new(
                "net.http.read_failed",
                format!("failed to read HTTP status line: {error}"),
            )
        })?;
        if read == 0 || byte[0] == b'\n' {
            break;
        }
        line.push(byte[0]);
    }

    let status = parse_status_line(&String::from_utf8_lossy(&line))?;
    // Drain so the server sees an orderly close; the body is never used.
    let _ = std::io::copy(stream, &mut std::io::sink());
    Ok(status)
}

fn parse_status_line(line: &str) -> OverlayResult<u16> {
    let mut parts = line.trim_end().splitn(3, ' ');
    let version = parts.next().unwrap_or_default();
    let code = parts.next().unwrap_or_default();
    if !version.starts_with("HTTP/1.") {
        return Err(OverlayError::new(
            "net.http.status_line_invalid",
            format!("unexpected status line `{line}`"),
        ));
    }

    match code.parse::<u16>() {
        Ok(code) if (100..=599).contains(&code) => Ok(code),
        _ => Err(OverlayError::new(
            "net.http.status_invalid",
            format!("status code must be 100-599, got `{code}`"),
        )),
    }
}

fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric()
        || matches!(
            byte,
            b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_'
                | b'`' | b'|' | b'~'
        )
}
