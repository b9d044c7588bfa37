//! Name resolution and TCP connection setup.

use eo_core::OverlayError;
use eo_core::OverlayResult;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::net::ToSocketAddrs;
use std::time::Duration;

/// Resolves `host:port` with the operating system resolver.
pub fn resolve(host: &str, port: u16) -> OverlayResult<Vec<SocketAddr>> {
    let query = format!("{host}:{port}");
    let addresses: Vec<SocketAddr> = query
        .to_socket_addrs()
        .map_err(|error| {
            OverlayError::new(
                "net.dns.resolve_failed",
                format!("failed to resolve `{query}`: {error}"),
            )
        })?
        .collect();

    if addresses.is_empty() {
        return Err(OverlayError::new(
            "net.dns.no_results",
            format!("resolver returned no addresses for `{query}`"),
        ));
    }

    Ok(addresses)
}

/// Connects to the first reachable address, applying `timeout` to the
/// connect and to subsequent reads and writes.
pub fn connect(addresses: &[SocketAddr], timeout: Duration) -> OverlayResult<TcpStream> {
    let mut last_error = None;
    for address in addresses {
        match connect_one(*address, timeout) {
            Ok(stream) => return Ok(stream),
            Err(error) => last_error = Some(error),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        OverlayError::new("net.transport.no_address", "no address to connect to")
    }))
}

fn connect_one(address: SocketAddr, timeout: Duration) -> OverlayResult<TcpStream> {
    let stream = TcpStream::connect_timeout(&address, timeout).map_err(|error| {
        OverlayError::new(
            "net.transport.connect_failed",
            format!("failed to connect to `{address}`: {error}"),
        )
    })?;

    stream.set_read_timeout(Some(timeout)).map_err(|error| {
        OverlayError::new(
            "net.transport.read_timeout_failed",
            format!("failed to set read timeout for `{address}`: {error}"),
        )
    })?;

    stream.set_write_timeout(Some(timeout)).map_err(|error| {
        OverlayError::new(
            "net.transport.write_timeout_failed",
            format!("failed to set write timeout for `{address}`: {error}"),
        )
    })?;

    Ok(stream)
}
