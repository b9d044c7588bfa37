//! Editor-open requests: URL construction and fire-and-forget delivery.

pub mod http;
pub mod origin;
pub mod transport;

use crate::http::GetRequest;
use crate::origin::ServerOrigin;
use eo_core::OverlayResult;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use std::thread;
use std::time::Duration;

pub use crate::http::Header;

/// Endpoint the dev server exposes for opening a file in the editor.
pub const EDITOR_ENDPOINT: &str = "__open-in-editor";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`, as `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Path prefix the dev server is mounted under. Empty means `/`, and a
/// missing trailing slash is added.
pub fn normalize_base(base: &str) -> String {
    let base = base.trim();
    if base.is_empty() {
        return "/".to_owned();
    }
    if base.ends_with('/') {
        base.to_owned()
    } else {
        format!("{base}/")
    }
}

/// A request to open `file` in the developer's editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorRequest {
    file: String,
    target: String,
}

impl EditorRequest {
    /// Builds `<base>__open-in-editor?file=<percent-encoded file>`.
    pub fn new(base: &str, file: &str) -> Self {
        let encoded = utf8_percent_encode(file, URI_COMPONENT);

        Self {
            file: file.to_owned(),
            target: format!("{}{EDITOR_ENDPOINT}?file={encoded}", normalize_base(base)),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    /// Request path plus query, relative to the page origin.
    pub fn target(&self) -> &str {
        &self.target
    }
}

/// Sink for editor requests. Implementations return immediately and never
/// report failure to the caller.
pub trait EditorLauncher {
    fn launch(&self, request: EditorRequest);
}

/// Drops every request. Used when no dev server is reachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLauncher;

impl EditorLauncher for NoopLauncher {
    fn launch(&self, request: EditorRequest) {
        tracing::debug!(target_path = request.target(), "editor request dropped");
    }
}

/// Sends each request to the dev server on a detached thread.
#[derive(Debug, Clone)]
pub struct HttpEditorLauncher {
    origin: ServerOrigin,
    timeout: Duration,
}

impl HttpEditorLauncher {
    pub fn new(origin: ServerOrigin) -> Self {
        Self {
            origin,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl EditorLauncher for HttpEditorLauncher {
    fn launch(&self, request: EditorRequest) {
        let origin = self.origin.clone();
        let timeout = self.timeout;
        let spawned = thread::Builder::new()
            .name("open-in-editor".to_owned())
            .spawn(move || match deliver(&origin, &request, timeout) {
                Ok(status) => tracing::debug!(
                    status,
                    file = request.file(),
                    "editor request delivered"
                ),
                Err(error) => tracing::debug!(
                    %error,
                    file = request.file(),
                    "editor request failed"
                ),
            });

        if let Err(error) = spawned {
            tracing::debug!(%error, "failed to spawn editor request thread");
        }
    }
}

/// Performs one blocking request and returns the response status.
pub fn deliver(
    origin: &ServerOrigin,
    request: &EditorRequest,
    timeout: Duration,
) -> OverlayResult<u16> {
    let addresses = transport::resolve(origin.host(), origin.port())?;
    let mut stream = transport::connect(&addresses, timeout)?;
    let get = GetRequest::new(request.target(), &origin.authority())?;
    http::write_request(&mut stream, &get)?;
    http::read_status(&mut stream)
}

#[cfg(test)]
mod tests {
    use super::EditorLauncher;
    use super::EditorRequest;
    use super::HttpEditorLauncher;
    use super::deliver;
    use super::normalize_base;
    use super::origin::ServerOrigin;
    use std::io::Read;
    use std::io::Write;
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn encodes_posix_and_windows_paths() {
        let request = EditorRequest::new("/", "/src/app.ts");
        assert_eq!(request.target(), "/__open-in-editor?file=%2Fsrc%2Fapp.ts");
        assert_eq!(request.file(), "/src/app.ts");

        let request = EditorRequest::new("/", r"C:\proj\main.ts");
        assert_eq!(
            request.target(),
            "/__open-in-editor?file=C%3A%5Cproj%5Cmain.ts"
        );
    }

    #[test]
    fn keeps_uri_component_safe_characters() {
        let request = EditorRequest::new("/", "/my app/a(1).ts");
        assert_eq!(
            request.target(),
            "/__open-in-editor?file=%2Fmy%20app%2Fa(1).ts"
        );

        let request = EditorRequest::new("/", "/src/it's~*!/a+b&c=d#e?.ts");
        assert_eq!(
            request.target(),
            "/__open-in-editor?file=%2Fsrc%2Fit's~*!%2Fa%2Bb%26c%3Dd%23e%3F.ts"
        );

        let request = EditorRequest::new("/", "/src/caf\u{e9}.ts");
        assert_eq!(request.target(), "/__open-in-editor?file=%2Fsrc%2Fcaf%C3%A9.ts");
    }

    #[test]
    fn applies_base_prefix() {
        let request = EditorRequest::new("/app/", "/a.ts");
        assert_eq!(request.target(), "/app/__open-in-editor?file=%2Fa.ts");
        assert_eq!(normalize_base(""), "/");
        assert_eq!(normalize_base("/app"), "/app/");
    }

    fn local_server() -> (TcpListener, ServerOrigin) {
        let listener = match TcpListener::bind("127.0.0.1:0") {
            Ok(listener) => listener,
            Err(error) => panic!("bind failed: {error}"),
        };
        let port = match listener.local_addr() {
            Ok(address) => address.port(),
            Err(error) => panic!("{error}"),
        };
        let origin = match ServerOrigin::parse(&format!("http://127.0.0.1:{port}")) {
            Ok(origin) => origin,
            Err(error) => panic!("{error}"),
        };
        (listener, origin)
    }

    fn accept_one(listener: TcpListener) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0_u8; 1024];
                let read = stream.read(&mut buf).unwrap_or(0);
                let _ = tx.send(String::from_utf8_lossy(&buf[..read]).into_owned());
                let _ = stream.write_all(b"HTTP/1.1 204 No Content\r\n\r\n");
            }
        });
        rx
    }

    #[test]
    fn delivers_request_to_dev_server() {
        let (listener, origin) = local_server();
        let received = accept_one(listener);

        let request = EditorRequest::new("/", "/src/app.ts");
        let status = deliver(&origin, &request, Duration::from_secs(5));
        assert_eq!(status.ok(), Some(204));

        let head = match received.recv_timeout(Duration::from_secs(5)) {
            Ok(head) => head,
            Err(error) => panic!("{error}"),
        };
        assert!(head.starts_with("GET /__open-in-editor?file=%2Fsrc%2Fapp.ts HTTP/1.1\r\n"));
    }

    #[test]
    fn launch_returns_before_delivery() {
        let (listener, origin) = local_server();
        let received = accept_one(listener);

        let launcher = HttpEditorLauncher::new(origin).with_timeout(Duration::from_secs(5));
        launcher.launch(EditorRequest::new("/", "/c/d.ts"));

        let head = match received.recv_timeout(Duration::from_secs(5)) {
            Ok(head) => head,
            Err(error) => panic!("{error}"),
        };
        assert!(head.contains("file=%2Fc%2Fd.ts"));
    }

    #[test]
    fn unreachable_server_is_reported_not_panicked() {
        let (listener, origin) = local_server();
        drop(listener);
        let request = EditorRequest::new("/", "/a.ts");
        let result = deliver(&origin, &request, Duration::from_millis(500));
        assert!(result.is_err());
    }
}
