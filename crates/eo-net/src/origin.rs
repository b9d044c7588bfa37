//! Dev-server origin parsing.

use eo_core::OverlayError;
use eo_core::OverlayResult;
use url::Url;

/// Origin of the dev server that receives editor requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOrigin {
    host: String,
    port: u16,
}

impl ServerOrigin {
    /// Accepts `http://host[:port][/...]`. Any path, query or fragment is
    /// ignored; editor requests carry their own path.
    pub fn parse(input: &str) -> OverlayResult<Self> {
        let parsed = Url::parse(input).map_err(|error| {
            OverlayError::new(
                "net.url.invalid",
                format!("failed to parse server origin `{input}`: {error}"),
            )
        })?;

        if parsed.scheme() != "http" {
            return Err(OverlayError::new(
                "net.url.scheme_unsupported",
                format!(
                    "editor requests are sent over plain http, got `{}`",
                    parsed.scheme()
                ),
            ));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(OverlayError::new(
                "net.url.credentials_disallowed",
                "URL userinfo (`username:password@`) is not allowed",
            ));
        }

        let host = parsed
            .host_str()
            .ok_or_else(|| OverlayError::new("net.url.host_missing", "URL must include a host"))?
            .to_ascii_lowercase();

        let port = parsed.port_or_known_default().ok_or_else(|| {
            OverlayError::new(
                "net.url.port_missing",
                "unable to determine effective port for URL",
            )
        })?;

        Ok(Self { host, port })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Value for the `Host` header.
    pub fn authority(&self) -> String {
        if self.port == 80 {
            self.host.clone()
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServerOrigin;

    fn parse(input: &str) -> ServerOrigin {
        match ServerOrigin::parse(input) {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn parses_dev_server_origin() {
        let origin = parse("http://LocalHost:5173/app/");
        assert_eq!(origin.host(), "localhost");
        assert_eq!(origin.port(), 5173);
        assert_eq!(origin.authority(), "localhost:5173");
    }

    #[test]
    fn default_port_is_omitted_from_authority() {
        assert_eq!(parse("http://127.0.0.1/").authority(), "127.0.0.1");
    }

    #[test]
    fn rejects_tls_and_credentials() {
        let error = match ServerOrigin::parse("https://localhost:5173") {
            Ok(_) => panic!("https must be rejected"),
            Err(error) => error,
        };
        assert_eq!(error.code, "net.url.scheme_unsupported");
        assert!(ServerOrigin::parse("http://user:pw@localhost/").is_err());
        assert!(ServerOrigin::parse("not a url").is_err());
    }
}
