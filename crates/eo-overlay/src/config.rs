//! Overlay options, overridable from the process environment.

use eo_net::EditorLauncher;
use eo_net::HttpEditorLauncher;
use eo_net::NoopLauncher;
use eo_net::origin::ServerOrigin;
use std::rc::Rc;

pub const ENV_BASE: &str = "OVERLAY_BASE";
pub const ENV_LINKS: &str = "OVERLAY_LINKS";
pub const ENV_SERVER_ORIGIN: &str = "OVERLAY_SERVER_ORIGIN";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayConfig {
    /// Path prefix the dev server is mounted under.
    pub base: String,
    /// Whether file references become activatable links.
    pub links: bool,
    /// `http://host:port` of the dev server receiving editor requests.
    pub server_origin: Option<String>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            base: "/".to_owned(),
            links: true,
            server_origin: None,
        }
    }
}

impl OverlayConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup(ENV_BASE).filter(|base| !base.trim().is_empty()) {
            config.base = eo_net::normalize_base(&base);
        }
        if let Some(links) = lookup(ENV_LINKS) {
            config.links = parse_switch(&links);
        }
        config.server_origin = lookup(ENV_SERVER_ORIGIN)
            .map(|origin| origin.trim().to_owned())
            .filter(|origin| !origin.is_empty());

        config
    }

    /// Launcher for link activations: HTTP delivery when a valid server
    /// origin is configured, otherwise requests are dropped.
    pub fn launcher(&self) -> Rc<dyn EditorLauncher> {
        let Some(raw) = self.server_origin.as_deref() else {
            return Rc::new(NoopLauncher);
        };

        match ServerOrigin::parse(raw) {
            Ok(origin) => Rc::new(HttpEditorLauncher::new(origin)),
            Err(error) => {
                tracing::warn!(%error, origin = raw, "ignoring invalid dev server origin");
                Rc::new(NoopLauncher)
            }
        }
    }
}

fn parse_switch(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "false" | "0" | "off" | "no"
    )
}

#[cfg(test)]
mod tests {
    use super::OverlayConfig;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_enable_links_at_root() {
        let config = OverlayConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.base, "/");
        assert!(config.links);
        assert!(config.server_origin.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = OverlayConfig::from_lookup(lookup_from(&[
            ("OVERLAY_BASE", "/app"),
            ("OVERLAY_LINKS", "Off"),
            ("OVERLAY_SERVER_ORIGIN", " http://localhost:5173 "),
        ]));
        assert_eq!(config.base, "/app/");
        assert!(!config.links);
        assert_eq!(config.server_origin.as_deref(), Some("http://localhost:5173"));
    }

    #[test]
    fn unknown_switch_values_keep_links_on() {
        let config = OverlayConfig::from_lookup(lookup_from(&[("OVERLAY_LINKS", "yes")]));
        assert!(config.links);
        let config = OverlayConfig::from_lookup(lookup_from(&[("OVERLAY_LINKS", "0")]));
        assert!(!config.links);
    }
}
