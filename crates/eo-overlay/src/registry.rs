//! Page-wide registration of the overlay element type.

use eo_dom::ComponentHost;

/// Public element name of the overlay.
pub const OVERLAY_ID: &str = "vite-error-overlay";

const COMPONENT: &str = "OverlayWidget";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Defined,
    AlreadyDefined,
    /// The host has no element registry (headless).
    Unavailable,
}

impl Registration {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Defined => "defined",
            Self::AlreadyDefined => "already_defined",
            Self::Unavailable => "unavailable",
        }
    }
}

/// Defines the overlay element once per page. Never replaces an existing
/// definition and never fails.
pub fn register_overlay(host: &mut dyn ComponentHost) -> Registration {
    let Some(registry) = host.custom_elements() else {
        tracing::debug!(name = OVERLAY_ID, "no element registry; skipping registration");
        return Registration::Unavailable;
    };

    if registry.get(OVERLAY_ID).is_some() {
        return Registration::AlreadyDefined;
    }

    match registry.define(OVERLAY_ID, COMPONENT) {
        Ok(()) => Registration::Defined,
        Err(error) if error.code == "dom.registry.already_defined" => {
            Registration::AlreadyDefined
        }
        Err(error) => {
            tracing::warn!(%error, name = OVERLAY_ID, "failed to register overlay element");
            Registration::Unavailable
        }
    }
}
