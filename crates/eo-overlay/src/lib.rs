//! Error overlay widget: turns an error descriptor into a dismissible,
//! full-viewport panel with clickable source locations.

pub mod config;
pub mod content;
pub mod descriptor;
pub mod registry;
pub mod template;
pub mod text;
pub mod widget;

pub use crate::config::OverlayConfig;
pub use crate::content::OverlayContent;
pub use crate::descriptor::ErrorDescriptor;
pub use crate::descriptor::ErrorPayload;
pub use crate::descriptor::SourceLocation;
pub use crate::registry::OVERLAY_ID;
pub use crate::registry::Registration;
pub use crate::registry::register_overlay;
pub use crate::template::Region;
pub use crate::widget::OverlayState;
pub use crate::widget::OverlayWidget;
