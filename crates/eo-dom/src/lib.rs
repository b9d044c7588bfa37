//! In-memory page host: DOM arena, shadow roots, event dispatch and the
//! custom element registry.

mod document;
mod events;
mod host;
mod node;
mod registry;

pub use document::Document;
pub use events::DispatchReport;
pub use events::Event;
pub use events::EventKind;
pub use events::Listener;
pub use events::ListenerId;
pub use host::ComponentHost;
pub use host::HeadlessHost;
pub use node::ElementData;
pub use node::Node;
pub use node::NodeId;
pub use node::NodeKind;
pub use node::ShadowRootMode;
pub use registry::CustomElementRegistry;
pub use registry::ElementDefinition;
