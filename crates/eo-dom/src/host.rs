//! Capabilities a visual component probes for at construction time.

use crate::document::Document;
use crate::registry::CustomElementRegistry;

/// Environment a component is constructed in. A real page hands out its
/// document; environments without one answer `None` and the component
/// degrades to an inert value.
pub trait ComponentHost {
    fn document(&mut self) -> Option<&mut Document>;

    fn custom_elements(&mut self) -> Option<&mut CustomElementRegistry> {
        self.document().map(Document::custom_elements_mut)
    }
}

impl ComponentHost for Document {
    fn document(&mut self) -> Option<&mut Document> {
        Some(self)
    }
}

/// A page that may or may not have been set up.
impl ComponentHost for Option<Document> {
    fn document(&mut self) -> Option<&mut Document> {
        self.as_mut()
    }
}

/// Host for non-page contexts (tests, server-side tooling).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessHost;

impl ComponentHost for HeadlessHost {
    fn document(&mut self) -> Option<&mut Document> {
        None
    }
}
