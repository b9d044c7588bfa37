//! Event listeners and synchronous dispatch.
//!
//! Dispatch is single-threaded and runs each handler to completion. Handlers
//! receive the document mutably, so they may detach nodes or unregister
//! listeners (including themselves) while an event is in flight.

use crate::document::Document;
use crate::node::NodeId;
use eo_core::OverlayError;
use eo_core::OverlayResult;
use std::fmt;
use std::rc::Rc;

/// Handle returned by listener registration, used for precise removal.
pub type ListenerId = u64;

/// Callback invoked for a dispatched event.
pub type Listener = Rc<dyn Fn(&mut Document, &mut Event)>;

/// Event types the page host dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::KeyDown => "keydown",
        }
    }
}

/// Event travelling along a composed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    kind: EventKind,
    target: NodeId,
    current_target: NodeId,
    key: Option<String>,
    code: Option<String>,
    propagation_stopped: bool,
}

impl Event {
    pub fn click(target: NodeId) -> Self {
        Self {
            kind: EventKind::Click,
            target,
            current_target: target,
            key: None,
            code: None,
            propagation_stopped: false,
        }
    }

    pub fn key_down(target: NodeId, key: &str, code: Option<&str>) -> Self {
        Self {
            kind: EventKind::KeyDown,
            target,
            current_target: target,
            key: Some(key.to_owned()),
            code: code.map(str::to_owned),
            propagation_stopped: false,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn current_target(&self) -> NodeId {
        self.current_target
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// True when either the logical key or the physical code equals `name`.
    pub fn is_key(&self, name: &str) -> bool {
        self.key() == Some(name) || self.code() == Some(name)
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Summary of a finished dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchReport {
    pub listeners_invoked: usize,
    pub propagation_stopped: bool,
}

pub(crate) struct ListenerEntry {
    id: ListenerId,
    target: NodeId,
    kind: EventKind,
    handler: Listener,
}

impl fmt::Debug for ListenerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerEntry")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

impl Document {
    pub fn add_event_listener<F>(
        &mut self,
        target: NodeId,
        kind: EventKind,
        handler: F,
    ) -> OverlayResult<ListenerId>
    where
        F: Fn(&mut Document, &mut Event) + 'static,
    {
        if self.node(target).is_none() {
            return Err(OverlayError::new(
                "dom.node_missing",
                format!("cannot listen for {} on missing node {target}", kind.as_str()),
            ));
        }

        let id = self.next_listener_id;
        self.next_listener_id = self.next_listener_id.saturating_add(1);
        self.listeners.push(ListenerEntry {
            id,
            target,
            kind,
            handler: Rc::new(handler),
        });
        Ok(id)
    }

    /// Unregisters a listener. Returns false when it was already gone.
    pub fn remove_event_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|entry| entry.id != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self, target: NodeId, kind: EventKind) -> usize {
        self.listeners
            .iter()
            .filter(|entry| entry.target == target && entry.kind == kind)
            .count()
    }

    pub fn has_listener(&self, id: ListenerId) -> bool {
        self.listeners.iter().any(|entry| entry.id == id)
    }

    /// Runs the event along the composed path of its target, bubbling from
    /// the target to the document until a handler stops propagation.
    pub fn dispatch_event(&mut self, mut event: Event) -> DispatchReport {
        let mut report = DispatchReport::default();

        for node in self.composed_path(event.target) {
            event.current_target = node;
            let handlers: Vec<(ListenerId, Listener)> = self
                .listeners
                .iter()
                .filter(|entry| entry.target == node && entry.kind == event.kind)
                .map(|entry| (entry.id, Rc::clone(&entry.handler)))
                .collect();

            for (id, handler) in handlers {
                // Listeners removed by an earlier handler in this dispatch are skipped.
                if !self.has_listener(id) {
                    continue;
                }
                handler(self, &mut event);
                report.listeners_invoked += 1;
            }

            if event.propagation_stopped {
                report.propagation_stopped = true;
                break;
            }
        }

        tracing::trace!(
            kind = event.kind.as_str(),
            node = event.target,
            invoked = report.listeners_invoked,
            "dispatched event"
        );
        report
    }

    pub fn click(&mut self, target: NodeId) -> DispatchReport {
        self.dispatch_event(Event::click(target))
    }

    /// Key press delivered at document scope.
    pub fn press_key(&mut self, key: &str, code: Option<&str>) -> DispatchReport {
        let root = self.root();
        self.dispatch_event(Event::key_down(root, key, code))
    }
}

#[cfg(test)]
mod tests {
    use super::EventKind;
    use crate::document::Document;
    use std::cell::Cell;
    use std::rc::Rc;

    fn must<T>(result: eo_core::OverlayResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn click_bubbles_until_stopped() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        must(doc.append_child(doc.body(), outer));
        must(doc.append_child(outer, inner));

        let outer_hits = Rc::new(Cell::new(0));
        let hits = Rc::clone(&outer_hits);
        must(doc.add_event_listener(outer, EventKind::Click, move |_, _| {
            hits.set(hits.get() + 1);
        }));

        doc.click(inner);
        assert_eq!(outer_hits.get(), 1);

        must(doc.add_event_listener(inner, EventKind::Click, |_, event| {
            event.stop_propagation();
        }));
        let report = doc.click(inner);
        assert!(report.propagation_stopped);
        assert_eq!(outer_hits.get(), 1);
    }

    #[test]
    fn removed_listener_is_not_invoked() {
        let mut doc = Document::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let id = must(doc.add_event_listener(doc.root(), EventKind::KeyDown, move |_, _| {
            counter.set(counter.get() + 1);
        }));

        doc.press_key("Escape", None);
        assert!(doc.remove_event_listener(id));
        assert!(!doc.remove_event_listener(id));
        doc.press_key("Escape", None);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handler_may_unregister_a_later_listener() {
        let mut doc = Document::new();
        let root = doc.root();
        let hits = Rc::new(Cell::new(0));
        let later_id = Rc::new(Cell::new(0));

        let pending = Rc::clone(&later_id);
        must(doc.add_event_listener(root, EventKind::KeyDown, move |doc, _| {
            doc.remove_event_listener(pending.get());
        }));
        let counter = Rc::clone(&hits);
        later_id.set(must(doc.add_event_listener(root, EventKind::KeyDown, move |_, _| {
            counter.set(counter.get() + 1);
        })));

        let report = doc.press_key("a", Some("KeyA"));
        assert_eq!(report.listeners_invoked, 1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn key_matches_key_or_code() {
        let event = super::Event::key_down(1, "Esc", Some("Escape"));
        assert!(event.is_key("Escape"));
        assert!(!event.is_key("Enter"));
    }
}
