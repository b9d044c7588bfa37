//! Document arena: tree mutation, shadow roots and selector queries.

use crate::events::ListenerEntry;
use crate::events::ListenerId;
use crate::node::ElementData;
use crate::node::Node;
use crate::node::NodeId;
use crate::node::NodeKind;
use crate::node::ShadowRootMode;
use crate::registry::CustomElementRegistry;
use eo_core::OverlayError;
use eo_core::OverlayResult;
use std::collections::BTreeMap;

const DOCUMENT_NODE: NodeId = 1;

/// In-memory page: node arena, document-level listener registry and the
/// custom element registry.
#[derive(Debug)]
pub struct Document {
    nodes: BTreeMap<NodeId, Node>,
    next_id: NodeId,
    body: NodeId,
    pub(crate) listeners: Vec<ListenerEntry>,
    pub(crate) next_listener_id: ListenerId,
    custom_elements: CustomElementRegistry,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut document = Self {
            nodes: BTreeMap::new(),
            next_id: DOCUMENT_NODE,
            body: 0,
            listeners: Vec::new(),
            next_listener_id: 1,
            custom_elements: CustomElementRegistry::default(),
        };

        let root = document.insert(Node::new(NodeKind::Document));
        let body = document.insert(Node::new(NodeKind::Element(ElementData::new("body"))));
        document.link(root, body);
        document.body = body;
        document
    }

    pub fn root(&self) -> NodeId {
        DOCUMENT_NODE
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn custom_elements(&self) -> &CustomElementRegistry {
        &self.custom_elements
    }

    pub fn custom_elements_mut(&mut self) -> &mut CustomElementRegistry {
        &mut self.custom_elements
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        self.nodes.get(&id).and_then(Node::element)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or_default()
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.insert(Node::new(NodeKind::Element(ElementData::new(tag))))
    }

    pub fn create_text_node(&mut self, text: &str) -> NodeId {
        self.insert(Node::new(NodeKind::Text(text.to_owned())))
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> OverlayResult<()> {
        match self.nodes.get_mut(&id).map(|node| &mut node.kind) {
            Some(NodeKind::Element(data)) => {
                data.set_attribute(name, value);
                Ok(())
            }
            Some(_) => Err(OverlayError::new(
                "dom.not_an_element",
                format!("node {id} cannot carry attributes"),
            )),
            None => Err(missing(id)),
        }
    }

    /// Appends `child` to `parent`, moving it out of its current parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> OverlayResult<()> {
        let parent_node = self.nodes.get(&parent).ok_or_else(|| missing(parent))?;
        if matches!(parent_node.kind, NodeKind::Text(_)) {
            return Err(OverlayError::new(
                "dom.hierarchy_invalid",
                format!("text node {parent} cannot have children"),
            ));
        }

        let child_node = self.nodes.get(&child).ok_or_else(|| missing(child))?;
        if matches!(
            child_node.kind,
            NodeKind::Document | NodeKind::ShadowRoot { .. }
        ) {
            return Err(OverlayError::new(
                "dom.hierarchy_invalid",
                format!("node {child} cannot be inserted into a tree"),
            ));
        }

        if child == parent || self.is_inclusive_ancestor(child, parent) {
            return Err(OverlayError::new(
                "dom.hierarchy_invalid",
                format!("appending {child} to {parent} would create a cycle"),
            ));
        }

        self.detach(child);
        self.link(parent, child);
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> OverlayResult<()> {
        if self.parent(child) != Some(parent) {
            return Err(OverlayError::new(
                "dom.not_a_child",
                format!("node {child} is not a child of {parent}"),
            ));
        }

        self.detach(child);
        Ok(())
    }

    /// Removes the node from its parent. Returns false when it had none.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.parent(id) else {
            return false;
        };

        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.retain(|candidate| *candidate != id);
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent = None;
        }
        true
    }

    /// Attaches the isolated render surface of an element. An element owns
    /// at most one shadow root.
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> OverlayResult<NodeId> {
        let host_node = self.nodes.get(&host).ok_or_else(|| missing(host))?;
        if host_node.element().is_none() {
            return Err(OverlayError::new(
                "dom.not_an_element",
                format!("node {host} cannot host a shadow root"),
            ));
        }
        if host_node.shadow_root.is_some() {
            return Err(OverlayError::new(
                "dom.shadow_exists",
                format!("element {host} already has a shadow root"),
            ));
        }

        let shadow_id = self.insert(Node::new(NodeKind::ShadowRoot { host, mode }));
        if let Some(host_node) = self.nodes.get_mut(&host) {
            host_node.shadow_root = Some(shadow_id);
        }
        Ok(shadow_id)
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.nodes.get(&host).and_then(|node| node.shadow_root)
    }

    /// Replaces all children with a single text node (none for empty text).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> OverlayResult<()> {
        if !self.nodes.contains_key(&id) {
            return Err(missing(id));
        }

        for child in self.children(id).to_vec() {
            self.detach(child);
        }

        if !text.is_empty() {
            let text_node = self.create_text_node(text);
            self.append_child(id, text_node)?;
        }
        Ok(())
    }

    /// Concatenated text of the light-tree descendants of `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };

        if let NodeKind::Text(text) = &node.kind {
            out.push_str(text);
            return;
        }

        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// First descendant of `scope` matching a compound selector such as
    /// `pre`, `.stack` or `a.file-link`. Does not enter nested shadow roots.
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Option<NodeId> {
        let selector = SimpleSelector::parse(selector)?;
        let mut found = None;
        self.walk_descendants(scope, &mut |id, data| {
            if found.is_none() && selector.matches(data) {
                found = Some(id);
            }
        });
        found
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Vec<NodeId> {
        let Some(selector) = SimpleSelector::parse(selector) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        self.walk_descendants(scope, &mut |id, data| {
            if selector.matches(data) {
                found.push(id);
            }
        });
        found
    }

    fn walk_descendants(&self, scope: NodeId, visit: &mut dyn FnMut(NodeId, &ElementData)) {
        for child in self.children(scope) {
            if let Some(data) = self.element(*child) {
                visit(*child, data);
            }
            self.walk_descendants(*child, visit);
        }
    }

    /// Propagation path from `target` up to the document, crossing from each
    /// shadow root to its host.
    pub fn composed_path(&self, target: NodeId) -> Vec<NodeId> {
        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(id) = cursor {
            let Some(node) = self.nodes.get(&id) else {
                break;
            };
            path.push(id);
            cursor = match node.kind {
                NodeKind::ShadowRoot { host, .. } => Some(host),
                _ => node.parent,
            };
        }
        path
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.composed_path(id).last() == Some(&DOCUMENT_NODE)
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.composed_path(id).contains(&ancestor)
    }

    fn insert(&mut self, node: Node) -> NodeId {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        self.nodes.insert(id, node);
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            parent_node.children.push(child);
        }
        if let Some(child_node) = self.nodes.get_mut(&child) {
            child_node.parent = Some(parent);
        }
    }
}

fn missing(id: NodeId) -> OverlayError {
    OverlayError::new("dom.node_missing", format!("node {id} does not exist"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SimpleSelector {
    tag: Option<String>,
    classes: Vec<String>,
}

impl SimpleSelector {
    fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return None;
        }

        let mut parts = input.split('.');
        let tag = parts
            .next()
            .filter(|tag| !tag.is_empty())
            .map(str::to_ascii_lowercase);
        let classes: Vec<String> = parts.map(str::to_owned).collect();
        if classes.iter().any(String::is_empty) {
            return None;
        }

        Some(Self { tag, classes })
    }

    fn matches(&self, data: &ElementData) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != data.tag {
                return false;
            }
        }
        self.classes.iter().all(|class| data.has_class(class))
    }
}

#[cfg(test)]
mod tests {
    use super::Document;
    use crate::node::ShadowRootMode;

    fn must<T>(result: eo_core::OverlayResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => panic!("{error}"),
        }
    }

    #[test]
    fn new_document_has_connected_body() {
        let doc = Document::new();
        assert!(doc.is_connected(doc.body()));
        assert_eq!(doc.parent(doc.body()), Some(doc.root()));
    }

    #[test]
    fn append_moves_node_between_parents() {
        let mut doc = Document::new();
        let first = doc.create_element("div");
        let second = doc.create_element("div");
        let leaf = doc.create_element("span");
        must(doc.append_child(first, leaf));
        must(doc.append_child(second, leaf));
        assert!(doc.children(first).is_empty());
        assert_eq!(doc.children(second), &[leaf]);
    }

    #[test]
    fn rejects_cycles_and_text_parents() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("div");
        must(doc.append_child(outer, inner));
        assert!(doc.append_child(inner, outer).is_err());

        let text = doc.create_text_node("x");
        assert!(doc.append_child(text, inner).is_err());
    }

    #[test]
    fn detach_is_a_no_op_for_orphans() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        assert!(!doc.detach(node));
        must(doc.append_child(doc.body(), node));
        assert!(doc.detach(node));
        assert!(!doc.detach(node));
        assert!(doc.remove_child(doc.body(), node).is_err());
    }

    #[test]
    fn shadow_tree_is_hidden_from_light_queries() {
        let mut doc = Document::new();
        let host = doc.create_element("x-widget");
        must(doc.append_child(doc.body(), host));
        let shadow = must(doc.attach_shadow(host, ShadowRootMode::Open));
        let inner = doc.create_element("pre");
        must(doc.set_attribute(inner, "class", "stack"));
        must(doc.append_child(shadow, inner));

        assert_eq!(doc.query_selector(doc.root(), ".stack"), None);
        assert_eq!(doc.query_selector(shadow, "pre.stack"), Some(inner));
        assert!(doc.is_connected(inner));
        assert!(doc.attach_shadow(host, ShadowRootMode::Open).is_err());
    }

    #[test]
    fn text_content_replaces_children() {
        let mut doc = Document::new();
        let pre = doc.create_element("pre");
        must(doc.set_text_content(pre, "first"));
        must(doc.set_text_content(pre, "second"));
        assert_eq!(doc.text_content(pre), "second");
        must(doc.set_text_content(pre, ""));
        assert!(doc.children(pre).is_empty());
    }

    #[test]
    fn composed_path_crosses_shadow_boundary() {
        let mut doc = Document::new();
        let host = doc.create_element("x-widget");
        must(doc.append_child(doc.body(), host));
        let shadow = must(doc.attach_shadow(host, ShadowRootMode::Open));
        let panel = doc.create_element("div");
        must(doc.append_child(shadow, panel));
        assert_eq!(
            doc.composed_path(panel),
            vec![panel, shadow, host, doc.body(), doc.root()]
        );
    }
}
