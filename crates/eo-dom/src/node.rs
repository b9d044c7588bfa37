//! Node records stored in the document arena.

/// ID used to address nodes in the DOM arena.
pub type NodeId = u64;

/// Shadow root encapsulation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadowRootMode {
    Open,
    Closed,
}

impl ShadowRootMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

/// Tag name plus ordered attribute list of an element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl ElementData {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_owned(),
            None => self.attributes.push((name, value.to_owned())),
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|candidate| candidate == class)
    }

    /// Space separated `part` names exposed for host styling.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.attribute("part")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    ShadowRoot { host: NodeId, mode: ShadowRootMode },
}

/// Arena entry. `children` never includes the shadow root; that hangs off
/// `shadow_root` so light-tree traversal cannot reach into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub shadow_root: Option<NodeId>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            shadow_root: None,
        }
    }

    pub fn element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(data) => Some(data),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_shadow_root(&self) -> bool {
        matches!(self.kind, NodeKind::ShadowRoot { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::ElementData;

    #[test]
    fn class_and_part_lists_split_on_whitespace() {
        let mut data = ElementData::new("PRE");
        data.set_attribute("class", "message  file-link");
        data.set_attribute("Part", "message");
        assert_eq!(data.tag, "pre");
        assert!(data.has_class("file-link"));
        assert!(!data.has_class("file"));
        assert_eq!(data.parts().collect::<Vec<_>>(), vec!["message"]);
    }

    #[test]
    fn set_attribute_replaces_existing_value() {
        let mut data = ElementData::new("a");
        data.set_attribute("class", "one");
        data.set_attribute("class", "two");
        assert_eq!(data.attributes.len(), 1);
        assert_eq!(data.attribute("class"), Some("two"));
    }
}
