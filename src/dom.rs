//! In-memory document model for the frame.
//!
//! Holds just enough structure for the frame contract: a body that injected
//! assets are appended to, a `#root` element the block renders into, and the
//! placeholder shown in `#root` until a block is ready.

use std::collections::HashMap;

use crate::error::FrameError;

/// Id of the element blocks render into
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub text: String,
    pub style: Vec<(String, String)>,
    pub children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            id: None,
            text: String::new(),
            style: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Substitute UI shown in `#root` while no block is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    None,
    Loading,
    NotFound,
}

impl Placeholder {
    pub fn element_id(self) -> Option<&'static str> {
        match self {
            Placeholder::None => None,
            Placeholder::Loading => Some("__loading__"),
            Placeholder::NotFound => Some("__not_found__"),
        }
    }

    fn text(self) -> &'static str {
        match self {
            Placeholder::None => "",
            Placeholder::Loading => "Loading...",
            Placeholder::NotFound => "Block not found",
        }
    }

    fn from_element_id(id: &str) -> Self {
        match id {
            "__loading__" => Placeholder::Loading,
            "__not_found__" => Placeholder::NotFound,
            _ => Placeholder::None,
        }
    }
}

const PLACEHOLDER_STYLE: &[(&str, &str)] = &[
    ("width", "100%"),
    ("height", "100%"),
    ("display", "flex"),
    ("align-items", "center"),
    ("justify-content", "center"),
    ("color", "#ddd"),
    ("font-style", "italic"),
];

#[derive(Debug, Default)]
pub struct Document {
    nodes: HashMap<NodeId, Element>,
    body: Vec<NodeId>,
    next_id: usize,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document whose body holds the `#root` element
    pub fn with_root() -> Self {
        let mut doc = Self::new();
        let root = doc.create_element("div");
        doc.set_id(root, ROOT_ID);
        doc.append_to_body(root);
        doc
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, Element::new(tag));
        id
    }

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        self.nodes.get(&node)
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        if let Some(el) = self.nodes.get_mut(&node) {
            el.id = Some(id.to_string());
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(el) = self.nodes.get_mut(&node) {
            el.text = text.to_string();
        }
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        if let Some(el) = self.nodes.get_mut(&node) {
            match el.style.iter_mut().find(|(p, _)| p == property) {
                Some(entry) => entry.1 = value.to_string(),
                None => el.style.push((property.to_string(), value.to_string())),
            }
        }
    }

    pub fn body(&self) -> &[NodeId] {
        &self.body
    }

    pub fn append_to_body(&mut self, node: NodeId) {
        self.body.retain(|n| *n != node);
        self.body.push(node);
    }

    /// Detach `node` from the body. Does nothing if it isn't attached.
    pub fn remove_from_body(&mut self, node: NodeId) {
        self.body.retain(|n| *n != node);
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(&node)
            .map(|el| el.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(el) = self.nodes.get_mut(&parent) {
            el.children.retain(|n| *n != child);
            el.children.push(child);
        }
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(el) = self.nodes.get_mut(&parent) {
            el.children.retain(|n| *n != child);
        }
    }

    /// Find an attached element by id, searching the body depth-first.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.body.iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            let el = self.nodes.get(&node)?;
            if el.id.as_deref() == Some(id) {
                return Some(node);
            }
            stack.extend(el.children.iter().rev().copied());
        }
        None
    }

    pub fn root(&self) -> Result<NodeId, FrameError> {
        self.get_element_by_id(ROOT_ID)
            .ok_or_else(|| FrameError::MissingRoot(ROOT_ID.to_string()))
    }

    /// The placeholder currently shown in `#root`, if any
    pub fn placeholder(&self) -> Placeholder {
        let Ok(root) = self.root() else {
            return Placeholder::None;
        };
        match self.children(root) {
            [only] => self
                .element(*only)
                .and_then(|el| el.id.as_deref())
                .map(Placeholder::from_element_id)
                .unwrap_or(Placeholder::None),
            _ => Placeholder::None,
        }
    }

    /// Remove the placeholder if it is the only thing in `#root`.
    pub fn clear_placeholder(&mut self) {
        let Ok(root) = self.root() else {
            return;
        };
        if let [only] = self.children(root) {
            let only = *only;
            if self.placeholder() != Placeholder::None {
                self.remove_child(root, only);
                self.nodes.remove(&only);
            }
        }
    }

    pub fn show_placeholder(&mut self, placeholder: Placeholder) -> Result<(), FrameError> {
        let Some(id) = placeholder.element_id() else {
            return Ok(());
        };
        let root = self.root()?;
        let div = self.create_element("div");
        self.set_id(div, id);
        for (property, value) in PLACEHOLDER_STYLE {
            self.set_style(div, property, value);
        }
        self.set_text(div, placeholder.text());
        self.append_child(root, div);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_root() {
        let doc = Document::with_root();
        let root = doc.root().unwrap();
        assert_eq!(doc.body(), &[root]);
        assert_eq!(doc.placeholder(), Placeholder::None);
    }

    #[test]
    fn test_missing_root() {
        let mut doc = Document::new();
        assert!(matches!(doc.root(), Err(FrameError::MissingRoot(_))));
        assert!(doc.show_placeholder(Placeholder::Loading).is_err());
        doc.clear_placeholder();
    }

    #[test]
    fn test_placeholder_replacement() {
        let mut doc = Document::with_root();
        doc.show_placeholder(Placeholder::Loading).unwrap();
        assert_eq!(doc.placeholder(), Placeholder::Loading);

        doc.clear_placeholder();
        doc.show_placeholder(Placeholder::NotFound).unwrap();
        assert_eq!(doc.placeholder(), Placeholder::NotFound);

        let root = doc.root().unwrap();
        assert_eq!(doc.children(root).len(), 1);
        let shown = doc.element(doc.children(root)[0]).unwrap();
        assert_eq!(shown.text, "Block not found");
        assert!(shown.style.contains(&("font-style".to_string(), "italic".to_string())));
    }

    #[test]
    fn test_clear_placeholder_leaves_rendered_content() {
        let mut doc = Document::with_root();
        let root = doc.root().unwrap();
        let content = doc.create_element("section");
        doc.set_id(content, "app");
        doc.append_child(root, content);

        doc.clear_placeholder();
        assert_eq!(doc.children(root), &[content]);
    }

    #[test]
    fn test_remove_from_body_is_idempotent() {
        let mut doc = Document::with_root();
        let style = doc.create_element("style");
        doc.append_to_body(style);
        assert_eq!(doc.body().len(), 2);

        doc.remove_from_body(style);
        doc.remove_from_body(style);
        assert_eq!(doc.body().len(), 1);
    }
}
