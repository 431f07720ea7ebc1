use indexmap::IndexMap;

use crate::dom::style::InlineStyle;

// ============================================================================
// Arena document model
// ============================================================================

/// Index into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone)]
pub enum NodeKind {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct ElementData {
    /// Lowercase tag name
    pub tag: String,

    /// Attributes in insertion order (order is part of the page's identity:
    /// "first data-attribute" selection depends on it)
    pub attrs: IndexMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,

    /// Style overrides installed by `apply_css`, highest precedence when
    /// resolving visibility. Not an attribute; never produces mutations.
    pub applied: Option<InlineStyle>,
}

/// One observed change to the document, delivered to subscribers in batches.
#[derive(Debug, Clone)]
pub enum MutationRecord {
    ChildList { target: NodeId },
    Attribute { target: NodeId, name: String },
    CharacterData { target: NodeId },
}

pub type MutationBatch = Vec<MutationRecord>;

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    pub url: String,
    pub title: String,
}

impl Document {
    /// Empty document: an `html` root with a `body` child.
    pub fn new(url: &str, title: &str) -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            url: url.to_string(),
            title: title.to_string(),
        };
        let root = doc.push_node(None, NodeKind::Element(ElementData {
            tag: "html".to_string(),
            attrs: IndexMap::new(),
        }));
        let body = doc.push_node(Some(root), NodeKind::Element(ElementData {
            tag: "body".to_string(),
            attrs: IndexMap::new(),
        }));
        doc.root = root;
        doc.body = body;
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
            applied: None,
        });
        if let Some(p) = parent {
            self.nodes[p.0].children.push(id);
        }
        id
    }

    // ---- construction ----

    /// Append an element child; used by ingestion and by tests building pages.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut map = IndexMap::new();
        for (name, value) in attrs {
            map.insert(name.to_string(), value.to_string());
        }
        self.push_node(Some(parent), NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: map,
        }))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push_node(Some(parent), NodeKind::Text(text.to_string()))
    }

    // ---- accessors ----

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(data) => Some(data),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id.0].kind, NodeKind::Element(_))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|e| e.tag.as_str())
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|e| e.attrs.get(name).map(|v| v.as_str()))
    }

    /// Whitespace-split class list, empty when no class attribute.
    pub fn classes(&self, id: NodeId) -> Vec<&str> {
        match self.attr(id, "class") {
            Some(value) => value.split_whitespace().collect(),
            None => Vec::new(),
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn child_elements(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id.0]
            .children
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    /// Ancestor chain from parent up to the root, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut chain = Vec::new();
        let mut cursor = self.parent(id);
        while let Some(p) = cursor {
            chain.push(p);
            cursor = self.parent(p);
        }
        chain
    }

    /// All attached elements in document (preorder) order, root included.
    pub fn elements(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if self.is_element(id) {
                out.push(id);
            }
            for child in self.nodes[id.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Concatenated text of direct text-node children, whitespace-collapsed.
    pub fn direct_text(&self, id: NodeId) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for child in &self.nodes[id.0].children {
            if let NodeKind::Text(text) = &self.nodes[child.0].kind {
                parts.push(text.as_str());
            }
        }
        parts
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Tag+id chain from body down to the element, e.g. `body>div#app>ul`.
    /// Elements outside the body subtree fall back to a root-anchored chain.
    pub fn path_from_body(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if let Some(data) = self.element(current) {
                let segment = match data.attrs.get("id") {
                    Some(el_id) if !el_id.is_empty() => format!("{}#{}", data.tag, el_id),
                    _ => data.tag.clone(),
                };
                segments.push(segment);
                if current == self.body || current == self.root {
                    break;
                }
            }
            cursor = self.parent(current);
        }
        segments.reverse();
        segments.join(">")
    }

    pub fn set_applied(&mut self, id: NodeId, style: InlineStyle) {
        let node = &mut self.nodes[id.0];
        match &mut node.applied {
            Some(existing) => existing.merge(&style),
            None => node.applied = Some(style),
        }
    }

    pub fn clear_applied(&mut self) {
        for node in &mut self.nodes {
            node.applied = None;
        }
    }

    // ---- mutation API (returns records for subscriber delivery) ----

    /// Detach a node from its parent. The root and body are never removed.
    pub fn remove_node(&mut self, id: NodeId) -> Option<MutationRecord> {
        if id == self.root || id == self.body {
            return None;
        }
        let parent = self.nodes[id.0].parent?;
        self.nodes[parent.0].children.retain(|c| *c != id);
        self.nodes[id.0].parent = None;
        Some(MutationRecord::ChildList { target: parent })
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> Option<MutationRecord> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(data) => {
                data.attrs.insert(name.to_string(), value.to_string());
                Some(MutationRecord::Attribute {
                    target: id,
                    name: name.to_string(),
                })
            }
            NodeKind::Text(_) => None,
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<MutationRecord> {
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(data) => {
                data.attrs.shift_remove(name)?;
                Some(MutationRecord::Attribute {
                    target: id,
                    name: name.to_string(),
                })
            }
            NodeKind::Text(_) => None,
        }
    }

    /// Replace an element's children with a single text node, the
    /// `textContent` assignment equivalent.
    pub fn set_text(&mut self, id: NodeId, text: &str) -> Option<MutationRecord> {
        if !self.is_element(id) {
            return None;
        }
        let old_children = std::mem::take(&mut self.nodes[id.0].children);
        for child in old_children {
            self.nodes[child.0].parent = None;
        }
        self.append_text(id, text);
        Some(MutationRecord::ChildList { target: id })
    }

    /// Rewrite the first text child in place, the `CharacterData` mutation
    /// shape. No structural change.
    pub fn edit_text(&mut self, id: NodeId, text: &str) -> Option<MutationRecord> {
        let child_ids: Vec<NodeId> = self.nodes[id.0].children.clone();
        for child in child_ids {
            if let NodeKind::Text(existing) = &mut self.nodes[child.0].kind {
                *existing = text.to_string();
                return Some(MutationRecord::CharacterData { target: child });
            }
        }
        None
    }

    /// Append a fresh element (optionally with text) under a parent.
    pub fn append_child_element(
        &mut self,
        parent: NodeId,
        tag: &str,
        attrs: &[(&str, &str)],
        text: Option<&str>,
    ) -> Option<(NodeId, MutationRecord)> {
        if !self.is_element(parent) {
            return None;
        }
        let id = self.append_element(parent, tag, attrs);
        if let Some(text) = text {
            self.append_text(id, text);
        }
        Some((id, MutationRecord::ChildList { target: parent }))
    }
}
