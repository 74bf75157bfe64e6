//! In-memory subtree of one matched element
//!
//! Nodes live in an arena in document (pre-)order, so the descendants of a
//! node always form a contiguous index range.

/// Index of a node inside its [`Fragment`]
pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// Resolved namespace URI, if the name is bound to one
    pub namespace: Option<String>,

    /// Prefix as written in the document
    pub prefix: Option<String>,

    pub local: String,
}

impl QualifiedName {
    pub fn local(local: impl Into<String>) -> Self {
        QualifiedName {
            namespace: None,
            prefix: None,
            local: local.into(),
        }
    }

    pub fn namespaced(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        QualifiedName {
            namespace: Some(namespace.into()),
            prefix: None,
            local: local.into(),
        }
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QualifiedName,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: QualifiedName,
    pub attributes: Vec<Attribute>,

    /// Character data before the first child element
    pub text: String,

    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,

    /// Last node of this node's subtree (itself for leaves)
    last_descendant: NodeId,
}

impl Node {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.local == name && a.name.namespace.is_none())
            .map(|a| a.value.as_str())
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}

/// A materialized element subtree; the matched element is always node 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    nodes: Vec<Node>,
}

impl Fragment {
    pub const ROOT: NodeId = 0;

    pub fn root(&self) -> &Node {
        &self.nodes[Self::ROOT]
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All descendants of `id` in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> std::ops::RangeInclusive<NodeId> {
        id + 1..=self.nodes[id].last_descendant
    }

    /// Copy the subtree rooted at `id` into its own fragment
    pub fn subtree(&self, id: NodeId) -> Fragment {
        copy_subtree(&self.nodes, id)
    }

    /// Parse a complete XML string into a fragment rooted at its document element
    pub fn parse(xml: &str) -> crate::Result<Fragment> {
        let pattern = super::path::ParentPattern::document_element();
        let mut stream =
            super::stream::ElementStream::from_reader(xml.as_bytes(), pattern, "<string>");
        match stream.next() {
            Some(result) => result,
            None => Err(crate::Error::config("document has no root element")),
        }
    }
}

fn copy_subtree(nodes: &[Node], id: NodeId) -> Fragment {
    let last = nodes[id].last_descendant;
    let nodes = nodes[id..=last]
        .iter()
        .enumerate()
        .map(|(offset, node)| Node {
            name: node.name.clone(),
            attributes: node.attributes.clone(),
            text: node.text.clone(),
            children: node.children.iter().map(|c| c - id).collect(),
            parent: if offset == 0 {
                None
            } else {
                node.parent.map(|p| p - id)
            },
            last_descendant: node.last_descendant - id,
        })
        .collect();
    Fragment { nodes }
}

/// Incrementally builds a [`Fragment`] from start/text/end events
#[derive(Debug, Default)]
pub struct FragmentBuilder {
    nodes: Vec<Node>,
    open: Vec<(NodeId, bool)>,
}

impl FragmentBuilder {
    pub fn new() -> Self {
        FragmentBuilder::default()
    }

    /// Whether an element is currently open in the builder
    pub fn is_capturing(&self) -> bool {
        !self.open.is_empty()
    }

    /// Open an element; `matched` marks elements that must be emitted when closed
    pub fn open(&mut self, name: QualifiedName, attributes: Vec<Attribute>, matched: bool) -> NodeId {
        let id = self.nodes.len();
        let parent = self.open.last().map(|(p, _)| *p);
        if let Some(p) = parent {
            self.nodes[p].children.push(id);
        }
        self.nodes.push(Node {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
            parent,
            last_descendant: id,
        });
        self.open.push((id, matched));
        id
    }

    /// Append character data to the innermost open element
    pub fn text(&mut self, text: &str) {
        if let Some(&(id, _)) = self.open.last() {
            let node = &mut self.nodes[id];
            // text after the first child is a tail and is not kept
            if node.children.is_empty() {
                node.text.push_str(text);
            }
        }
    }

    /// Close the innermost element, returning its id and whether it was marked
    pub fn close(&mut self) -> Option<(NodeId, bool)> {
        let (id, matched) = self.open.pop()?;
        self.nodes[id].last_descendant = self.nodes.len() - 1;
        Some((id, matched))
    }

    /// Take the finished fragment out, leaving the builder empty
    pub fn finish(&mut self) -> Fragment {
        self.open.clear();
        Fragment {
            nodes: std::mem::take(&mut self.nodes),
        }
    }

    /// Copy a closed inner element out without disturbing the builder
    pub fn snapshot(&self, id: NodeId) -> Fragment {
        copy_subtree(&self.nodes, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Fragment {
        // <item><a>x</a><b><c>y</c></b></item>
        let mut builder = FragmentBuilder::new();
        builder.open(QualifiedName::local("item"), vec![], true);
        builder.open(QualifiedName::local("a"), vec![], false);
        builder.text("x");
        builder.close();
        builder.open(QualifiedName::local("b"), vec![], false);
        builder.open(QualifiedName::local("c"), vec![], false);
        builder.text("y");
        builder.close();
        builder.close();
        builder.text("tail");
        builder.close();
        builder.finish()
    }

    #[test]
    fn test_arena_layout() {
        let fragment = sample();
        assert_eq!(fragment.len(), 4);
        assert_eq!(fragment.root().name.local, "item");
        assert_eq!(fragment.root().children, vec![1, 2]);
        assert_eq!(fragment.root().text, "");
        assert_eq!(fragment.descendants(0), 1..=3);
        assert_eq!(fragment.descendants(2), 3..=3);
        assert!(fragment.descendants(1).is_empty());
    }

    #[test]
    fn test_subtree_is_reindexed() {
        let fragment = sample();
        let sub = fragment.subtree(2);
        assert_eq!(sub.len(), 2);
        assert_eq!(sub.root().name.local, "b");
        assert_eq!(sub.root().parent, None);
        assert_eq!(sub.root().children, vec![1]);
        assert_eq!(sub.node(1).text, "y");
        assert_eq!(sub.node(1).parent, Some(0));
    }
}
