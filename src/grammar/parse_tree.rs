use std::fmt;

use super::grammar::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Terminal,
    NonTerminal,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub symbol: Symbol,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self.symbol {
            Symbol::NonTerminal(_) => NodeKind::NonTerminal,
            _ => NodeKind::Terminal,
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Derivation tree. Nodes live in one arena; every node owns the ids of its
/// children, and `parent` is only a back reference for traversal.
#[derive(Debug, Clone)]
pub struct ParseTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl ParseTree {
    pub fn new(root: Symbol) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        tree.push_node(root);
        tree
    }

    /// An empty arena for bottom-up construction; the root must be chosen
    /// with `set_root` before the tree is handed out.
    pub(crate) fn detached() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId(0),
        }
    }

    pub(crate) fn push_node(&mut self, symbol: Symbol) -> NodeId {
        self.nodes.push(Node {
            symbol,
            children: Vec::new(),
            parent: None,
        });
        NodeId(self.nodes.len() - 1)
    }

    pub(crate) fn adopt(&mut self, parent: NodeId, children: Vec<NodeId>) {
        for &child in &children {
            self.nodes[child.0].parent = Some(parent);
        }
        self.nodes[parent.0].children.extend(children);
    }

    pub(crate) fn set_root(&mut self, root: NodeId) {
        self.root = root;
    }

    pub fn add_child(&mut self, parent: NodeId, symbol: Symbol) -> NodeId {
        let child = self.push_node(symbol);
        self.adopt(parent, vec![child]);
        child
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn symbol(&self, id: NodeId) -> &Symbol {
        &self.nodes[id.0].symbol
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    /// Leaves in left-to-right order, ε leaves included.
    pub fn leaves(&self) -> Vec<&Symbol> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            if node.is_leaf() {
                leaves.push(&node.symbol);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }
        leaves
    }

    /// The terminal string the tree derives.
    pub fn derived_string(&self) -> String {
        self.leaves()
            .into_iter()
            .filter_map(|s| match s {
                Symbol::Terminal(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Edges on the longest root-to-leaf path; a lone root has height 0.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(self.nodes[id.0].children.iter().map(|&c| (c, depth + 1)));
        }
        height
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            count += 1;
            stack.extend(self.nodes[id.0].children.iter());
        }
        count
    }

    fn fmt_node(
        &self,
        f: &mut fmt::Formatter<'_>,
        id: NodeId,
        prefix: &str,
        last: bool,
    ) -> fmt::Result {
        writeln!(
            f,
            "{}{}{}",
            prefix,
            if last { "└── " } else { "├── " },
            self.nodes[id.0].symbol
        )?;
        let prefix = format!("{}{}", prefix, if last { "    " } else { "│   " });
        let children = &self.nodes[id.0].children;
        for (i, &child) in children.iter().enumerate() {
            self.fmt_node(f, child, &prefix, i + 1 == children.len())?;
        }
        Ok(())
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_node(f, self.root, "", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // S -> a S b | ε on "ab"
    fn sample() -> ParseTree {
        let mut tree = ParseTree::new(Symbol::non_terminal("S"));
        let root = tree.root();
        tree.add_child(root, Symbol::Terminal('a'));
        let inner = tree.add_child(root, Symbol::non_terminal("S"));
        tree.add_child(root, Symbol::Terminal('b'));
        tree.add_child(inner, Symbol::Epsilon);
        tree
    }

    #[test]
    fn measures() {
        let tree = sample();
        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.derived_string(), "ab");
        assert_eq!(
            tree.leaves(),
            vec![
                &Symbol::Terminal('a'),
                &Symbol::Epsilon,
                &Symbol::Terminal('b')
            ]
        );
    }

    #[test]
    fn parent_links_and_depth() {
        let tree = sample();
        let root = tree.root();
        let inner = tree.children(root)[1];
        let epsilon = tree.children(inner)[0];

        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.parent(epsilon), Some(inner));
        assert_eq!(tree.depth(epsilon), 2);
        assert_eq!(tree.node(inner).kind(), NodeKind::NonTerminal);
        assert_eq!(tree.node(epsilon).kind(), NodeKind::Terminal);
        assert!(tree.node(epsilon).is_leaf());
    }

    #[test]
    fn lone_root() {
        let tree = ParseTree::new(Symbol::non_terminal("S"));
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.derived_string(), "");
    }

    #[test]
    fn rendering() {
        let expected = "└── S\n    ├── a\n    ├── S\n    │   └── ε\n    └── b\n";
        assert_eq!(sample().to_string(), expected);
    }
}
