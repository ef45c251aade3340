//! Move tree: an arena of plies with ordered children.
//!
//! `children[0]` of a node is its main-line continuation, later children are
//! variations in creation order. Nodes are only ever appended, so a `NodeId`
//! stays valid for the lifetime of the tree and a `MovePath` captured before
//! an edit still resolves to the same nodes afterwards.

use serde::{Deserialize, Serialize};
use shakmaty::{Chess, Color, Position};

use crate::position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct MoveNode {
    san: Option<String>,
    position: Chess,
    annotation: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl MoveNode {
    /// SAN of the move leading into this node; `None` only for the root.
    pub fn san(&self) -> Option<&str> {
        self.san.as_deref()
    }

    /// Position after this node's move.
    pub fn position(&self) -> &Chess {
        &self.position
    }

    pub fn fen(&self) -> String {
        position::fen_of(&self.position)
    }

    pub fn annotation(&self) -> &str {
        &self.annotation
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn main_child(&self) -> Option<NodeId> {
        self.children.first().copied()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MoveTree {
    nodes: Vec<MoveNode>,
}

impl Default for MoveTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MoveTree {
    /// Empty game at the standard starting position.
    pub fn new() -> Self {
        Self::from_position(Chess::default())
    }

    /// Empty game starting from a custom position.
    pub fn from_position(start: Chess) -> Self {
        Self {
            nodes: vec![MoveNode {
                san: None,
                position: start,
                annotation: String::new(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &MoveNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&MoveNode> {
        self.nodes.get(id.0)
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes[0].children.is_empty()
    }

    pub fn start_position(&self) -> &Chess {
        &self.nodes[0].position
    }

    /// Side to move at `depth` plies from the root, derived from the root's
    /// encoded side to move.
    pub fn side_to_move_at(&self, depth: usize) -> Color {
        let root_turn = self.start_position().turn();
        if depth % 2 == 0 {
            root_turn
        } else {
            root_turn.other()
        }
    }

    pub(crate) fn push_child(&mut self, parent: NodeId, san: String, position: Chess) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(MoveNode {
            san: Some(san),
            position,
            annotation: String::new(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Replace the annotation text of a node. Returns false for an unknown id.
    pub fn set_annotation(&mut self, id: NodeId, text: impl Into<String>) -> bool {
        match self.nodes.get_mut(id.0) {
            Some(node) => {
                node.annotation = text.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn append_annotation(&mut self, id: NodeId, text: &str) {
        let node = &mut self.nodes[id.0];
        if node.annotation.is_empty() {
            node.annotation = text.to_string();
        } else {
            node.annotation.push(' ');
            node.annotation.push_str(text);
        }
    }

    /// Child of `parent` whose move is `san`, if one was already recorded.
    pub fn find_child(&self, parent: NodeId, san: &str) -> Option<NodeId> {
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|&c| self.node(c).san() == Some(san))
    }

    pub fn root_path(&self) -> MovePath {
        MovePath(vec![self.root()])
    }

    /// Path from the root following `children[0]` to the end of the game.
    pub fn main_line(&self) -> MovePath {
        let mut ids = vec![self.root()];
        let mut cursor = self.root();
        while let Some(next) = self.node(cursor).main_child() {
            ids.push(next);
            cursor = next;
        }
        MovePath(ids)
    }

    /// Root-to-node path for any node, rebuilt from parent links.
    pub fn path_to(&self, id: NodeId) -> Option<MovePath> {
        self.get(id)?;
        let mut ids = vec![id];
        let mut cursor = id;
        while let Some(parent) = self.node(cursor).parent {
            ids.push(parent);
            cursor = parent;
        }
        ids.reverse();
        Some(MovePath(ids))
    }

    /// Resolve a line (child index at every step) into a path.
    pub fn path_from_line(&self, line: &[usize]) -> Option<MovePath> {
        let mut ids = Vec::with_capacity(line.len() + 1);
        let mut cursor = self.root();
        ids.push(cursor);
        for &idx in line {
            cursor = *self.node(cursor).children.get(idx)?;
            ids.push(cursor);
        }
        Some(MovePath(ids))
    }

    /// Inverse of [`MoveTree::path_from_line`].
    pub fn line_of(&self, path: &MovePath) -> Vec<usize> {
        path.0
            .windows(2)
            .filter_map(|pair| {
                self.node(pair[0])
                    .children
                    .iter()
                    .position(|&c| c == pair[1])
            })
            .collect()
    }

    /// Whether `path` starts at this tree's root and every step is a real
    /// parent/child edge.
    pub fn contains_path(&self, path: &MovePath) -> bool {
        path.0.first() == Some(&self.root())
            && path.0.iter().all(|&id| self.get(id).is_some())
            && path
                .0
                .windows(2)
                .all(|pair| self.node(pair[1]).parent == Some(pair[0]))
    }

    /// SAN moves of a path joined by single spaces, e.g. `e4 e5 Nf3`.
    pub fn move_sequence(&self, path: &MovePath) -> String {
        path.0
            .iter()
            .filter_map(|&id| self.node(id).san())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn subtree_eq(&self, a: NodeId, other: &MoveTree, b: NodeId) -> bool {
        let (na, nb) = (self.node(a), other.node(b));
        na.san == nb.san
            && na.annotation == nb.annotation
            && na.children.len() == nb.children.len()
            && na
                .children
                .iter()
                .zip(&nb.children)
                .all(|(&ca, &cb)| self.subtree_eq(ca, other, cb))
    }
}

/// Structural equality: same start position, moves, annotations and branch
/// order. Arena layout is ignored.
impl PartialEq for MoveTree {
    fn eq(&self, other: &Self) -> bool {
        self.node(self.root()).fen() == other.node(other.root()).fen()
            && self.subtree_eq(self.root(), other, other.root())
    }
}

/// Root-to-node list of node ids. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MovePath(Vec<NodeId>);

impl MovePath {
    pub fn nodes(&self) -> &[NodeId] {
        &self.0
    }

    /// Node at the end of the path.
    pub fn last(&self) -> NodeId {
        self.0[self.0.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; a path holds at least the root.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Plies played to reach the end of the path.
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    pub(crate) fn extended(&self, next: NodeId) -> MovePath {
        let mut ids = self.0.clone();
        ids.push(next);
        MovePath(ids)
    }

    pub(crate) fn truncated(&self, len: usize) -> MovePath {
        MovePath(self.0[..len].to_vec())
    }
}
