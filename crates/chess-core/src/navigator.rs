//! Moving the "current path" through a tree, and appending moves at its end.
//!
//! The path is the only navigation state. Every operation returns a new path
//! and leaves its input untouched, so an out-of-range request is simply the
//! same path handed back.

use shakmaty::{Chess, Move};
use tracing::debug;

use crate::move_tree::{MovePath, MoveTree, NodeId};
use crate::position;

impl MovePath {
    /// Follow the main line one ply. No-op at a leaf.
    pub fn advance(&self, tree: &MoveTree) -> MovePath {
        match tree.node(self.last()).main_child() {
            Some(next) => self.extended(next),
            None => self.clone(),
        }
    }

    /// Step back one ply. No-op at the root.
    pub fn retreat(&self) -> MovePath {
        if self.len() > 1 {
            self.truncated(self.len() - 1)
        } else {
            self.clone()
        }
    }

    /// Truncate to `index + 1` nodes. No-op when `index` is out of range.
    pub fn jump_to(&self, index: usize) -> MovePath {
        if index < self.len() {
            self.truncated(index + 1)
        } else {
            self.clone()
        }
    }
}

impl MoveTree {
    /// Play a physical board move (drag-and-drop) at the end of `path`.
    ///
    /// Returns `None` when the move is illegal or the path does not belong to
    /// this tree; the tree is untouched in that case. If the resulting move is
    /// already recorded as a child it is reused, otherwise a new child is
    /// appended after the existing ones.
    pub fn apply_move(
        &mut self,
        path: &MovePath,
        from: &str,
        to: &str,
        promotion: Option<char>,
    ) -> Option<MovePath> {
        let end = self.path_end(path)?;
        let mv = position::squares_to_move(self.node(end).position(), from, to, promotion)?;
        Some(self.play_at(path, end, mv))
    }

    /// Same as [`MoveTree::apply_move`] for a SAN string such as `Nf3`.
    pub fn apply_san(&mut self, path: &MovePath, san: &str) -> Option<MovePath> {
        let end = self.path_end(path)?;
        let mv = position::san_to_move(self.node(end).position(), san)?;
        Some(self.play_at(path, end, mv))
    }

    /// Same as [`MoveTree::apply_move`] for a UCI string such as `e7e8q`.
    pub fn apply_uci(&mut self, path: &MovePath, uci: &str) -> Option<MovePath> {
        let uci = uci.trim();
        if uci.len() < 4 || !uci.is_ascii() {
            return None;
        }
        let promotion = uci[4..].chars().next();
        self.apply_move(path, &uci[0..2], &uci[2..4], promotion)
    }

    fn path_end(&self, path: &MovePath) -> Option<NodeId> {
        if self.contains_path(path) {
            Some(path.last())
        } else {
            debug!(len = path.len(), "path does not belong to this tree");
            None
        }
    }

    fn play_at(&mut self, path: &MovePath, end: NodeId, mv: Move) -> MovePath {
        let before: &Chess = self.node(end).position();
        let (san, after) = position::play(before, mv);
        let child = match self.find_child(end, &san) {
            Some(existing) => existing,
            None => self.push_child(end, san, after),
        };
        path.extended(child)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(line: &[&str]) -> (MoveTree, MovePath) {
        let mut tree = MoveTree::new();
        let mut path = tree.root_path();
        for san in line {
            path = tree.apply_san(&path, san).unwrap();
        }
        (tree, path)
    }

    #[test]
    fn test_advance_and_retreat_bounds() {
        let (tree, end) = tree_with(&["e4", "e5"]);
        let root = tree.root_path();

        assert_eq!(root.retreat(), root);
        assert_eq!(end.advance(&tree), end);

        let one = root.advance(&tree);
        assert_eq!(one.len(), 2);
        assert_eq!(one.advance(&tree), end);
        assert_eq!(end.retreat(), one);
    }

    #[test]
    fn test_jump_to() {
        let (_, end) = tree_with(&["e4", "e5", "Nf3"]);
        assert_eq!(end.jump_to(1).len(), 2);
        assert_eq!(end.jump_to(0).len(), 1);
        assert_eq!(end.jump_to(3), end);
        assert_eq!(end.jump_to(4), end);
        assert_eq!(end.jump_to(usize::MAX), end);
    }

    #[test]
    fn test_apply_move_reuses_existing_child() {
        let (mut tree, _) = tree_with(&["e4", "e5"]);
        let root = tree.root_path();
        let nodes_before = tree.len();

        let path = tree.apply_move(&root, "e2", "e4", None).unwrap();
        assert_eq!(tree.node(tree.root()).children().len(), 1);
        assert_eq!(tree.len(), nodes_before);
        assert_eq!(path, root.advance(&tree));
    }

    #[test]
    fn test_apply_move_creates_variation() {
        let (mut tree, _) = tree_with(&["e4", "e5"]);
        let root = tree.root_path();

        let d4 = tree.apply_move(&root, "d2", "d4", None).unwrap();
        let c4 = tree.apply_move(&root, "c2", "c4", None).unwrap();
        let children = tree.node(tree.root()).children();
        assert_eq!(children.len(), 3);
        assert_eq!(children[1], d4.last());
        assert_eq!(children[2], c4.last());
        assert_eq!(tree.node(d4.last()).san(), Some("d4"));
        // Main line is untouched.
        assert_eq!(tree.move_sequence(&tree.main_line()), "e4 e5");
    }

    #[test]
    fn test_illegal_move_leaves_tree_untouched() {
        let (mut tree, end) = tree_with(&["e4"]);
        let before = tree.clone();
        assert!(tree.apply_move(&end, "e2", "e4", None).is_none());
        assert!(tree.apply_move(&end, "e7", "e4", None).is_none());
        assert_eq!(tree, before);
        assert_eq!(tree.len(), before.len());
    }

    #[test]
    fn test_promotion_hint_ignored_on_ordinary_move() {
        let (mut tree, _) = tree_with(&["e4"]);
        let root = tree.root_path();
        let nodes_before = tree.len();

        let path = tree.apply_move(&root, "e2", "e4", Some('q')).unwrap();
        assert_eq!(path, root.advance(&tree));
        assert_eq!(tree.len(), nodes_before);

        let d4 = tree.apply_move(&root, "d2", "d4", Some('n')).unwrap();
        assert_eq!(tree.node(d4.last()).san(), Some("d4"));
        assert!(tree.apply_move(&root, "e2", "e5", Some('q')).is_none());
    }

    #[test]
    fn test_foreign_path_rejected() {
        let (mut small, _) = tree_with(&["e4"]);
        let (big, long) = tree_with(&["d4", "d5", "c4"]);
        assert!(small.apply_san(&long, "e6").is_none());
        assert_eq!(big.len(), 4);
    }

    #[test]
    fn test_uci_promotion() {
        let start = position::parse_fen("7k/P7/8/8/8/8/8/K7 w - - 0 1").unwrap();
        let mut tree = MoveTree::from_position(start);
        let root = tree.root_path();

        let knight = tree.apply_uci(&root, "a7a8n").unwrap();
        assert_eq!(tree.node(knight.last()).san(), Some("a8=N"));
        let queen = tree.apply_move(&root, "a7", "a8", None).unwrap();
        assert_eq!(tree.node(queen.last()).san(), Some("a8=Q+"));
        assert_eq!(tree.node(tree.root()).children().len(), 2);
    }
}
