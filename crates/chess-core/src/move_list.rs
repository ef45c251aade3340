//! Flatten a move tree into the display sequence shown next to the board.

use serde::Serialize;
use shakmaty::Color;

use crate::game_data::GameResult;
use crate::move_tree::{MovePath, MoveTree, NodeId};
use crate::position;

/// Move number and side to move before a ply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Turn {
    pub number: u32,
    pub color: Color,
}

impl Turn {
    pub fn at_root(tree: &MoveTree) -> Self {
        let (number, color) = position::move_counter(tree.start_position());
        Turn { number, color }
    }

    pub fn next(self) -> Self {
        match self.color {
            Color::White => Turn { number: self.number, color: Color::Black },
            Color::Black => Turn { number: self.number + 1, color: Color::White },
        }
    }

    /// `N.` for White, `N...` for a Black move that needs its number (start
    /// of a line, after a variation), nothing for a plain Black reply.
    pub fn label(self, forced: bool) -> Option<String> {
        match self.color {
            Color::White => Some(format!("{}.", self.number)),
            Color::Black if forced => Some(format!("{}...", self.number)),
            Color::Black => None,
        }
    }

    pub fn move_text(self, forced: bool, san: &str) -> String {
        match self.label(forced) {
            Some(label) => format!("{label} {san}"),
            None => san.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntry {
    /// SAN with its move number, e.g. `2... Nc6`.
    pub text: String,
    pub san: String,
    pub annotation: String,
    /// Child index at every step from the root; what the client sends back
    /// to jump to this move.
    pub line: Vec<usize>,
    #[serde(skip)]
    pub path: MovePath,
    pub variation_depth: usize,
    pub is_main_line: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DisplayEntry {
    Move(MoveEntry),
    VariationStart { depth: usize },
    VariationEnd { depth: usize },
    Result { text: String },
}

impl DisplayEntry {
    /// Text as it would appear in a plain move list.
    pub fn text(&self) -> &str {
        match self {
            DisplayEntry::Move(m) => &m.text,
            DisplayEntry::VariationStart { .. } => "(",
            DisplayEntry::VariationEnd { .. } => ")",
            DisplayEntry::Result { text } => text,
        }
    }

    pub fn as_move(&self) -> Option<&MoveEntry> {
        match self {
            DisplayEntry::Move(m) => Some(m),
            _ => None,
        }
    }
}

/// Depth-first, main line first: each node's main continuation, then its
/// variations in brackets, then the rest of the main line.
pub fn render_move_list(tree: &MoveTree, result: GameResult) -> Vec<DisplayEntry> {
    let mut renderer = Renderer {
        tree,
        entries: Vec::new(),
    };
    renderer.walk(tree.root(), &tree.root_path(), Turn::at_root(tree), 0, true, true);

    if result.is_decided() {
        renderer.entries.push(DisplayEntry::Result {
            text: result.to_string(),
        });
    }
    renderer.entries
}

struct Renderer<'a> {
    tree: &'a MoveTree,
    entries: Vec<DisplayEntry>,
}

impl Renderer<'_> {
    fn walk(&mut self, node: NodeId, path: &MovePath, turn: Turn, depth: usize, main_line: bool, forced: bool) {
        let children = self.tree.node(node).children();
        let Some(&main) = children.first() else {
            return;
        };

        let main_path = path.extended(main);
        self.push_move(&main_path, turn, forced, depth, main_line);

        for &variation in &children[1..] {
            self.entries.push(DisplayEntry::VariationStart { depth });
            let var_path = path.extended(variation);
            self.push_move(&var_path, turn, true, depth + 1, false);
            self.walk(variation, &var_path, turn.next(), depth + 1, false, false);
            self.entries.push(DisplayEntry::VariationEnd { depth });
        }

        self.walk(main, &main_path, turn.next(), depth, main_line, children.len() > 1);
    }

    fn push_move(&mut self, path: &MovePath, turn: Turn, forced: bool, depth: usize, main_line: bool) {
        let node = self.tree.node(path.last());
        let san = node.san().unwrap_or_default();
        self.entries.push(DisplayEntry::Move(MoveEntry {
            text: turn.move_text(forced, san),
            san: san.to_string(),
            annotation: node.annotation().to_string(),
            line: self.tree.line_of(path),
            path: path.clone(),
            variation_depth: depth,
            is_main_line: main_line,
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pgn::import_pgn;

    fn texts(entries: &[DisplayEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.text()).collect()
    }

    #[test]
    fn test_numbering_around_variation() {
        let game = import_pgn("1. e4 e5 2. Nf3 (2. Bc4 Nc6) 2... Nc6 *").unwrap();
        let entries = render_move_list(&game.tree, game.result);
        assert_eq!(
            texts(&entries),
            vec!["1. e4", "e5", "2. Nf3", "(", "2. Bc4", "Nc6", ")", "2... Nc6"]
        );

        assert_eq!(entries[3], DisplayEntry::VariationStart { depth: 0 });
        let bc4 = entries[4].as_move().unwrap();
        assert_eq!(bc4.variation_depth, 1);
        assert!(!bc4.is_main_line);
        assert_eq!(bc4.line, vec![0, 0, 1]);
        let last = entries[7].as_move().unwrap();
        assert!(last.is_main_line);
        assert_eq!(last.line, vec![0, 0, 0, 0]);
        assert_eq!(last.path.len(), 5);
    }

    #[test]
    fn test_black_variation_numbered() {
        let game = import_pgn("1. e4 e5 (1... c5 2. Nf3) 2. Nf3 *").unwrap();
        let entries = render_move_list(&game.tree, game.result);
        assert_eq!(
            texts(&entries),
            vec!["1. e4", "e5", "(", "1... c5", "2. Nf3", ")", "2. Nf3"]
        );
    }

    #[test]
    fn test_result_token_appended() {
        let game = import_pgn("1. e4 e5 1-0").unwrap();
        let entries = render_move_list(&game.tree, game.result);
        assert_eq!(entries.last(), Some(&DisplayEntry::Result { text: "1-0".to_string() }));

        let game = import_pgn("1. e4 e5 *").unwrap();
        let entries = render_move_list(&game.tree, game.result);
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn test_black_to_move_start() {
        let pgn = "[SetUp \"1\"]\n[FEN \"4k3/8/8/8/8/8/4P3/4K3 b - - 0 30\"]\n\n30... Kd7 31. e4 *";
        let game = import_pgn(pgn).unwrap();
        let entries = render_move_list(&game.tree, game.result);
        assert_eq!(texts(&entries), vec!["30... Kd7", "31. e4"]);
    }

    #[test]
    fn test_annotation_carried_inline() {
        let game = import_pgn("1. e4 {best by test} e5 *").unwrap();
        let entries = render_move_list(&game.tree, game.result);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].as_move().unwrap().annotation, "best by test");
        assert_eq!(entries[1].as_move().unwrap().annotation, "");
    }

    #[test]
    fn test_json_shape() {
        let game = import_pgn("1. e4 (1. d4) 1... e5 *").unwrap();
        let entries = render_move_list(&game.tree, game.result);
        let json = serde_json::to_value(&entries).unwrap();
        assert_eq!(json[0]["kind"], "move");
        assert_eq!(json[0]["text"], "1. e4");
        assert_eq!(json[0]["isMainLine"], true);
        assert_eq!(json[1]["kind"], "variationStart");
        assert_eq!(json[2]["line"], serde_json::json!([1]));
        assert_eq!(json[2]["variationDepth"], 1);
        assert!(json[2].get("path").is_none());
        assert_eq!(json[4]["text"], "1... e5");
    }

    #[test]
    fn test_empty_tree() {
        let tree = MoveTree::new();
        assert!(render_move_list(&tree, GameResult::Ongoing).is_empty());
    }
}
