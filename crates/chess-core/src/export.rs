//! Serialize a move tree back to PGN text.

use shakmaty::{Color, Position};

use crate::game_data::{GameHeaders, GameResult};
use crate::move_list::Turn;
use crate::move_tree::{MoveTree, NodeId};
use crate::position;

/// Full PGN: seven-tag header block, then movetext with comments and nested
/// variations, then the result token.
///
/// An undecided result is inferred from the final main-line position
/// (checkmate, stalemate, insufficient material, fifty-move rule, threefold
/// repetition) before being written.
pub fn export_pgn(tree: &MoveTree, result: GameResult, headers: &GameHeaders) -> String {
    let result = infer_result(tree, result);
    let header_block = header_lines(tree, result, headers).join("\n");

    let body = movetext(tree);
    if body.is_empty() && !result.is_decided() {
        return header_block;
    }
    let tail = format!("{body} {}", result.as_str());
    format!("{header_block}\n\n{}", tail.trim())
}

/// Movetext only, without headers or result.
pub fn movetext(tree: &MoveTree) -> String {
    let mut tokens = Vec::new();
    let root_note = tree.node(tree.root()).annotation();
    if !root_note.is_empty() {
        tokens.push(comment(root_note));
    }
    write_line(tree, tree.root(), Turn::at_root(tree), true, &mut tokens);
    tokens.join(" ")
}

/// Keep a decided result, otherwise derive one from the end of the main line.
pub fn infer_result(tree: &MoveTree, result: GameResult) -> GameResult {
    if result.is_decided() {
        return result;
    }
    let main = tree.main_line();
    let end = tree.node(main.last()).position();

    if end.is_checkmate() {
        return match end.turn() {
            Color::White => GameResult::BlackWins,
            Color::Black => GameResult::WhiteWins,
        };
    }
    let repetitions = {
        let key = repetition_key(&tree.node(main.last()).fen());
        main.nodes()
            .iter()
            .filter(|&&id| repetition_key(&tree.node(id).fen()) == key)
            .count()
    };
    if end.is_stalemate() || end.is_insufficient_material() || end.halfmoves() >= 100 || repetitions >= 3 {
        return GameResult::Draw;
    }
    GameResult::Ongoing
}

/// Tags written from the tree and result rather than copied from the source.
const WRITTEN_TAGS: [&str; 9] = [
    "Event", "White", "Black", "WhiteElo", "BlackElo", "Date", "Result", "SetUp", "FEN",
];

fn header_lines(tree: &MoveTree, result: GameResult, headers: &GameHeaders) -> Vec<String> {
    let mut lines = vec![
        tag("Event", headers.event()),
        tag("White", headers.white()),
        tag("Black", headers.black()),
        tag("WhiteElo", headers.white_elo()),
        tag("BlackElo", headers.black_elo()),
        tag("Date", headers.date().unwrap_or("????.??.??")),
        tag("Result", result.as_str()),
    ];
    let start = tree.start_position();
    if !position::is_standard_start(start) {
        lines.push(tag("SetUp", "1"));
        lines.push(tag("FEN", &position::fen_of(start)));
    }
    lines.extend(
        headers
            .iter()
            .filter(|(name, _)| !WRITTEN_TAGS.contains(name))
            .map(|(name, value)| tag(name, value)),
    );
    lines
}

fn tag(name: &str, value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("[{name} \"{escaped}\"]")
}

fn comment(text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' => ' ',
            '}' => ')',
            other => other,
        })
        .collect();
    format!("{{{}}}", flat.trim())
}

fn push_move(tree: &MoveTree, id: NodeId, turn: Turn, forced: bool, tokens: &mut Vec<String>) {
    let node = tree.node(id);
    tokens.push(turn.move_text(forced, node.san().unwrap_or_default()));
    if !node.annotation().is_empty() {
        tokens.push(comment(node.annotation()));
    }
}

fn write_line(tree: &MoveTree, node: NodeId, turn: Turn, forced: bool, tokens: &mut Vec<String>) {
    let children = tree.node(node).children();
    let Some(&main) = children.first() else {
        return;
    };
    push_move(tree, main, turn, forced, tokens);

    for &variation in &children[1..] {
        let mut inner = Vec::new();
        push_move(tree, variation, turn, true, &mut inner);
        write_line(tree, variation, turn.next(), false, &mut inner);
        tokens.push(format!("({})", inner.join(" ")));
    }

    write_line(tree, main, turn.next(), children.len() > 1, tokens);
}

/// Board, side to move, castling rights and en passant square.
fn repetition_key(fen: &str) -> String {
    fen.split_whitespace().take(4).collect::<Vec<_>>().join(" ")
}
