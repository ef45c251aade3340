//! Thin wrappers over shakmaty, the rules oracle for everything in this crate.

use shakmaty::fen::Fen;
use shakmaty::san::San;
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, Move, Position};

use crate::error::CoreError;

pub const STANDARD_START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

pub fn parse_fen(fen: &str) -> Result<Chess, CoreError> {
    let parsed: Fen = fen
        .trim()
        .parse()
        .map_err(|e| CoreError::parse(format!("invalid FEN {fen:?}: {e}")))?;
    parsed
        .into_position::<Chess>(CastlingMode::Standard)
        .map_err(|e| CoreError::parse(format!("illegal FEN position {fen:?}: {e}")))
}

pub fn fen_of(pos: &Chess) -> String {
    Fen::from_position(pos, EnPassantMode::Legal).to_string()
}

pub fn is_standard_start(pos: &Chess) -> bool {
    fen_of(pos) == STANDARD_START_FEN
}

/// Resolve a SAN string in `pos`. `None` when it does not parse or is illegal.
pub fn san_to_move(pos: &Chess, san: &str) -> Option<Move> {
    let parsed: San = san.trim_end_matches(['+', '#', '!', '?']).parse().ok()?;
    parsed.to_move(pos).ok()
}

/// Resolve a physical board move (`e2`, `e4`, optional promotion piece).
///
/// The promotion piece is a hint: it is ignored when the move is not a
/// promotion, and a pawn reaching the last rank without one becomes a queen.
pub fn squares_to_move(pos: &Chess, from: &str, to: &str, promotion: Option<char>) -> Option<Move> {
    let base = format!("{}{}", from.trim(), to.trim()).to_ascii_lowercase();
    let hinted = promotion.map(|role| format!("{base}{}", role.to_ascii_lowercase()));
    let queen = promotion.is_none().then(|| format!("{base}q"));

    hinted
        .into_iter()
        .chain(Some(base.clone()))
        .chain(queen)
        .find_map(|uci| uci.parse::<UciMove>().ok()?.to_move(pos).ok())
}

/// Play a legal move, returning its SAN text (with `+`/`#` suffix) and the
/// resulting position.
pub fn play(pos: &Chess, mv: Move) -> (String, Chess) {
    let mut san = San::from_move(pos, mv.clone()).to_string();
    let mut next = pos.clone();
    next.play_unchecked(mv);
    if next.is_checkmate() {
        san.push('#');
    } else if next.is_check() {
        san.push('+');
    }
    (san, next)
}

/// Full-move number and side to move, as encoded in the position.
pub fn move_counter(pos: &Chess) -> (u32, Color) {
    (pos.fullmoves().get(), pos.turn())
}
