//! PGN import: tag pairs + movetext (comments, nested variations) into a
//! [`MoveTree`].
//!
//! Tokenizing is left to `pgn-reader`; this module only checks that the text
//! is structurally balanced and turns the visitor callbacks into tree nodes.

use std::ops::ControlFlow;

use pgn_reader::{RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use tracing::debug;

use crate::error::CoreError;
use crate::game_data::{GameHeaders, GameResult};
use crate::move_tree::{MoveTree, NodeId};
use crate::position;

/// A fully imported game.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedGame {
    pub tree: MoveTree,
    pub headers: GameHeaders,
    pub result: GameResult,
}

impl ImportedGame {
    /// Empty game at the standard starting position.
    pub fn empty() -> Self {
        Self {
            tree: MoveTree::new(),
            headers: GameHeaders::new(),
            result: GameResult::Ongoing,
        }
    }
}

/// Import a PGN game. Illegal plies are skipped and the following plies are
/// attached to the last legal node.
pub fn import_pgn(pgn: &str) -> Result<ImportedGame, CoreError> {
    import(pgn, false)
}

/// Import a PGN game, failing on the first illegal ply.
pub fn import_pgn_strict(pgn: &str) -> Result<ImportedGame, CoreError> {
    import(pgn, true)
}

/// Import, falling back to an empty game on failure. The error is handed
/// back so the caller can surface it as a warning.
pub fn import_or_empty(pgn: &str) -> (ImportedGame, Option<CoreError>) {
    match import_pgn(pgn) {
        Ok(game) => (game, None),
        Err(e) => {
            debug!(error = %e, "falling back to an empty game");
            (ImportedGame::empty(), Some(e))
        }
    }
}

fn import(pgn: &str, strict: bool) -> Result<ImportedGame, CoreError> {
    check_balanced(pgn)?;

    let mut builder = TreeBuilder { strict };
    let mut reader = Reader::new(pgn.as_bytes());
    let (tree, headers) = reader
        .read_game(&mut builder)
        .map_err(|e| CoreError::parse(format!("read error: {e}")))?
        .ok_or_else(|| CoreError::parse("no game found"))??;

    Ok(ImportedGame {
        tree,
        headers,
        result: GameResult::from_pgn_tail(pgn),
    })
}

/// Reject text whose comments, variations or tag pairs are not closed.
fn check_balanced(pgn: &str) -> Result<(), CoreError> {
    let mut depth = 0usize;
    let mut in_comment = false;
    let mut in_tag = false;
    let mut in_quote = false;
    let mut line_comment = false;

    for (offset, c) in pgn.char_indices() {
        if line_comment {
            line_comment = c != '\n';
            continue;
        }
        if in_comment {
            in_comment = c != '}';
            continue;
        }
        if in_quote {
            match c {
                '"' => in_quote = false,
                '\n' => return Err(CoreError::parse(format!("unterminated tag value at {offset}"))),
                _ => {}
            }
            continue;
        }
        if in_tag {
            match c {
                '"' => in_quote = true,
                ']' => in_tag = false,
                _ => {}
            }
            continue;
        }
        match c {
            '{' => in_comment = true,
            '}' => return Err(CoreError::parse(format!("unmatched '}}' at {offset}"))),
            ';' => line_comment = true,
            '[' => in_tag = true,
            ']' => return Err(CoreError::parse(format!("unmatched ']' at {offset}"))),
            '(' => depth += 1,
            ')' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CoreError::parse(format!("unmatched ')' at {offset}")))?;
            }
            _ => {}
        }
    }

    if in_comment {
        return Err(CoreError::parse("unterminated comment"));
    }
    if in_tag || in_quote {
        return Err(CoreError::parse("unterminated tag pair"));
    }
    if depth > 0 {
        return Err(CoreError::parse("unterminated variation"));
    }
    Ok(())
}

struct TreeBuilder {
    strict: bool,
}

struct BuildState {
    tree: MoveTree,
    headers: GameHeaders,
    /// Node the next ply is attached to.
    current: NodeId,
    /// The previous ply was illegal and skipped, so `current` already holds
    /// the position that ply was played from.
    skipped: bool,
    /// Open variations, innermost last.
    variations: Vec<OpenVariation>,
    /// Comment seen at the start of a variation, before its first ply.
    pending_comment: Option<String>,
    ply: usize,
}

struct OpenVariation {
    /// Node to return to when the variation closes.
    resume: NodeId,
    /// Node the variation's first ply is attached to.
    branch: NodeId,
    /// `skipped` as it was when the variation opened.
    skipped: bool,
}

type BuildOutput = Result<(MoveTree, GameHeaders), CoreError>;

impl Visitor for TreeBuilder {
    type Tags = GameHeaders;
    type Movetext = BuildState;
    type Output = BuildOutput;

    fn begin_tags(&mut self) -> ControlFlow<BuildOutput, GameHeaders> {
        ControlFlow::Continue(GameHeaders::new())
    }

    fn tag(&mut self, tags: &mut GameHeaders, name: &[u8], value: RawTag<'_>) -> ControlFlow<BuildOutput> {
        let name = String::from_utf8_lossy(name).into_owned();
        tags.set(name, value.decode_utf8_lossy().into_owned());
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, headers: GameHeaders) -> ControlFlow<BuildOutput, BuildState> {
        let tree = match headers.setup_fen() {
            Some(fen) => match position::parse_fen(fen) {
                Ok(start) => MoveTree::from_position(start),
                Err(e) => return ControlFlow::Break(Err(e)),
            },
            None => MoveTree::new(),
        };
        let root = tree.root();
        ControlFlow::Continue(BuildState {
            tree,
            headers,
            current: root,
            skipped: false,
            variations: Vec::new(),
            pending_comment: None,
            ply: 0,
        })
    }

    fn san(&mut self, state: &mut BuildState, san_plus: SanPlus) -> ControlFlow<BuildOutput> {
        state.ply += 1;
        let text = san_plus.san.to_string();
        let before = state.tree.node(state.current).position();

        let Some(mv) = position::san_to_move(before, &text) else {
            if self.strict {
                return ControlFlow::Break(Err(CoreError::IllegalMove {
                    san: text,
                    ply: state.ply,
                }));
            }
            debug!(san = %text, ply = state.ply, "skipping illegal ply");
            state.skipped = true;
            return ControlFlow::Continue(());
        };

        let (san, after) = position::play(before, mv);
        let node = state.tree.push_child(state.current, san, after);
        if let Some(comment) = state.pending_comment.take() {
            state.tree.append_annotation(node, &comment);
        }
        state.current = node;
        state.skipped = false;
        ControlFlow::Continue(())
    }

    fn comment(&mut self, state: &mut BuildState, comment: RawComment<'_>) -> ControlFlow<BuildOutput> {
        let text = String::from_utf8_lossy(comment.as_bytes());
        let text = text.trim();
        if text.is_empty() {
            return ControlFlow::Continue(());
        }
        if is_branch_point(state) {
            match state.pending_comment.as_mut() {
                Some(pending) => {
                    pending.push(' ');
                    pending.push_str(text);
                }
                None => state.pending_comment = Some(text.to_string()),
            }
        } else {
            state.tree.append_annotation(state.current, text);
        }
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, state: &mut BuildState) -> ControlFlow<BuildOutput, Skip> {
        // A variation replaces the last ply, so it branches from the position
        // before it. After a skipped ply that position is `current` itself.
        let branch = if state.skipped {
            Some(state.current)
        } else {
            state.tree.node(state.current).parent()
        };
        let Some(branch) = branch else {
            return ControlFlow::Continue(Skip(true));
        };
        state.variations.push(OpenVariation {
            resume: state.current,
            branch,
            skipped: state.skipped,
        });
        state.current = branch;
        state.skipped = false;
        state.pending_comment = None;
        ControlFlow::Continue(Skip(false))
    }

    fn end_variation(&mut self, state: &mut BuildState) -> ControlFlow<BuildOutput> {
        if let Some(open) = state.variations.pop() {
            state.current = open.resume;
            state.skipped = open.skipped;
        }
        state.pending_comment = None;
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, state: BuildState) -> BuildOutput {
        Ok((state.tree, state.headers))
    }
}

/// True while no ply has been played inside the innermost open variation,
/// i.e. `current` is still the node the variation branched from.
fn is_branch_point(state: &BuildState) -> bool {
    state.variations.last().map(|open| open.branch) == Some(state.current)
}
