//! Chess notation core: PGN import/export, the annotated move tree and the
//! display move list built from it.

pub mod error;
pub mod export;
pub mod game_data;
pub mod move_list;
pub mod move_tree;
pub mod navigator;
pub mod pgn;
pub mod position;

pub use error::CoreError;
pub use export::{export_pgn, infer_result};
pub use game_data::{note_title, GameHeaders, GameResult};
pub use move_list::{render_move_list, DisplayEntry, MoveEntry};
pub use move_tree::{MoveNode, MovePath, MoveTree, NodeId};
pub use pgn::{import_or_empty, import_pgn, import_pgn_strict, ImportedGame};

pub use shakmaty::{Chess, Color};
