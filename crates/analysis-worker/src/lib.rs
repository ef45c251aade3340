pub mod config;
pub mod db;
pub mod error;
pub mod mistakes;
pub mod oracle;
pub mod stockfish;
