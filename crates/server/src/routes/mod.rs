pub mod analysis;
pub mod auth;
pub mod chess;
pub mod health;
pub mod mistakes;
pub mod notes;
pub mod review;
