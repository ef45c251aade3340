pub mod analysis;
pub mod mistakes;
pub mod notes;
pub mod pool;
pub mod users;
