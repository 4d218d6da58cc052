pub mod common;
pub mod hand;
pub mod session;
pub mod summary;
