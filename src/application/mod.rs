//! Application services layer.

pub mod blog;
pub mod chrome;
pub mod error;
pub mod notify;
pub mod page;
pub mod render;
pub mod repos;
