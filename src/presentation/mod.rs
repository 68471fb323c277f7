//! HTML views and askama templates.

pub mod views;
