//! Portfolio and blog server: markdown content rendered through a
//! per-node-kind renderer table, plus chat-webhook notifications.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
