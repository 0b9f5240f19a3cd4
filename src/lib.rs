//! Teamchat - a team chat server
//!
//! This crate provides the core functionality for the Teamchat server:
//! per-user chat sessions, admin-managed group chats with membership-based
//! access control, and turn orchestration against a hosted LLM workflow
//! endpoint.

pub mod chat;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
