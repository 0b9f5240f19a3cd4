//! Entity module - SeaORM entity definitions
//!
//! One model per table; cross-entity lookups are explicit queries in the
//! handlers rather than relation derives.

pub mod group;
pub mod group_member;
pub mod group_message;
pub mod group_session;
pub mod message;
pub mod session;
pub mod user;
