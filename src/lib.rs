//! # Taskboard
//!
//! A small task tracker service: REST endpoints over a single task table,
//! plus a server-rendered list view.
//!
//! ## Features
//!
//! - **Task CRUD**: Create, list, update and delete tasks over HTTP
//! - **Display ordering**: Client-controlled positions with batch reordering
//! - **Health Checks**: Store connectivity and row count reporting
//! - **Secret Providers**: Credentials from a local file or a managed vault
//! - **Resilient Startup**: Falls back to an in-memory store when the
//!   configured store is unreachable

pub mod db;
pub mod libs;
pub mod server;
