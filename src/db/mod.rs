//! Persistence layer for the taskboard service.
//!
//! Built on an embedded SQLite store. The connection is opened explicitly
//! once at startup from resolved credentials; when that fails the service
//! falls back to a disposable in-memory store instead of refusing to start.

/// Connection management: open from credentials, or fall back in memory.
pub mod db;

/// The task table and its operations.
///
/// Fetch, insert, partial update, delete and batch reordering over the
/// single `tasks` table.
pub mod tasks;
