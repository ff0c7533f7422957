//! Protocol decoding modules.
//!
//! Each protocol follows a layered structure:
//! - `layout`: byte offsets and ranges (source of truth)
//! - `reader`: safe byte access and protocol conventions
//! - `parser`: domain-level decoding (no direct byte indexing)
//! - `error`: explicit, actionable errors
//!
//! Parsers are pure and contain no I/O; the decode session owns buffering
//! and cross-frame state.

pub(crate) mod common;
pub mod frame;
pub mod odometry;
pub mod ultra;
pub mod xv;
