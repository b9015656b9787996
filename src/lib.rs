//! homeguard — home-security console simulator library.
//!
//! The access controller (credentials, lockout, guest window, owner
//! override) lives in `access` and performs no I/O. The `cli` module is the
//! terminal shell around it; `audit` persists the events it emits.
//! The binary entrypoint is in `main.rs`.

pub mod access;
pub mod audit;
pub mod cli;
pub mod config;
pub mod utils;
