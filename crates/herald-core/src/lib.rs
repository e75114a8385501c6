//! herald-core
//!
//! Bulk-dispatch task queue for an HR messaging assistant.
//!
//! # モジュール構成
//! - **domain**: ids, batch counters, progress views, recipients / messages
//! - **ports**: Clock, IdGenerator, MessageSender, ItemHandler
//! - **queue**: TaskQueue (single-concurrency, pause / cancel / reset)
//! - **dispatch**: BatchDispatcher, pacing jitter, send_with_timeout
//! - **control**: progress / control façade for the HTTP layer
//! - **campaign**: regional broadcasts and payslip links
//! - **config**: TOML configuration
//! - **impls**: development implementations of the ports

pub mod campaign;
pub mod config;
pub mod control;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod queue;

pub use error::{ErrorKind, HeraldError};
