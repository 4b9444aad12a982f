//! Circulib - library circulation core
//!
//! Tracks circulating copies (books and discs), enforces borrowing rules,
//! computes tier-based overdue fines, persists the catalog to a line-oriented
//! text store, and notifies borrowers of overdue copies through pluggable
//! delivery channels.

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod store;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
