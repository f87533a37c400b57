//! Application layer logic for todolist.
//!
//! This crate provides the task service, configuration, query construction
//! and card rendering shared by the command-line interface.

pub mod config;
pub mod filter_util;
pub mod render;
pub mod service;

// Re-exports for convenience
pub use config::{ProjectConfig, StorageConfig, ViewConfig, default_store_path};
pub use filter_util::{FilterBuildError, FilterBuildResult, ViewQueryBuilder, parse_filter_tokens};
pub use render::{escape_html, render_card, render_cards, status_class};
pub use service::{CreateTaskInput, ServiceError, TaskService};
