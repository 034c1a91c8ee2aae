//! Shared types, error model, and configuration for lessonmap.
//!
//! This crate is the foundation depended on by all other lessonmap crates.
//! It provides:
//! - [`LessonmapError`]: the unified error type
//! - Canonical content types ([`ClassItem`], [`ModuleItem`], [`LessonItem`], [`EntityId`])
//!   and page records ([`LessonPage`], [`ModulePage`])
//! - Configuration ([`AppConfig`], [`CmsConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CmsConfig, CmsSection, PublicationState, SidebarSection, config_dir,
    config_file_path, init_config, load_config, load_config_from, sidebar_state_path,
};
pub use error::{LessonmapError, Result};
pub use types::{ClassItem, EntityId, LessonItem, LessonPage, ModuleItem, ModulePage};
