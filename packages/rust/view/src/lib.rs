//! Presentation helpers for the lesson navigation.
//!
//! This crate provides:
//! - [`SidebarState`] and [`outline`]: expand/collapse state and visible rows
//! - [`StateStore`]: where that state is persisted
//! - [`Route`]: slugs from the current site path
//! - [`extract_toc`]: the "on this page" headings of a body
//! - [`render_body`]: rich text vs. plain text, behind a [`Sanitizer`]

pub mod body;
pub mod route;
pub mod sidebar;
pub mod store;
pub mod toc;

pub use body::{Allowlist, RenderedBody, Sanitizer, TextOnly, looks_like_html, render_body};
pub use route::{Route, chapter_href, class_href, lesson_href};
pub use sidebar::{
    LessonOwner, LessonOwners, OPEN_CHAPTERS_KEY, OPEN_CLASSES_KEY, OutlineRow, RowKind,
    SidebarState, chapter_key, outline,
};
pub use store::{JsonFileStore, MemoryStore, StateStore};
pub use toc::{TocItem, extract_toc, heading_id};
