//! Normalization of Strapi responses into the canonical content tree.
//!
//! This crate provides:
//! - [`record`]: shape detection and per-field readers over one raw record
//! - [`entity`]: class/module/lesson normalizers
//! - [`tree`]: list response → ordered Class → Module → Lesson tree
//! - [`page`]: single-entity page records (lesson, chapter)
//!
//! Everything here is synchronous and pure. Data-shape problems never
//! surface as errors: fields fall back to defaults and records without
//! identity are dropped.

pub mod entity;
pub mod page;
pub mod record;
pub mod tree;

pub use entity::{EntityKind, fallback_module_slug, normalize_class, normalize_lesson, normalize_module};
pub use page::{absolute_media_url, belongs_to_class, normalize_lesson_page, normalize_module_page};
pub use record::{RawRecord, Shape, coerce_id};
pub use tree::{assemble_tree, first_record, response_records};
