//! Strapi REST client: collection queries, the class tree fetch, and
//! single-entity page lookups.
//!
//! This crate provides:
//! - [`CollectionQuery`]: bracketed filter/fields/populate query builder
//! - [`CmsClient`]: HTTP client bound to one validated [`CmsConfig`](lessonmap_shared::CmsConfig)

pub mod client;
pub mod query;

pub use client::CmsClient;
pub use query::CollectionQuery;
