//! Strapi collection query builder.
//!
//! Strapi reads nested options from qs-style bracketed keys:
//! - `filters[slug][$eq]=statics`
//! - `fields[0]=title`
//! - `populate[modules][populate]=lessons`
//! - `populate[module][populate][class][fields][0]=slug`
//!
//! [`CollectionQuery`] collects those pairs in order; percent-encoding is left
//! to `url` when the pairs are applied to a request URL.

use url::Url;

/// Ordered list of bracketed query pairs for one collection request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionQuery {
    pairs: Vec<(String, String)>,
}

impl CollectionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match filter: `filters[{field}][$eq]={value}`.
    pub fn filter_eq(mut self, field: &str, value: &str) -> Self {
        self.pairs
            .push((format!("filters[{field}][$eq]"), value.to_owned()));
        self
    }

    /// Restrict top-level scalar fields: `fields[i]={field}`.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for (i, field) in fields.iter().enumerate() {
            self.pairs.push((format!("fields[{i}]"), (*field).to_owned()));
        }
        self
    }

    /// Populate a relation chain, e.g. `["modules", "lessons"]` →
    /// `populate[modules][populate]=lessons`. A single-element path becomes
    /// `populate={relation}`.
    pub fn populate(mut self, path: &[&str]) -> Self {
        match path.split_last() {
            Some((last, [])) => self.pairs.push(("populate".to_owned(), (*last).to_owned())),
            Some((last, parents)) => self
                .pairs
                .push((format!("{}[populate]", populate_prefix(parents)), (*last).to_owned())),
            None => {}
        }
        self
    }

    /// Populate a relation chain restricted to some fields, e.g.
    /// `(["module", "class"], ["slug"])` →
    /// `populate[module][populate][class][fields][0]=slug`.
    pub fn populate_fields(mut self, path: &[&str], fields: &[&str]) -> Self {
        if path.is_empty() {
            return self;
        }
        let prefix = populate_prefix(path);
        for (i, field) in fields.iter().enumerate() {
            self.pairs
                .push((format!("{prefix}[fields][{i}]"), (*field).to_owned()));
        }
        self
    }

    /// Append an arbitrary top-level pair (e.g. `publicationState`).
    pub fn param(mut self, key: &str, value: &str) -> Self {
        self.pairs.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Append the pairs to `url`'s query string.
    pub fn apply(&self, url: &mut Url) {
        if self.pairs.is_empty() {
            return;
        }
        url.query_pairs_mut().extend_pairs(
            self.pairs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str())),
        );
    }
}

/// `populate[a][populate][b]...` for a non-empty relation path.
fn populate_prefix(path: &[&str]) -> String {
    let mut prefix = String::from("populate");
    for (i, relation) in path.iter().enumerate() {
        if i > 0 {
            prefix.push_str("[populate]");
        }
        prefix.push('[');
        prefix.push_str(relation);
        prefix.push(']');
    }
    prefix
}
