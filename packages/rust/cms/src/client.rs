//! HTTP client for the Strapi REST API.
//!
//! One GET per call, no caching, no retries. Tree fetches degrade to an
//! empty tree and single-entity lookups to `None`; the caller decides what
//! the reader sees.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use lessonmap_normalize::{
    assemble_tree, belongs_to_class, first_record, normalize_class, normalize_lesson_page,
    normalize_module_page,
};
use lessonmap_shared::{
    ClassItem, CmsConfig, LessonPage, LessonmapError, ModulePage, Result,
};

use crate::query::CollectionQuery;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for CMS requests.
const USER_AGENT: &str = concat!("lessonmap/", env!("CARGO_PKG_VERSION"));

/// Collection endpoints.
const CLASSES: &str = "classes";
const MODULES: &str = "modules";
const LESSONS: &str = "lessons";

/// Client bound to one CMS base address.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct CmsClient {
    config: CmsConfig,
    client: Client,
}

impl CmsClient {
    /// Build a client from validated configuration.
    pub fn new(config: CmsConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LessonmapError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &CmsConfig {
        &self.config
    }

    /// `{base}/api/{collection}?{query}&publicationState=...`
    pub fn collection_url(&self, collection: &str, query: &CollectionQuery) -> Result<Url> {
        let raw = format!(
            "{}/api/{}",
            self.config.base(),
            collection.trim_start_matches('/')
        );
        let mut url = Url::parse(&raw)
            .map_err(|e| LessonmapError::config(format!("invalid collection URL '{raw}': {e}")))?;

        query
            .clone()
            .param("publicationState", self.config.publication_state.as_str())
            .apply(&mut url);

        Ok(url)
    }

    /// GET a collection and decode the JSON body.
    #[instrument(skip_all, fields(collection = %collection))]
    pub async fn get_collection(&self, collection: &str, query: &CollectionQuery) -> Result<Value> {
        let url = self.collection_url(collection, query)?;
        debug!(%url, "fetching collection");

        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| LessonmapError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LessonmapError::Network(format!("{url}: HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LessonmapError::Network(format!("{url}: failed to read body: {e}")))?;

        serde_json::from_str(&body)
            .map_err(|e| LessonmapError::parse(format!("{url}: body is not JSON: {e}")))
    }

    // -----------------------------------------------------------------------
    // Navigation tree
    // -----------------------------------------------------------------------

    /// Fetch and assemble the full class tree, surfacing fetch failures.
    pub async fn try_classes_tree(&self) -> Result<Vec<ClassItem>> {
        let query = CollectionQuery::new().populate(&[MODULES, LESSONS]);
        let body = self.get_collection(CLASSES, &query).await?;
        let tree = assemble_tree(&body);
        info!(classes = tree.len(), "class tree fetched");
        Ok(tree)
    }

    /// Fetch and assemble the full class tree. Any failure is an empty tree.
    pub async fn classes_tree(&self) -> Vec<ClassItem> {
        match self.try_classes_tree().await {
            Ok(tree) => tree,
            Err(e) => {
                warn!(error = %e, "class tree unavailable, using empty tree");
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Single-entity lookups
    // -----------------------------------------------------------------------

    /// One class with its modules and lessons, by exact slug.
    #[instrument(skip(self))]
    pub async fn class_by_slug(&self, slug: &str) -> Option<ClassItem> {
        let query = CollectionQuery::new()
            .filter_eq("slug", slug)
            .fields(&["title", "slug", "description"])
            .populate(&[MODULES, LESSONS]);

        let body = self.first_match(CLASSES, &query).await?;
        normalize_class(&body)
    }

    /// One lesson by slug, only if it belongs to `class_slug`.
    #[instrument(skip(self))]
    pub async fn lesson(&self, class_slug: &str, lesson_slug: &str) -> Option<LessonPage> {
        let query = CollectionQuery::new()
            .filter_eq("slug", lesson_slug)
            .fields(&["title", "textContent", "slug"])
            .populate_fields(&["module"], &["slug", "objective"])
            .populate_fields(&["module", "class"], &["slug"])
            .populate_fields(&["video"], &["url"]);

        let body = self.first_match(LESSONS, &query).await?;
        let page = normalize_lesson_page(&body, self.config.base())?;

        if !belongs_to_class(page.class_slug.as_deref(), class_slug) {
            debug!(
                resolved = page.class_slug.as_deref().unwrap_or("<none>"),
                "lesson belongs to another class"
            );
            return None;
        }
        Some(page)
    }

    /// One chapter (module) overview by slug, only if it belongs to `class_slug`.
    #[instrument(skip(self))]
    pub async fn chapter(&self, class_slug: &str, chapter_slug: &str) -> Option<ModulePage> {
        let query = CollectionQuery::new()
            .filter_eq("slug", chapter_slug)
            .fields(&["title", "slug", "objective"])
            .populate_fields(&["class"], &["slug"])
            .populate_fields(&["lessons"], &["title", "slug"]);

        let body = self.first_match(MODULES, &query).await?;
        let page = normalize_module_page(&body)?;

        if !belongs_to_class(page.class_slug.as_deref(), class_slug) {
            debug!(
                resolved = page.class_slug.as_deref().unwrap_or("<none>"),
                "chapter belongs to another class"
            );
            return None;
        }
        Some(page)
    }

    /// First record of a filtered collection, or `None` on any failure.
    async fn first_match(&self, collection: &str, query: &CollectionQuery) -> Option<Value> {
        let body = match self.get_collection(collection, query).await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "lookup failed, treating as not found");
                return None;
            }
        };

        let first = first_record(&body).cloned();
        if first.is_none() {
            debug!("no matching record");
        }
        first
    }
}
