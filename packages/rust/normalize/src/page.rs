//! Page-level normalizers for single-entity lookups.
//!
//! These build on the per-entity normalizers and add the fields only a page
//! needs: lesson body, video, chapter objectives, and the owning class slug
//! used to reject a lesson requested under the wrong class.

use lessonmap_shared::{LessonPage, ModulePage};
use serde_json::Value;

use crate::entity::{normalize_lesson, normalize_module};
use crate::record::RawRecord;

const SLUG: &str = "slug";
const TEXT_CONTENT: &str = "textContent";
const OBJECTIVE: &str = "objective";
const MODULE: &str = "module";
const CLASS: &str = "class";
const VIDEO: &str = "video";
const URL: &str = "url";

/// Normalize a lesson record populated with `module.class` and `video`.
///
/// `base` is the CMS base address used to absolutize relative media URLs.
pub fn normalize_lesson_page(raw: &Value, base: &str) -> Option<LessonPage> {
    let lesson = normalize_lesson(raw)?;
    let record = RawRecord::new(raw)?;
    let module = record.related(MODULE);

    Some(LessonPage {
        lesson,
        text_content: record.string(TEXT_CONTENT).unwrap_or_default().to_owned(),
        video_url: record
            .related(VIDEO)
            .and_then(|video| video.text(URL))
            .map(|url| absolute_media_url(base, url)),
        objective: module.and_then(|m| m.text(OBJECTIVE)).map(str::to_owned),
        module_slug: module.and_then(|m| m.text(SLUG)).map(str::to_owned),
        class_slug: module
            .and_then(|m| m.related(CLASS))
            .and_then(|c| c.text(SLUG))
            .map(str::to_owned),
    })
}

/// Normalize a module record populated with `class` and `lessons`.
pub fn normalize_module_page(raw: &Value) -> Option<ModulePage> {
    let record = RawRecord::new(raw)?;
    let class_slug = record
        .related(CLASS)
        .and_then(|c| c.text(SLUG))
        .map(str::to_owned);
    let module = normalize_module(raw, class_slug.as_deref().unwrap_or_default())?;

    Some(ModulePage {
        module,
        objective: record.text(OBJECTIVE).map(str::to_owned),
        class_slug,
    })
}

/// Whether a page's resolved class slug matches the class in the request path.
/// Comparison ignores case; an unresolved class slug never matches.
pub fn belongs_to_class(resolved: Option<&str>, requested: &str) -> bool {
    resolved.is_some_and(|slug| slug.to_lowercase() == requested.to_lowercase())
}

/// Prefix CMS-relative media paths (`/uploads/...`) with the CMS base address.
pub fn absolute_media_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        return url.to_owned();
    }

    let base = base.trim_end_matches('/');
    if url.starts_with('/') {
        format!("{base}{url}")
    } else {
        format!("{base}/{url}")
    }
}
