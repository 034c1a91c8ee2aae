//! Sidebar expand/collapse state and the outline rendered from it.
//!
//! State is two keyed boolean maps: open classes (by class slug) and open
//! chapters (by `class/chapter`). It is persisted per user through a
//! [`StateStore`] and never touches the content tree itself.

use std::collections::{BTreeMap, HashMap};

use lessonmap_shared::{ClassItem, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::route::{Route, chapter_href, lesson_href};
use crate::store::StateStore;

/// Store key for the open-classes map.
pub const OPEN_CLASSES_KEY: &str = "sidebar:open-classes";

/// Store key for the open-chapters map.
pub const OPEN_CHAPTERS_KEY: &str = "sidebar:open-chapters";

/// Key of a chapter in the open-chapters map.
pub fn chapter_key(class_slug: &str, chapter_slug: &str) -> String {
    format!("{class_slug}/{chapter_slug}")
}

// ---------------------------------------------------------------------------
// LessonOwners
// ---------------------------------------------------------------------------

/// Where a lesson lives in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonOwner {
    pub class_slug: String,
    pub chapter_slug: String,
}

/// Index from lesson slug to its owning class and chapter.
#[derive(Debug, Clone, Default)]
pub struct LessonOwners {
    owners: HashMap<String, LessonOwner>,
}

impl LessonOwners {
    /// Index every lesson of `tree`. A slug seen twice keeps its last owner.
    pub fn from_tree(tree: &[ClassItem]) -> Self {
        let mut owners = HashMap::new();
        for class in tree {
            for module in &class.modules {
                for lesson in &module.lessons {
                    owners.insert(
                        lesson.slug.clone(),
                        LessonOwner {
                            class_slug: class.slug.clone(),
                            chapter_slug: module.slug.clone(),
                        },
                    );
                }
            }
        }
        Self { owners }
    }

    pub fn get(&self, lesson_slug: &str) -> Option<&LessonOwner> {
        self.owners.get(lesson_slug)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

// ---------------------------------------------------------------------------
// SidebarState
// ---------------------------------------------------------------------------

/// Expand/collapse state of the navigation sidebar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SidebarState {
    #[serde(default)]
    pub open_classes: BTreeMap<String, bool>,
    #[serde(default)]
    pub open_chapters: BTreeMap<String, bool>,
}

impl SidebarState {
    /// Read persisted state. Missing or corrupt entries start empty.
    pub fn restore(store: &impl StateStore) -> Self {
        Self {
            open_classes: read_map(store, OPEN_CLASSES_KEY),
            open_chapters: read_map(store, OPEN_CHAPTERS_KEY),
        }
    }

    /// Write both maps back to `store`.
    pub fn persist(&self, store: &mut impl StateStore) -> Result<()> {
        store.set(OPEN_CLASSES_KEY, encode_map(&self.open_classes))?;
        store.set(OPEN_CHAPTERS_KEY, encode_map(&self.open_chapters))
    }

    pub fn is_class_open(&self, class_slug: &str) -> bool {
        self.open_classes.get(class_slug).copied().unwrap_or(false)
    }

    pub fn is_chapter_open(&self, class_slug: &str, chapter_slug: &str) -> bool {
        self.open_chapters
            .get(&chapter_key(class_slug, chapter_slug))
            .copied()
            .unwrap_or(false)
    }

    /// Flip a class open/closed. Returns the new state.
    pub fn toggle_class(&mut self, class_slug: &str) -> bool {
        let open = self.open_classes.entry(class_slug.to_owned()).or_insert(false);
        *open = !*open;
        *open
    }

    /// Flip a chapter open/closed. Returns the new state.
    pub fn toggle_chapter(&mut self, class_slug: &str, chapter_slug: &str) -> bool {
        let open = self
            .open_chapters
            .entry(chapter_key(class_slug, chapter_slug))
            .or_insert(false);
        *open = !*open;
        *open
    }

    /// Make sure the part of the tree the reader is on is expanded.
    ///
    /// The class comes from the route, else from the current lesson's owner,
    /// else it is the first class. The chapter comes from the route or the
    /// current lesson's owner. Other entries are left alone.
    pub fn open_for_route(&mut self, tree: &[ClassItem], owners: &LessonOwners, route: &Route) {
        let owner = route.lesson_slug.as_deref().and_then(|l| owners.get(l));

        let class = route
            .class_slug
            .clone()
            .or_else(|| owner.map(|o| o.class_slug.clone()))
            .or_else(|| tree.first().map(|c| c.slug.clone()));

        let chapter = match (owner, &route.class_slug, &route.chapter_slug) {
            (Some(o), _, _) => Some(chapter_key(&o.class_slug, &o.chapter_slug)),
            (None, Some(c), Some(ch)) => Some(chapter_key(c, ch)),
            _ => None,
        };

        if let Some(class) = class {
            self.open_classes.insert(class, true);
        }
        if let Some(chapter) = chapter {
            self.open_chapters.insert(chapter, true);
        }
    }
}

fn read_map(store: &impl StateStore, key: &str) -> BTreeMap<String, bool> {
    store
        .get(key)
        .and_then(|raw| match serde_json::from_str(&raw) {
            Ok(map) => Some(map),
            Err(e) => {
                debug!(key, error = %e, "discarding unreadable sidebar state");
                None
            }
        })
        .unwrap_or_default()
}

fn encode_map(map: &BTreeMap<String, bool>) -> String {
    // A map of strings to bools always serializes.
    serde_json::to_string(map).unwrap_or_else(|_| "{}".to_owned())
}

// ---------------------------------------------------------------------------
// Outline
// ---------------------------------------------------------------------------

/// What a sidebar row points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Class,
    Chapter,
    Lesson,
}

/// One visible row of the sidebar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutlineRow {
    pub kind: RowKind,
    /// 0 for classes, 1 for chapters, 2 for lessons.
    pub depth: usize,
    pub title: String,
    /// Link target; class rows only toggle and have none.
    pub href: Option<String>,
    /// Expanded (classes, chapters) or current page (lessons).
    pub open: bool,
}

/// Flatten the tree into visible sidebar rows. Children of closed rows are hidden.
pub fn outline(tree: &[ClassItem], state: &SidebarState, route: &Route) -> Vec<OutlineRow> {
    let mut rows = Vec::new();

    for class in tree {
        let class_open = state.is_class_open(&class.slug);
        rows.push(OutlineRow {
            kind: RowKind::Class,
            depth: 0,
            title: class.title.clone(),
            href: None,
            open: class_open,
        });
        if !class_open {
            continue;
        }

        for module in &class.modules {
            let chapter_open = state.is_chapter_open(&class.slug, &module.slug);
            rows.push(OutlineRow {
                kind: RowKind::Chapter,
                depth: 1,
                title: module.title.clone(),
                href: Some(chapter_href(&class.slug, &module.slug)),
                open: chapter_open,
            });
            if !chapter_open {
                continue;
            }

            for lesson in &module.lessons {
                rows.push(OutlineRow {
                    kind: RowKind::Lesson,
                    depth: 2,
                    title: lesson.title.clone(),
                    href: Some(lesson_href(&class.slug, &lesson.slug)),
                    open: route.lesson_slug.as_deref() == Some(lesson.slug.as_str()),
                });
            }
        }
    }

    rows
}
