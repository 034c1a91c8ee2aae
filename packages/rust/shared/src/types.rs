//! Canonical content types: the single internal shape every CMS record is
//! normalized into, whatever wire format it arrived in.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// EntityId
// ---------------------------------------------------------------------------

/// Numeric CMS identifier of a class, module or lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

// ---------------------------------------------------------------------------
// Tree nodes
// ---------------------------------------------------------------------------

/// A lesson: the leaf of the navigation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonItem {
    pub id: EntityId,
    /// Display title, never empty.
    pub title: String,
    /// URL slug, never empty.
    pub slug: String,
}

/// A module (shown to readers as a "chapter") and its lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleItem {
    pub id: EntityId,
    /// Display title, never empty.
    pub title: String,
    /// URL slug, never empty. Falls back to `{class_slug}-m{id}`.
    pub slug: String,
    /// Lessons in CMS response order.
    #[serde(default)]
    pub lessons: Vec<LessonItem>,
}

/// A class: the root of one navigation subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassItem {
    pub id: EntityId,
    /// Display title, never empty.
    pub title: String,
    /// URL slug, never empty.
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Modules in CMS response order.
    #[serde(default)]
    pub modules: Vec<ModuleItem>,
}

// ---------------------------------------------------------------------------
// Page records
// ---------------------------------------------------------------------------

/// Everything a lesson page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonPage {
    #[serde(flatten)]
    pub lesson: LessonItem,
    /// Lesson body. May be rich text (HTML) that still needs sanitizing.
    #[serde(default)]
    pub text_content: String,
    /// Absolute URL of the lesson video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Objectives of the owning module. May be rich text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_slug: Option<String>,
    /// Slug of the class reached through the owning module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_slug: Option<String>,
}

/// Everything a chapter overview page renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulePage {
    #[serde(flatten)]
    pub module: ModuleItem,
    /// Chapter objectives. May be rich text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objective: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_slug: Option<String>,
}
