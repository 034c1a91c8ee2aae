//! Per-entity normalizers: one raw record in, one canonical record out.
//!
//! A record without resolvable identity yields `None` and the caller drops
//! it together with everything nested under it.

use lessonmap_shared::{ClassItem, EntityId, LessonItem, ModuleItem};
use serde_json::Value;

use crate::record::RawRecord;

const TITLE: &str = "title";
const SLUG: &str = "slug";
const DESCRIPTION: &str = "description";
const MODULES: &str = "modules";
const LESSONS: &str = "lessons";

/// The three levels of the content tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Class,
    Module,
    Lesson,
}

impl EntityKind {
    /// Display label used for synthesized titles.
    pub fn label(self) -> &'static str {
        match self {
            Self::Class => "Class",
            Self::Module => "Module",
            Self::Lesson => "Lesson",
        }
    }

    /// Title of last resort, e.g. `Module 3`.
    pub fn placeholder_title(self, id: EntityId) -> String {
        format!("{} {id}", self.label())
    }
}

/// Normalize a lesson record.
pub fn normalize_lesson(raw: &Value) -> Option<LessonItem> {
    let record = RawRecord::new(raw)?;
    let id = record.id()?;

    Some(LessonItem {
        id,
        title: display_title(&record, EntityKind::Lesson, id),
        slug: record.text(SLUG).map_or_else(|| id.to_string(), str::to_owned),
    })
}

/// Normalize a module record and its lessons.
///
/// `class_slug` is the resolved slug of the owning class; it keeps fallback
/// module slugs apart across classes.
pub fn normalize_module(raw: &Value, class_slug: &str) -> Option<ModuleItem> {
    let record = RawRecord::new(raw)?;
    let id = record.id()?;

    let lessons = record
        .relation(LESSONS)
        .iter()
        .filter_map(normalize_lesson)
        .collect();

    Some(ModuleItem {
        id,
        title: display_title(&record, EntityKind::Module, id),
        slug: record
            .text(SLUG)
            .map_or_else(|| fallback_module_slug(class_slug, id), str::to_owned),
        lessons,
    })
}

/// Normalize a class record with its modules and their lessons.
pub fn normalize_class(raw: &Value) -> Option<ClassItem> {
    let record = RawRecord::new(raw)?;
    let id = record.id()?;

    let slug = record.text(SLUG).map_or_else(|| id.to_string(), str::to_owned);

    let modules = record
        .relation(MODULES)
        .iter()
        .filter_map(|m| normalize_module(m, &slug))
        .collect();

    Some(ClassItem {
        id,
        title: display_title(&record, EntityKind::Class, id),
        description: record.text(DESCRIPTION).map(str::to_owned),
        slug,
        modules,
    })
}

/// `{class_slug}-m{id}`, or the bare id when the class slug is empty.
///
/// Only unique site-wide as long as class slugs are.
pub fn fallback_module_slug(class_slug: &str, id: EntityId) -> String {
    if class_slug.is_empty() {
        id.to_string()
    } else {
        format!("{class_slug}-m{id}")
    }
}

/// CMS title, else CMS slug verbatim, else a placeholder.
fn display_title(record: &RawRecord<'_>, kind: EntityKind, id: EntityId) -> String {
    record
        .text(TITLE)
        .or_else(|| record.text(SLUG))
        .map_or_else(|| kind.placeholder_title(id), str::to_owned)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn concrete_wrapped_class() {
        let raw = json!({
            "id": 7,
            "attributes": {
                "title": null,
                "slug": "thermo",
                "modules": {"data": [{"id": 12, "attributes": {"slug": "", "title": "Heat Transfer"}}]}
            }
        });

        let class = normalize_class(&raw).expect("class with id");
        assert_eq!(
            serde_json::to_value(&class).unwrap(),
            json!({
                "id": 7,
                "title": "thermo",
                "slug": "thermo",
                "modules": [{"id": 12, "title": "Heat Transfer", "slug": "thermo-m12", "lessons": []}]
            })
        );
    }

    #[test]
    fn title_falls_back_to_slug_verbatim() {
        for raw in [
            json!({"id": 1, "title": null, "slug": "intro-to-beams"}),
            json!({"id": 1, "title": "", "slug": "intro-to-beams"}),
            json!({"id": 1, "slug": "intro-to-beams"}),
        ] {
            let lesson = normalize_lesson(&raw).unwrap();
            assert_eq!(lesson.title, "intro-to-beams");
        }
    }

    #[test]
    fn placeholders_when_title_and_slug_missing() {
        let lesson = normalize_lesson(&json!({"id": 4})).unwrap();
        assert_eq!(lesson.title, "Lesson 4");
        assert_eq!(lesson.slug, "4");

        let module = normalize_module(&json!({"id": 3}), "").unwrap();
        assert_eq!(module.title, "Module 3");
        assert_eq!(module.slug, "3");

        let class = normalize_class(&json!({"documentId": "9"})).unwrap();
        assert_eq!(class.title, "Class 9");
        assert_eq!(class.slug, "9");
        assert!(class.modules.is_empty());
        assert!(class.description.is_none());
    }

    #[test]
    fn module_slug_uses_parent_class() {
        let module = normalize_module(&json!({"id": 3, "title": "Trusses"}), "statics").unwrap();
        assert_eq!(module.slug, "statics-m3");

        let module = normalize_module(&json!({"id": 3, "slug": "trusses"}), "statics").unwrap();
        assert_eq!(module.slug, "trusses");
    }

    #[test]
    fn class_slug_derived_from_id_feeds_modules() {
        let raw = json!({"id": 5, "modules": [{"id": 8}]});
        let class = normalize_class(&raw).unwrap();
        assert_eq!(class.slug, "5");
        assert_eq!(class.modules[0].slug, "5-m8");
    }

    #[test]
    fn missing_identity_yields_none() {
        assert!(normalize_lesson(&json!({"title": "Orphan", "slug": "orphan"})).is_none());
        assert!(normalize_module(&json!({"attributes": {"title": "M"}}), "c").is_none());
        assert!(normalize_class(&json!({"documentId": "abc"})).is_none());
        assert!(normalize_class(&Value::Null).is_none());
        assert!(normalize_class(&json!("7")).is_none());
    }

    #[test]
    fn invalid_children_dropped_siblings_kept() {
        let raw = json!({
            "id": 1,
            "slug": "dynamics",
            "modules": [
                {"id": 10, "lessons": [{"id": 100}, {"title": "no id"}, {"id": "101"}]},
                {"title": "module without id", "lessons": [{"id": 999}]},
                {"id": 11}
            ]
        });

        let class = normalize_class(&raw).unwrap();
        let module_ids: Vec<u64> = class.modules.iter().map(|m| m.id.0).collect();
        assert_eq!(module_ids, vec![10, 11]);

        let lesson_ids: Vec<u64> = class.modules[0].lessons.iter().map(|l| l.id.0).collect();
        assert_eq!(lesson_ids, vec![100, 101]);
        assert!(class.modules[1].lessons.is_empty());
    }

    #[test]
    fn description_is_optional() {
        let class = normalize_class(&json!({"id": 1, "description": null})).unwrap();
        assert!(class.description.is_none());

        let class = normalize_class(&json!({"id": 1, "attributes": {"description": "Forces at rest."}})).unwrap();
        assert_eq!(class.description.as_deref(), Some("Forces at rest."));
    }

    #[test]
    fn canonical_input_is_a_fixed_point() {
        let canonical = ClassItem {
            id: EntityId(2),
            title: "Statics".into(),
            slug: "statics".into(),
            description: Some("Forces at rest.".into()),
            modules: vec![ModuleItem {
                id: EntityId(20),
                title: "Trusses".into(),
                slug: "statics-m20".into(),
                lessons: vec![LessonItem {
                    id: EntityId(200),
                    title: "Method of joints".into(),
                    slug: "joints".into(),
                }],
            }],
        };

        let as_json = serde_json::to_value(&canonical).unwrap();
        assert_eq!(normalize_class(&as_json), Some(canonical));
    }
}
