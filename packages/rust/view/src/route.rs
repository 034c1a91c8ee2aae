//! Site paths: parsing the current route and building links.

/// Slugs found in a site path such as `/classes/statics/lessons/moments`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Route {
    pub class_slug: Option<String>,
    pub chapter_slug: Option<String>,
    pub lesson_slug: Option<String>,
}

impl Route {
    /// Pick the segment following `classes`, `chapters` and `lessons`.
    /// Unknown paths parse to an empty route.
    pub fn parse(path: &str) -> Self {
        let parts: Vec<&str> = path
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .split('/')
            .filter(|p| !p.is_empty())
            .collect();

        let after = |marker: &str| {
            parts
                .iter()
                .position(|p| *p == marker)
                .and_then(|i| parts.get(i + 1))
                .map(|s| (*s).to_owned())
        };

        Self {
            class_slug: after("classes"),
            chapter_slug: after("chapters"),
            lesson_slug: after("lessons"),
        }
    }
}

pub fn class_href(class_slug: &str) -> String {
    format!("/classes/{class_slug}")
}

pub fn chapter_href(class_slug: &str, chapter_slug: &str) -> String {
    format!("/classes/{class_slug}/chapters/{chapter_slug}")
}

pub fn lesson_href(class_slug: &str, lesson_slug: &str) -> String {
    format!("/classes/{class_slug}/lessons/{lesson_slug}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lesson_route() {
        let route = Route::parse("/classes/statics/lessons/moments");
        assert_eq!(route.class_slug.as_deref(), Some("statics"));
        assert_eq!(route.lesson_slug.as_deref(), Some("moments"));
        assert!(route.chapter_slug.is_none());
    }

    #[test]
    fn parses_chapter_route_with_query() {
        let route = Route::parse("/classes/statics/chapters/trusses/?debug");
        assert_eq!(route.class_slug.as_deref(), Some("statics"));
        assert_eq!(route.chapter_slug.as_deref(), Some("trusses"));
    }

    #[test]
    fn unrelated_paths_are_empty() {
        assert_eq!(Route::parse("/"), Route::default());
        assert_eq!(Route::parse("/resources"), Route::default());
        assert_eq!(Route::parse("/classes"), Route::default());
    }

    #[test]
    fn hrefs() {
        assert_eq!(lesson_href("statics", "moments"), "/classes/statics/lessons/moments");
        assert_eq!(chapter_href("statics", "trusses"), "/classes/statics/chapters/trusses");
        assert_eq!(class_href("statics"), "/classes/statics");
    }
}
