//! Text output for the terminal. `--json` bypasses this module.

use std::fmt::Write as _;

use color_eyre::eyre::Result;
use lessonmap_shared::{AppConfig, ClassItem, CmsConfig, LessonPage, ModulePage, PublicationState};
use lessonmap_view::{
    OutlineRow, RenderedBody, RowKind, TocItem, chapter_href, class_href, lesson_href,
};
use serde::Serialize;

/// Everything the lesson command shows.
#[derive(Debug, Serialize)]
pub(crate) struct LessonView {
    #[serde(flatten)]
    pub page: LessonPage,
    pub body: Option<RenderedBody>,
    pub objective: Option<RenderedBody>,
    pub toc: Vec<TocItem>,
}

/// Everything the chapter command shows.
#[derive(Debug, Serialize)]
pub(crate) struct ChapterView {
    /// Class the chapter was requested under, used for lesson links.
    #[serde(skip)]
    pub class_slug: String,
    #[serde(flatten)]
    pub page: ModulePage,
    pub objective: Option<RenderedBody>,
}

/// The config file plus the CMS settings it resolves to.
#[derive(Debug, Serialize)]
pub(crate) struct ConfigView {
    pub file: AppConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedCms>,
    /// Why the CMS settings could not be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<String>,
}

impl ConfigView {
    pub fn new(file: AppConfig, resolved: lessonmap_shared::Result<CmsConfig>) -> Self {
        match resolved {
            Ok(cms) => Self {
                file,
                resolved: Some(ResolvedCms::from(&cms)),
                unresolved: None,
            },
            Err(e) => Self {
                file,
                resolved: None,
                unresolved: Some(e.to_string()),
            },
        }
    }
}

/// Effective CMS settings. The token itself is never shown.
#[derive(Debug, Serialize)]
pub(crate) struct ResolvedCms {
    pub base_url: String,
    pub publication_state: PublicationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<&'static str>,
    pub timeout_secs: u64,
}

impl From<&CmsConfig> for ResolvedCms {
    fn from(cms: &CmsConfig) -> Self {
        Self {
            base_url: cms.base().to_owned(),
            publication_state: cms.publication_state,
            api_token: cms.api_token.as_ref().map(|_| "<redacted>"),
            timeout_secs: cms.timeout_secs,
        }
    }
}

pub(crate) fn config(view: &ConfigView) -> Result<String> {
    #[derive(Serialize)]
    struct Section<'a> {
        resolved: &'a ResolvedCms,
    }

    let mut out = toml::to_string_pretty(&view.file)?;
    if let Some(resolved) = &view.resolved {
        out.push_str("\n# CMS settings after environment overrides\n");
        out.push_str(&toml::to_string_pretty(&Section { resolved })?);
    }
    if let Some(reason) = &view.unresolved {
        let _ = writeln!(out, "\n# CMS settings unresolved: {reason}");
    }
    Ok(out)
}

pub(crate) fn tree(classes: &[ClassItem]) -> String {
    if classes.is_empty() {
        return "No classes.\n".to_owned();
    }
    let mut out = String::new();
    for c in classes {
        let _ = writeln!(out, "{}  {}", c.title, class_href(&c.slug));
        for m in &c.modules {
            let _ = writeln!(out, "  {}  {}", m.title, chapter_href(&c.slug, &m.slug));
            for l in &m.lessons {
                let _ = writeln!(out, "    {}  {}", l.title, lesson_href(&c.slug, &l.slug));
            }
        }
    }
    out
}

pub(crate) fn class(class: &ClassItem) -> String {
    let mut out = format!("{} ({})\n", class.title, class.slug);
    if let Some(desc) = &class.description {
        let _ = writeln!(out, "\n{desc}");
    }
    if class.modules.is_empty() {
        out.push_str("\nNo chapters.\n");
        return out;
    }
    out.push_str("\nChapters:\n");
    for m in &class.modules {
        let _ = writeln!(
            out,
            "  {}  ({} lessons)  {}",
            m.title,
            m.lessons.len(),
            chapter_href(&class.slug, &m.slug)
        );
    }
    out
}

pub(crate) fn lesson(view: &LessonView) -> String {
    let page = &view.page;
    let mut out = format!("{}\n", page.lesson.title);

    let crumbs: Vec<&str> = [page.class_slug.as_deref(), page.module_slug.as_deref()]
        .into_iter()
        .flatten()
        .collect();
    if !crumbs.is_empty() {
        let _ = writeln!(out, "{}", crumbs.join(" / "));
    }
    if let Some(video) = &page.video_url {
        let _ = writeln!(out, "Video: {video}");
    }
    if let Some(objective) = &view.objective {
        let _ = writeln!(out, "\nObjectives:\n{}", objective.as_str());
    }
    if !view.toc.is_empty() {
        out.push_str("\nOn this page:\n");
        for item in &view.toc {
            let indent = if item.level == 3 { "    " } else { "  " };
            let _ = writeln!(out, "{indent}{}  #{}", item.text, item.id);
        }
    }
    match &view.body {
        Some(body) => {
            let _ = writeln!(out, "\n{}", body.as_str());
        }
        None => out.push_str("\nThis lesson has no content yet.\n"),
    }
    out
}

pub(crate) fn chapter(view: &ChapterView) -> String {
    let module = &view.page.module;
    let mut out = format!("{}\n", module.title);
    if let Some(objective) = &view.objective {
        let _ = writeln!(out, "\nObjectives:\n{}", objective.as_str());
    }
    if module.lessons.is_empty() {
        out.push_str("\nNo lessons in this chapter yet.\n");
        return out;
    }
    out.push_str("\nLessons:\n");
    for (i, l) in module.lessons.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {}. {}  {}",
            i + 1,
            l.title,
            lesson_href(&view.class_slug, &l.slug)
        );
    }
    out
}

pub(crate) fn outline(rows: &[OutlineRow]) -> String {
    let mut out = String::new();
    for row in rows {
        let marker = match (row.kind, row.open) {
            (RowKind::Lesson, true) => "*",
            (RowKind::Lesson, false) => "-",
            (_, true) => "v",
            (_, false) => ">",
        };
        let indent = "  ".repeat(row.depth);
        let _ = write!(out, "{indent}{marker} {}", row.title);
        if let Some(href) = &row.href {
            let _ = write!(out, "  {href}");
        }
        out.push('\n');
    }
    out
}
