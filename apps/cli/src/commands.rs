//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use lessonmap_cms::CmsClient;
use lessonmap_shared::{
    AppConfig, CmsConfig, init_config, load_config, load_config_from, sidebar_state_path,
};
use lessonmap_view::{
    Allowlist, JsonFileStore, LessonOwners, RenderedBody, Route, SidebarState, extract_toc,
    outline, render_body,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::render::{self, ChapterView, ConfigView, LessonView};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// lessonmap: browse classes, chapters and lessons served by a Strapi CMS.
#[derive(Parser)]
#[command(
    name = "lessonmap",
    version,
    about = "Browse a Strapi-backed course catalog: class tree, lesson pages, sidebar state.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print results as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file to use instead of ~/.lessonmap/lessonmap.toml.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Print the full class → chapter → lesson tree.
    Tree,

    /// Show one class and its chapters.
    Class {
        /// Class slug.
        slug: String,
    },

    /// Show a lesson page.
    Lesson {
        /// Class slug the lesson must belong to (case-insensitive).
        class: String,
        /// Lesson slug.
        lesson: String,
    },

    /// Show a chapter page.
    Chapter {
        /// Class slug the chapter must belong to (case-insensitive).
        class: String,
        /// Chapter slug.
        chapter: String,
    },

    /// Show the navigation sidebar for a site path and update its saved state.
    Sidebar {
        /// Current site path, e.g. /classes/statics/lessons/moments.
        #[arg(long, default_value = "/")]
        path: String,

        /// Flip a class open/closed (by class slug).
        #[arg(long)]
        toggle_class: Vec<String>,

        /// Flip a chapter open/closed, given as CLASS/CHAPTER.
        #[arg(long)]
        toggle_chapter: Vec<String>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show the config file and the CMS settings resolved from it and the environment.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags. Logs go to stderr so stdout stays
/// parseable with `--json`.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "lessonmap=info",
        1 => "lessonmap=debug",
        _ => "lessonmap=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config()?,
    };

    let out = Output { json: cli.json };

    if let Command::Config { action } = &cli.command {
        return match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config, out),
        };
    }

    // Everything below talks to the CMS; a bad base address stops here.
    let cms = CmsConfig::resolve(&config)?;
    info!(
        base_url = cms.base(),
        publication_state = cms.publication_state.as_str(),
        "using CMS"
    );
    let client = CmsClient::new(cms)?;

    match cli.command {
        Command::Tree => cmd_tree(&client, out).await,
        Command::Class { slug } => cmd_class(&client, out, &slug).await,
        Command::Lesson { class, lesson } => cmd_lesson(&client, out, &class, &lesson).await,
        Command::Chapter { class, chapter } => cmd_chapter(&client, out, &class, &chapter).await,
        Command::Sidebar {
            path,
            toggle_class,
            toggle_chapter,
        } => {
            let state_path = sidebar_state_path(&config)?;
            cmd_sidebar(&client, out, &state_path, &path, &toggle_class, &toggle_chapter).await
        }
        Command::Config { .. } => Ok(()),
    }
}

/// Where command results are printed.
#[derive(Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    fn emit<T: Serialize>(self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text(value));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_tree(client: &CmsClient, out: Output) -> Result<()> {
    let tree = client.classes_tree().await;
    out.emit(&tree, |t| render::tree(t))
}

async fn cmd_class(client: &CmsClient, out: Output, slug: &str) -> Result<()> {
    let class = client
        .class_by_slug(slug)
        .await
        .ok_or_else(|| eyre!("class '{slug}' not found"))?;
    out.emit(&class, render::class)
}

async fn cmd_lesson(client: &CmsClient, out: Output, class: &str, lesson: &str) -> Result<()> {
    let page = client
        .lesson(class, lesson)
        .await
        .ok_or_else(|| eyre!("lesson '{lesson}' not found in class '{class}'"))?;

    let body = render_body(&page.text_content, &Allowlist);
    let toc = match &body {
        Some(RenderedBody::Html(html)) => extract_toc(html),
        _ => Vec::new(),
    };
    let objective = page
        .objective
        .as_deref()
        .and_then(|o| render_body(o, &Allowlist));

    let view = LessonView {
        page,
        body,
        objective,
        toc,
    };
    out.emit(&view, render::lesson)
}

async fn cmd_chapter(client: &CmsClient, out: Output, class: &str, chapter: &str) -> Result<()> {
    let page = client
        .chapter(class, chapter)
        .await
        .ok_or_else(|| eyre!("chapter '{chapter}' not found in class '{class}'"))?;

    let objective = page
        .objective
        .as_deref()
        .and_then(|o| render_body(o, &Allowlist));
    let view = ChapterView {
        class_slug: class.to_owned(),
        page,
        objective,
    };
    out.emit(&view, render::chapter)
}

async fn cmd_sidebar(
    client: &CmsClient,
    out: Output,
    state_path: &Path,
    path: &str,
    toggle_class: &[String],
    toggle_chapter: &[String],
) -> Result<()> {
    let chapter_toggles = toggle_chapter
        .iter()
        .map(|key| {
            key.split_once('/')
                .filter(|(c, ch)| !c.is_empty() && !ch.is_empty())
                .ok_or_else(|| eyre!("invalid chapter '{key}': expected CLASS/CHAPTER"))
        })
        .collect::<Result<Vec<_>>>()?;

    let tree = client.classes_tree().await;
    let owners = LessonOwners::from_tree(&tree);
    let route = Route::parse(path);

    let mut store = JsonFileStore::open(state_path);
    let mut state = SidebarState::restore(&store);
    state.open_for_route(&tree, &owners, &route);

    for class in toggle_class {
        let open = state.toggle_class(class);
        debug!(class = %class, open, "toggled class");
    }
    for (class, chapter) in chapter_toggles {
        let open = state.toggle_chapter(class, chapter);
        debug!(class, chapter, open, "toggled chapter");
    }

    state.persist(&mut store)?;
    debug!(path = ?store.path(), "saved sidebar state");

    let rows = outline(&tree, &state, &route);
    out.emit(&rows, |r| render::outline(r))
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig, out: Output) -> Result<()> {
    let view = ConfigView::new(config.clone(), CmsConfig::resolve(config));
    let text = render::config(&view)?;
    out.emit(&view, |_| text)
}
