//! Site initialization module.
//!
//! Creates a new site with default configuration and sample content for
//! every content file, so `relnotes serve` shows something right away.

use crate::{
    config::SiteConfig,
    content::{
        CalloutVariant, ContentBlock, InfoPage, Plugin, PluginCategory, ReleaseItem,
        ReleaseVersion, SetupSection, Step, Topic, VersionDetailItem, VersionDetails,
        store::{
            HANDS_ON_FILE, PAGES_FILE, PLUGINS_FILE, RELEASES_FILE, SETUP_FILE,
            VERSION_DETAILS_FILE,
        },
    },
    log,
};
use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::{fs, path::Path};

/// Files to write ignore patterns to
const IGNORE_FILES: &[&str] = &[".gitignore", ".ignore"];

/// Create a new site with default structure.
///
/// Without a name the site is created in the current directory, which must
/// then be empty.
pub fn new_site(config: &SiteConfig, has_name: bool) -> Result<()> {
    let root = config.get_root();

    if !has_name && !is_dir_empty(root)? {
        bail!(
            "Current directory is not empty. Use `relnotes init <SITE_NAME>` to create in a subdirectory."
        );
    }

    init_site_structure(config)?;
    init_default_config(config)?;
    init_sample_content(&config.build.content)?;
    init_ignored_files(root, &[relative_to(&config.build.output, root)])?;

    log!("init"; "created site at {}", root.display());
    Ok(())
}

/// Check if a directory is completely empty
fn is_dir_empty(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(true);
    }
    Ok(fs::read_dir(path)?.next().is_none())
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}

/// Write default configuration file
fn init_default_config(config: &SiteConfig) -> Result<()> {
    let content = toml::to_string_pretty(&SiteConfig::default())?;
    fs::write(&config.config_path, content)
        .with_context(|| format!("Failed to write {}", config.config_path.display()))?;
    Ok(())
}

/// Create content and assets directories
fn init_site_structure(config: &SiteConfig) -> Result<()> {
    for path in [&config.build.content, &config.build.assets] {
        if path.exists() {
            bail!(
                "Path `{}` already exists. Try `relnotes init <SITE_NAME>` instead.",
                path.display()
            );
        }
        fs::create_dir_all(path).with_context(|| format!("Failed to create {}", path.display()))?;
    }
    Ok(())
}

/// Initialize .gitignore and .ignore files with specified paths
fn init_ignored_files(root: &Path, paths: &[&Path]) -> Result<()> {
    let content = paths
        .iter()
        .filter_map(|p| p.to_str())
        .collect::<Vec<_>>()
        .join("\n");

    for filename in IGNORE_FILES {
        let path = root.join(filename);
        if !path.exists() {
            fs::write(&path, &content)?;
        }
    }

    Ok(())
}

// ============================================================================
// Sample Content
// ============================================================================

fn write_json<T: Serialize + ?Sized>(dir: &Path, file: &str, value: &T) -> Result<()> {
    let path = dir.join(file);
    let json = serde_json::to_string_pretty(value)?;
    fs::write(&path, json).with_context(|| format!("Failed to write {}", path.display()))
}

fn init_sample_content(dir: &Path) -> Result<()> {
    write_json(dir, RELEASES_FILE, &sample_releases())?;
    write_json(dir, VERSION_DETAILS_FILE, &sample_details())?;
    write_json(dir, PLUGINS_FILE, &sample_plugins())?;
    write_json(dir, SETUP_FILE, &sample_setup())?;
    write_json(dir, HANDS_ON_FILE, &sample_topics())?;
    write_json(dir, PAGES_FILE, &sample_pages())?;
    Ok(())
}

fn item(text: &str, tags: &[&str]) -> ReleaseItem {
    ReleaseItem {
        text: text.into(),
        tags: tags.iter().map(|&t| t.into()).collect(),
    }
}

fn text(text: &str) -> ContentBlock {
    ContentBlock::Text { text: text.into() }
}

fn sample_releases() -> Vec<ReleaseVersion> {
    vec![
        ReleaseVersion {
            version: "1.0.0".into(),
            date: Some("2025-09-01".into()),
            items: vec![
                item("Initial release", &["新機能"]),
                item("Fixed bug in SDK", &["バグ修正", "SDK"]),
            ],
        },
        ReleaseVersion {
            version: "1.1.0".into(),
            date: Some("2025-10-02".into()),
            items: vec![
                item("New MCP feature", &["新機能", "MCP"]),
                item("Faster startup", &["パフォーマンス"]),
            ],
        },
    ]
}

fn sample_details() -> VersionDetails {
    let mut details = VersionDetails::new();
    details.insert(
        "1.1.0".into(),
        vec![
            VersionDetailItem {
                text: "New MCP feature".into(),
                tags: vec!["新機能".into(), "MCP".into()],
                detail: "Servers can now be added from the settings screen.".into(),
                category: "MCP".into(),
            },
            VersionDetailItem {
                text: "Faster startup".into(),
                tags: vec!["パフォーマンス".into()],
                detail: "Plugins are loaded lazily on first use.".into(),
                category: "Performance".into(),
            },
        ],
    );
    details
}

fn sample_plugins() -> Vec<PluginCategory> {
    vec![PluginCategory {
        id: "dev".into(),
        name: "Development".into(),
        description: "Plugins for day-to-day coding.".into(),
        plugins: vec![Plugin {
            name: "formatter".into(),
            description: "Formats files on save.".into(),
            command: Some("/plugin install formatter".into()),
            url: None,
            tags: vec!["ツール".into()],
        }],
    }]
}

fn sample_setup() -> Vec<SetupSection> {
    vec![
        SetupSection {
            id: "install".into(),
            title: "Install".into(),
            description: None,
            blocks: vec![
                text("Install the CLI with your package manager."),
                ContentBlock::Code {
                    language: Some("sh".into()),
                    code: "npm install -g example-cli".into(),
                },
            ],
        },
        SetupSection {
            id: "configure".into(),
            title: "Configure".into(),
            description: Some("First-time configuration.".into()),
            blocks: vec![ContentBlock::Callout {
                variant: CalloutVariant::Tip,
                text: "Run the login command once before anything else.".into(),
            }],
        },
    ]
}

fn sample_topics() -> Vec<Topic> {
    vec![Topic {
        id: "first-steps".into(),
        title: "First steps".into(),
        summary: "Run your first session.".into(),
        level: Some("beginner".into()),
        tags: vec!["入門".into()],
        steps: vec![
            Step {
                title: "Start a session".into(),
                blocks: vec![text("Open a terminal in your project and start the CLI.")],
            },
            Step {
                title: "Ask a question".into(),
                blocks: vec![ContentBlock::List {
                    ordered: true,
                    items: vec!["Type a question".into(), "Press enter".into()],
                }],
            },
        ],
    }]
}

fn sample_pages() -> Vec<InfoPage> {
    vec![InfoPage {
        slug: "about".into(),
        title: "About".into(),
        blocks: vec![text("Release notes and guides for the project.")],
    }]
}
