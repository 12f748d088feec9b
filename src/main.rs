use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pagebook::assist::Assistant;
use pagebook::autosave::{AutosaveEvent, AutosaveScheduler};
use pagebook::config::AppConfig;
use pagebook::document::slash::{self, SlashCommand};
use pagebook::document::{needs_split, BlockDocument, Direction, SlashOutcome};
use pagebook::error::{ErrorInfo, ErrorPopup, PageError};
use pagebook::model::{BlockType, Page};
use pagebook::pages::{self, NewPage};
use pagebook::storage::{FileBackend, ImportOutcome, PersistenceStore};
use pagebook::templates::{TemplateLibrary, ALL_CATEGORIES, CATEGORIES};
use pagebook::tree::{self, ExpandState};
use pagebook::AiClient;

#[derive(Parser)]
#[command(name = "pagebook", version, about = "Block-based notes workspace")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the page tree
    Tree {
        /// Only roots whose title contains this text
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Print a page's blocks
    Show { page: String },

    /// Create a page
    New {
        title: String,
        #[arg(long)]
        parent: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },

    /// Delete a page and its direct children
    Delete { page: String },

    /// Insert a block after another one
    Insert {
        page: String,
        after: String,
        #[arg(long = "type", default_value = "paragraph")]
        block_type: BlockType,
        #[arg(long)]
        text: Option<String>,
    },

    /// Paste text into a block, one block per line
    Paste {
        page: String,
        block: String,
        text: String,
    },

    /// Move a block one position
    Move {
        page: String,
        block: String,
        direction: MoveDirection,
    },

    /// Run a slash command on a block, e.g. `h1`, `todo` or `continue`
    Slash {
        page: String,
        block: String,
        command: String,
    },

    /// List templates
    Templates {
        #[arg(short, long, default_value = "")]
        query: String,
        #[arg(short, long, default_value = ALL_CATEGORIES)]
        category: String,
    },

    /// Create a page from a template
    UseTemplate {
        id: String,
        #[arg(long)]
        parent: Option<String>,
    },

    /// Ask the assistant for a new template
    GenerateTemplate { description: String },

    /// Write all collections as JSON
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Restore collections from an export file
    Import { file: PathBuf },

    /// Print the effective configuration
    Config,
}

#[derive(Clone, Copy, ValueEnum)]
enum MoveDirection {
    Up,
    Down,
}

impl From<MoveDirection> for Direction {
    fn from(d: MoveDirection) -> Self {
        match d {
            MoveDirection::Up => Direction::Up,
            MoveDirection::Down => Direction::Down,
        }
    }
}

fn config_path() -> PathBuf {
    AppConfig::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

fn open_store(config: &AppConfig) -> PersistenceStore {
    let dir = config
        .storage
        .data_dir
        .clone()
        .or_else(FileBackend::default_dir)
        .unwrap_or_else(|| PathBuf::from("."));
    PersistenceStore::new(FileBackend::new(dir), config.storage.key_prefix.clone())
}

fn assistant(config: &AppConfig) -> Assistant {
    if config.assistant.api_key.is_empty() {
        warn!("assistant.api_key is empty; generation requests will likely be rejected");
    }
    let client = AiClient::new(
        &config.assistant.endpoint,
        &config.assistant.model,
        &config.assistant.api_key,
    );
    debug!(model = client.model(), "assistant ready");
    Assistant::new(client)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagebook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let path = config_path();
    if !path.exists() {
        AppConfig::write_default(&path)?;
        eprintln!("Created default config at: {}", path.display());
    }

    let config = match AppConfig::load_from_path(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", path.display(), e);
            eprintln!("Fix the config file or delete it to regenerate defaults.");
            process::exit(1);
        }
    };

    if let Err(e) = run(cli.command, &config).await {
        let popup = ErrorPopup::from_error_info(&ErrorInfo::from_page_error(&e));
        eprintln!("{}: {}", popup.title, popup.message);
        eprintln!("{}", popup.hint);
        process::exit(1);
    }
    Ok(())
}

async fn run(command: Command, config: &AppConfig) -> Result<(), PageError> {
    let store = open_store(config);

    match command {
        Command::Tree { query } => {
            let all = store.load_pages();
            let mut expand = ExpandState::new();
            for page in &all {
                expand.toggle(&page.id);
            }
            let mut forest = tree::build_with(&all, &expand);
            if let Some(query) = query {
                forest = tree::filter_roots(&forest, &query);
            }
            for (depth, node) in tree::visible_rows(&forest) {
                println!(
                    "{}{} {}  ({})",
                    "  ".repeat(depth),
                    node.icon.as_deref().unwrap_or(pages::DEFAULT_ICON),
                    node.title,
                    node.id
                );
            }
        }
        Command::Show { page } => {
            let all = store.load_pages();
            let page = find_page(&all, &page)?;
            let crumbs: Vec<&str> = pages::ancestors(&all, &page.id)
                .into_iter()
                .rev()
                .map(|p| p.title.as_str())
                .collect();
            if !crumbs.is_empty() {
                println!("{} /", crumbs.join(" / "));
            }
            println!("{} {}", page.icon.as_deref().unwrap_or(pages::DEFAULT_ICON), page.title);
            print_blocks(page);
        }
        Command::New {
            title,
            parent,
            description,
            icon,
        } => {
            require_parent(&store, parent.as_deref())?;
            let page = pages::new_page(
                NewPage {
                    title,
                    description,
                    icon,
                    parent_id: parent,
                },
                &config.workspace.owner(),
            );
            store.save_page(&page)?;
            println!("{}", page.id);
        }
        Command::Delete { page } => {
            let removed = store.delete_page(&page)?;
            if removed == 0 {
                return Err(not_found(&page));
            }
            println!("Removed {} page(s)", removed);
        }
        Command::Insert {
            page,
            after,
            block_type,
            text,
        } => {
            edit_page(&store, config, &page, |doc| {
                doc.insert_after(&after, block_type);
                if let (Some(text), Some(active)) = (text, doc.active_block().map(String::from)) {
                    doc.update_content(&active, text);
                }
            })
            .await?;
        }
        Command::Paste { page, block, text } => {
            edit_page(&store, config, &page, |doc| {
                if needs_split(&text) {
                    doc.split_paste(&block, &text);
                } else {
                    doc.update_content(&block, text);
                }
            })
            .await?;
        }
        Command::Move {
            page,
            block,
            direction,
        } => {
            edit_page(&store, config, &page, |doc| {
                doc.move_block(&block, direction.into());
            })
            .await?;
        }
        Command::Slash {
            page,
            block,
            command,
        } => {
            let Some(cmd) = slash::resolve(&command) else {
                return Err(PageError::InvalidRequest(format!(
                    "unknown slash command '{}'",
                    command
                )));
            };
            run_slash(&store, config, &page, &block, &cmd).await?;
        }
        Command::Templates { query, category } => {
            let library = TemplateLibrary::load(store);
            let filter = category.to_lowercase();
            if let Some((_, label)) = CATEGORIES.iter().find(|(id, _)| *id == filter) {
                println!("{}", label);
            }
            for t in library.search(&query, &category) {
                println!(
                    "{} {}  [{}]  {} uses  ({})",
                    t.icon, t.name, t.category, t.usage_count, t.id
                );
            }
        }
        Command::UseTemplate { id, parent } => {
            require_parent(&store, parent.as_deref())?;
            let mut library = TemplateLibrary::load(store.clone());
            let Some(mut page) = library.instantiate(&id, &config.workspace.owner())? else {
                return Err(not_found(&id));
            };
            page.parent_id = parent;
            store.save_page(&page)?;
            println!("{}", page.id);
        }
        Command::GenerateTemplate { description } => {
            if description.trim().is_empty() {
                return Err(PageError::InvalidRequest("description is required".into()));
            }
            let assistant = assistant(config);
            let mut library = TemplateLibrary::load(store);
            if let Some(template) = library
                .add_generated("custom", &description, &assistant)
                .await?
            {
                println!("{} ({} blocks)", template.id, template.content.len());
            }
        }
        Command::Export { output } => {
            let dump = store.export_data()?;
            match output {
                Some(path) => std::fs::write(path, dump)?,
                None => println!("{}", dump),
            }
        }
        Command::Import { file } => {
            let raw = std::fs::read_to_string(file)?;
            match store.import_data(&raw)? {
                ImportOutcome::Imported { collections } => {
                    let names: Vec<&str> = collections.iter().map(|c| c.as_str()).collect();
                    println!("Imported {}", names.join(", "));
                }
                ImportOutcome::Failed(reason) => {
                    return Err(PageError::InvalidRequest(reason));
                }
            }
        }
        Command::Config => {
            print!("{}", config.to_toml()?);
        }
    }
    Ok(())
}

fn not_found(id: &str) -> PageError {
    PageError::InvalidRequest(format!("no page or template with id '{}'", id))
}

fn find_page<'a>(all: &'a [Page], id: &str) -> Result<&'a Page, PageError> {
    all.iter().find(|p| p.id == id).ok_or_else(|| not_found(id))
}

/// A new page may only hang under a page that exists.
fn require_parent(store: &PersistenceStore, parent: Option<&str>) -> Result<(), PageError> {
    match parent {
        Some(parent) => find_page(&store.load_pages(), parent).map(|_| ()),
        None => Ok(()),
    }
}

fn print_blocks(page: &Page) {
    for (i, block) in page.content.iter().enumerate() {
        let marker = match block.block_type {
            BlockType::ToDo if block.is_completed() => "[x] ",
            BlockType::ToDo => "[ ] ",
            _ => "",
        };
        println!(
            "{:>3}  {:<18} {}{}  ({})",
            i + 1,
            block.block_type.as_str(),
            marker,
            block.text(),
            block.id
        );
    }
}

/// Apply `edit` to a page's document and persist the result through the
/// autosave path.
async fn edit_page(
    store: &PersistenceStore,
    config: &AppConfig,
    page_id: &str,
    edit: impl FnOnce(&mut BlockDocument),
) -> Result<(), PageError> {
    let Some(page) = store.load_page(page_id) else {
        return Err(not_found(page_id));
    };
    let mut doc = BlockDocument::from_page(&page);
    let before = doc.snapshot();
    edit(&mut doc);
    if std::sync::Arc::ptr_eq(&before, &doc.snapshot()) {
        println!("Nothing changed");
        return Ok(());
    }
    save_document(store, config, page, &doc).await
}

async fn run_slash(
    store: &PersistenceStore,
    config: &AppConfig,
    page_id: &str,
    block_id: &str,
    command: &SlashCommand,
) -> Result<(), PageError> {
    let Some(page) = store.load_page(page_id) else {
        return Err(not_found(page_id));
    };
    if page.find_block(block_id).is_none() {
        return Err(PageError::InvalidRequest(format!(
            "no block with id '{}' on page '{}'",
            block_id, page_id
        )));
    }
    let mut doc = BlockDocument::from_page(&page);
    match doc.apply_slash(block_id, command) {
        SlashOutcome::Applied => {}
        SlashOutcome::Ignored => {
            println!("Nothing changed");
            return Ok(());
        }
        SlashOutcome::ContinueWriting => {
            let assistant = assistant(config);
            let Some(text) = assistant.continue_block(&doc, block_id).await else {
                return Ok(());
            };
            doc.update_content(block_id, text);
        }
    }
    save_document(store, config, page, &doc).await
}

async fn save_document(
    store: &PersistenceStore,
    config: &AppConfig,
    page: Page,
    doc: &BlockDocument,
) -> Result<(), PageError> {
    let title = page.title.clone();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut autosave =
        AutosaveScheduler::new(store.clone(), page, config.autosave.delay()).with_events(tx);
    autosave.observe(title, doc.snapshot());

    if !config.autosave.enabled {
        autosave.flush()?;
    }
    match rx.recv().await {
        Some(AutosaveEvent::Saved { page_id }) => {
            println!("Saved {}", page_id);
            Ok(())
        }
        Some(AutosaveEvent::Failed(info)) => {
            let popup = ErrorPopup::from_error_info(&info);
            Err(PageError::Storage(popup.message))
        }
        None => Ok(()),
    }
}
