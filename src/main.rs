use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use meal_chat_history::config::default_db_path;
use meal_chat_history::services::export::export_to_markdown;
use meal_chat_history::{
    ConversationStore, Database, Locale, Message, SettingsService, SqlitePersister,
};

#[derive(Parser)]
#[command(name = "meal-chat-history")]
#[command(about = "Inspect and edit the meal chat conversation history")]
#[command(version)]
struct Cli {
    /// History database (defaults to $XDG_DATA_HOME/meal-chat/history.db)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Timestamp language (en, vi)
    #[arg(long)]
    locale: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List conversations in sidebar order
    List,
    /// Print the messages of a conversation as JSON
    Show { id: String },
    /// Save a JSON array of messages, into an existing conversation or a new one
    Save {
        file: PathBuf,
        #[arg(long)]
        into: Option<String>,
    },
    Delete { id: String },
    /// Toggle the pin on a conversation
    Pin { id: String },
    Rename { id: String, title: String },
    /// Put conversations in the given order within their group
    Reorder { ids: Vec<String> },
    /// Move a conversation to a position within its group
    Move { id: String, index: usize },
    /// Print a conversation as Markdown
    Export { id: String },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let path = match cli.db {
        Some(path) => path,
        None => default_db_path()?,
    };
    let db = Database::open(&path)?;

    let mut settings = SettingsService::load(&db);
    if let Some(locale) = cli.locale.as_deref() {
        settings.locale =
            Locale::from_str(locale).with_context(|| format!("Unknown locale: {}", locale))?;
    }

    let persister = SqlitePersister::new(db, settings.storage_key.clone());
    let mut store = ConversationStore::init(persister, settings);

    match cli.command {
        Command::List => {
            for row in store.list() {
                let pin = if row.pinned { "*" } else { " " };
                println!("{} {}  {}  ({})", pin, row.id, row.title, row.timestamp);
            }
        }
        Command::Show { id } => match store.load(&id) {
            Some(messages) => println!("{}", serde_json::to_string_pretty(&messages)?),
            None => bail!("Conversation not found: {}", id),
        },
        Command::Save { file, into } => {
            let json = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let messages: Vec<Message> = serde_json::from_str(&json)
                .with_context(|| format!("Invalid message batch in {}", file.display()))?;
            if let Some(id) = into {
                if store.load(&id).is_none() {
                    bail!("Conversation not found: {}", id);
                }
            }
            match store.save(messages) {
                Some(id) => println!("{}", id),
                None => println!("Nothing to save"),
            }
        }
        Command::Delete { id } => report(store.delete(&id), &id)?,
        Command::Pin { id } => report(store.pin(&id), &id)?,
        Command::Rename { id, title } => {
            if store.get(&id).is_none() {
                bail!("Conversation not found: {}", id);
            }
            if !store.rename(&id, &title) {
                println!("Title unchanged");
            }
        }
        Command::Reorder { ids } => {
            if !store.reorder(ids.as_slice()) {
                bail!("None of the given ids exist");
            }
        }
        Command::Move { id, index } => report(store.move_to(&id, index), &id)?,
        Command::Export { id } => match store.get(&id) {
            Some(conv) => print!("{}", export_to_markdown(conv)),
            None => bail!("Conversation not found: {}", id),
        },
    }

    if let Some(err) = store.last_write_error() {
        bail!("History was changed but could not be saved: {}", err);
    }
    Ok(())
}

fn report(found: bool, id: &str) -> Result<()> {
    if !found {
        bail!("Conversation not found: {}", id);
    }
    Ok(())
}
