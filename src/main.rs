mod error;
mod journal_entry;
mod journal_state;
mod login;
mod mood;
mod policy;
mod store;
mod tasks;
mod text_field;
mod ui;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use journal_state::JournalState;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use store::{MemoryStore, RecordStore, RestStore, RestStoreConfig};
use tasks::{StoreReply, StoreTasks};
use tracing::info;
use tracing_subscriber::EnvFilter;
use ui::{Action, Input, UI};

#[derive(Parser)]
#[command(name = "mood_journal")]
#[command(about = "Terminal mood journal backed by a REST table")]
struct Cli {
    /// Base URL of the record store; omit to keep entries in memory
    #[arg(long, env = "MOOD_STORE_URL")]
    store_url: Option<String>,

    /// API key sent as `apikey` and bearer token
    #[arg(long, env = "MOOD_STORE_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Table holding the entries
    #[arg(long, env = "MOOD_STORE_TABLE", default_value = "moods")]
    table: String,

    /// Where log output goes; the terminal belongs to the UI
    #[arg(long, env = "MOOD_JOURNAL_LOG", default_value = "mood_journal.log")]
    log_file: String,
}

fn init_logging(path: &str) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| eyre!("Failed to open log file {}: {}", path, e))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("mood_journal=info".parse()?),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    Ok(())
}

fn build_store(cli: &Cli) -> Result<Arc<dyn RecordStore>> {
    match cli.store_url {
        Some(ref base_url) => {
            info!(%base_url, table = %cli.table, "using REST record store");
            let store = RestStore::new(RestStoreConfig {
                base_url: base_url.clone(),
                api_key: cli.api_key.clone(),
                table: cli.table.clone(),
            })
            .map_err(|e| eyre!("Failed to set up record store: {}", e))?;
            Ok(Arc::new(store))
        }
        None => {
            info!("no store URL configured, keeping entries in memory");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Whatever woke the event loop.
enum Wake {
    Input(Input),
    Reply(StoreReply),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(&cli.log_file)?;
    let mut tasks = StoreTasks::new(build_store(&cli)?);

    let mut state = JournalState::new();
    let mut ui = UI::new()?;
    info!("mood journal started");

    loop {
        ui.display(&state)?;

        let wake = tokio::select! {
            input = ui.next_input() => Wake::Input(input?),
            Some(reply) = tasks.next_reply() => Wake::Reply(reply),
        };

        match wake {
            Wake::Reply(reply) => tasks.apply(&mut state, reply),
            Wake::Input(Input::Closed) => break,
            Wake::Input(Input::Redraw) => {}
            Wake::Input(Input::Key(key)) => match ui.handle_key(&mut state, key) {
                Some(Action::LoggedIn | Action::Reload) => tasks.load(&mut state),
                Some(Action::Save) => tasks.save(&mut state),
                Some(Action::Quit) => break,
                None => {}
            },
        }
    }

    info!("mood journal closed");
    Ok(())
}
