//! # ChoreSync
//!
//! Push notifications for household chat messages, household notifications,
//! and chore deadlines.
//!
//! Usage:
//!   choresync serve                              # HTTP gateway + hourly reminder scans
//!   choresync scan                               # One reminder cycle, report on stdout
//!   choresync trigger households/h1/messages/m1  # Fire the created-record trigger
//!   choresync seed fixture.json                  # Load documents into the store

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use choresync_core::config::ChoreSyncConfig;
use choresync_core::traits::{DocumentStore, PushSender};
use choresync_core::types::{CollectionPath, Document, fields_from_json};
use choresync_gateway::AppState;
use choresync_scheduler::{
    Dispatcher, DocumentCreated, EventNotifier, MembershipResolver, ReminderScanner, Schedule,
    spawn_reminder_loop,
};

#[derive(Parser)]
#[command(
    name = "choresync",
    version,
    about = "🏠 ChoreSync: household push notifications and chore reminders"
)]
struct Cli {
    /// Config file (default: ~/.choresync/config.toml)
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway and the reminder scheduler
    Serve {
        /// Override the gateway port
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not run scheduled reminder scans
        #[arg(long)]
        no_reminders: bool,
    },
    /// Run one reminder scan and print the report
    Scan,
    /// Fire the document-created trigger for a record path
    Trigger {
        /// e.g. households/h1/messages/m1
        path: String,

        /// Record fields as a JSON object; stored before the trigger fires.
        /// Without it the record is read from the store.
        #[arg(long)]
        data: Option<String>,
    },
    /// Load a JSON fixture into the configured store
    Seed {
        /// Fixture file: { "collection/path": { "docId": { fields } } }
        file: String,
    },
}

fn expand_path(p: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(p).to_string())
}

fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        "choresync=debug,choresync_scheduler=debug,choresync_gateway=debug,tower_http=debug"
    } else {
        "choresync=info,choresync_scheduler=info,choresync_gateway=info,choresync_store=info,choresync_push=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .init();
    }
}

fn load_config(path: Option<&str>) -> Result<ChoreSyncConfig> {
    let config = match path {
        Some(p) => {
            let path = expand_path(p);
            ChoreSyncConfig::load_from(&path)
                .with_context(|| format!("loading {}", path.display()))?
        }
        None => ChoreSyncConfig::load()?,
    };
    Ok(config)
}

/// Store and push sender, built once and shared by every component.
fn connect(config: &ChoreSyncConfig) -> Result<(Arc<dyn DocumentStore>, Arc<dyn PushSender>)> {
    let store = choresync_store::open_store(&config.store)?;
    let sender = choresync_push::create_sender(&config.push)?;
    tracing::info!("🔌 Store: {}, push: {}", store.name(), sender.name());
    Ok((store, sender))
}

fn notifier(store: &Arc<dyn DocumentStore>, sender: &Arc<dyn PushSender>) -> EventNotifier {
    EventNotifier::new(
        MembershipResolver::new(store.clone()),
        Dispatcher::new(sender.clone()),
    )
}

fn scanner(
    config: &ChoreSyncConfig,
    store: &Arc<dyn DocumentStore>,
    sender: &Arc<dyn PushSender>,
) -> ReminderScanner {
    ReminderScanner::new(store.clone(), sender.clone())
        .with_concurrency(config.reminders.household_concurrency)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { port, no_reminders } => {
            if let Some(port) = port {
                config.gateway.port = port;
            }
            let (store, sender) = connect(&config)?;
            let scanner = Arc::new(scanner(&config, &store, &sender));

            let reminder_task = if config.reminders.enabled && !no_reminders {
                let schedule = Schedule::parse(&config.reminders.schedule)?;
                Some(tokio::spawn(spawn_reminder_loop(scanner.clone(), schedule)))
            } else {
                tracing::info!("⏸️ Scheduled reminders disabled");
                None
            };

            let state = AppState {
                gateway_config: config.gateway.clone(),
                notifier: notifier(&store, &sender),
                store,
                scanner,
                start_time: std::time::Instant::now(),
            };

            tokio::select! {
                result = choresync_gateway::start(state) => result?,
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("👋 Shutting down");
                }
            }
            if let Some(task) = reminder_task {
                task.abort();
            }
        }

        Commands::Scan => {
            let (store, sender) = connect(&config)?;
            let report = scanner(&config, &store, &sender).run_cycle().await;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }

        Commands::Trigger { path, data } => {
            let (store, sender) = connect(&config)?;
            let (collection, id) = path
                .trim_matches('/')
                .rsplit_once('/')
                .context("path must name a document: <collection>/<id>")?;
            let collection = CollectionPath::parse(collection)?;

            let fields = match data {
                Some(raw) => {
                    let json: serde_json::Value =
                        serde_json::from_str(&raw).context("--data is not valid JSON")?;
                    let serde_json::Value::Object(map) = json else {
                        anyhow::bail!("--data must be a JSON object");
                    };
                    let fields = fields_from_json(map)?;
                    store
                        .put(
                            &collection,
                            Document {
                                id: id.to_string(),
                                fields: fields.clone(),
                            },
                        )
                        .await?;
                    Some(fields)
                }
                None => store.get(&collection, id).await?.map(|doc| doc.fields),
            };

            let event = DocumentCreated::from_path(&path, fields).with_context(|| {
                format!("'{path}' is not a household message or notification")
            })?;
            let outcome = notifier(&store, &sender).handle(&event).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }

        Commands::Seed { file } => {
            let path = expand_path(&file);
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let fixture: serde_json::Value = serde_json::from_str(&content)?;
            let (store, _) = connect(&config)?;
            let written = choresync_store::fixture::seed(store.as_ref(), fixture).await?;
            println!("🌱 Seeded {written} document(s) into {}", store.name());
        }
    }

    Ok(())
}
