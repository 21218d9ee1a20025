//! Signpost console binary - composition root.
//!
//! Ties the Signpost crates together into a single executable:
//! 1. Load configuration from TOML
//! 2. Load the conversation document and build the first snapshot
//! 3. Wire sessions, statistics and the feedback relay into the engine
//! 4. Serve a console conversation on stdin/stdout until EOF or Ctrl-C

mod cli;
mod relay;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use chrono_tz::Tz;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use signpost_chat::{
    ConversationEngine, FeedbackForwarder, InteractionStats, MemorySessionStore,
    MetricsCollector, NoChannelForwarder, NullMetrics, NullSessionStore, Reply, SessionStore,
    SnapshotHandle, START_COMMAND,
};
use signpost_core::config::SignpostConfig;
use signpost_core::types::UserContext;
use signpost_graph::{source_from_url, DocumentSource};
use signpost_search::{IndexOptions, Morphology};

use crate::cli::CliArgs;

/// How often expired sessions are dropped from memory.
const SESSION_PURGE_INTERVAL_SECS: u64 = 60;

/// Drop expired sessions periodically so idle users do not accumulate.
async fn session_purge_loop(store: Arc<MemorySessionStore>) {
    let mut interval =
        tokio::time::interval(tokio::time::Duration::from_secs(SESSION_PURGE_INTERVAL_SECS));
    loop {
        interval.tick().await;
        match store.purge_expired() {
            Ok(0) => {}
            Ok(purged) => tracing::debug!(purged, remaining = store.len(), "Expired sessions purged"),
            Err(e) => tracing::warn!(error = %e, "Session purge failed"),
        }
    }
}

/// One console user talking to the engine.
struct Console {
    engine: ConversationEngine,
    source: Arc<dyn DocumentSource>,
    user: UserContext,
    photo_dir: PathBuf,
}

impl Console {
    async fn handle(&self, text: &str) {
        let reply = match self.engine.handle_text(&self.user, text) {
            Ok(reply) => reply,
            Err(e) => self.engine.recover(&self.user, text, &e),
        };

        for line in render::reply_lines(&reply, &self.photo_dir) {
            println!("{}", line);
        }
        if reply.reload_requested {
            println!("{}", self.reload().await);
        }
        self.print_keyboard(&reply);
    }

    /// Rebuild the conversation from its source off the async runtime.
    async fn reload(&self) -> String {
        let snapshots = Arc::clone(self.engine.snapshots());
        let source = Arc::clone(&self.source);
        let result =
            tokio::task::spawn_blocking(move || snapshots.reload(source.as_ref())).await;

        let m = self.engine.messages();
        match result {
            Ok(Ok(snapshot)) => {
                let reloader = self.user.display_name();
                self.engine.metrics().conversation_reloaded(&reloader);
                tracing::info!(
                    reloader = %reloader,
                    revision = %snapshot.revision,
                    nodes = snapshot.graph.len(),
                    "Conversation reloaded on request"
                );
                m.reload_done.clone()
            }
            // The handle already logged the failure.
            Ok(Err(_)) => m.reload_failed.clone(),
            Err(e) => {
                tracing::error!(error = %e, "Reload task failed");
                m.reload_failed.clone()
            }
        }
    }

    fn print_keyboard(&self, reply: &Reply) {
        let labels = render::keyboard_labels(&reply.keyboard, self.engine.messages());
        if labels.is_empty() {
            return;
        }
        let buttons: Vec<String> = labels.iter().map(|label| format!("[{}]", label)).collect();
        println!("{}", buttons.join(" "));
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is read before tracing starts so its log level applies.
    let config_file = args.resolve_config_path();
    let (config, config_error) = match SignpostConfig::load(&config_file) {
        Ok(config) => (config, None),
        Err(e) => (SignpostConfig::default(), Some(e)),
    };

    // Tracing. Logs go to stderr so they do not mix with the conversation.
    let level = args.resolve_log_level(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Signpost v{}", env!("CARGO_PKG_VERSION"));
    match config_error {
        None => tracing::info!(path = %config_file.display(), "Configuration loaded"),
        Some(e) => tracing::warn!(
            path = %config_file.display(),
            error = %e,
            "Failed to load config, using defaults"
        ),
    }

    // Conversation snapshot. Remote sources block, so the first load runs
    // off the async runtime like every reload.
    let location = args.resolve_document(&config.conversation.source);
    let source: Arc<dyn DocumentSource> = Arc::from(source_from_url(&location)?);
    tracing::info!(source = %source.describe(), "Loading conversation");
    let morphology = Arc::new(Morphology::for_languages(config.search.languages.as_slice())?);
    let snapshots = {
        let source = Arc::clone(&source);
        let root = config.conversation.root_node.clone();
        let options = IndexOptions::from(&config.search);
        tokio::task::spawn_blocking(move || {
            SnapshotHandle::load(source.as_ref(), root, morphology, options)
        })
        .await??
    };
    let snapshots = Arc::new(snapshots);

    // Sessions.
    let sessions: Arc<dyn SessionStore> = if config.session.persist {
        let store = Arc::new(MemorySessionStore::with_ttl_minutes(config.session.ttl_minutes));
        tokio::spawn(session_purge_loop(Arc::clone(&store)));
        tracing::info!(ttl_minutes = config.session.ttl_minutes, "In-memory sessions enabled");
        store
    } else {
        tracing::info!("Sessions disabled, every message starts at the root");
        Arc::new(NullSessionStore)
    };

    // Statistics.
    let metrics: Arc<dyn MetricsCollector> = if config.metrics.enabled {
        let timezone = config.metrics.timezone.parse::<Tz>().unwrap_or_else(|e| {
            tracing::warn!(
                timezone = %config.metrics.timezone,
                error = %e,
                "Unknown time zone, statistics will use UTC"
            );
            Tz::UTC
        });
        Arc::new(InteractionStats::new(config.metrics.top_nodes).with_timezone(timezone))
    } else {
        Arc::new(NullMetrics)
    };

    // Feedback relay.
    let mut relay_task = None;
    let forwarder: Arc<dyn FeedbackForwarder> = match config.feedback.channel.clone() {
        Some(channel) => {
            let (forwarder, task) = relay::spawn(channel);
            relay_task = Some(task);
            Arc::new(forwarder)
        }
        None => {
            tracing::info!("No feedback channel configured, feedback will not be relayed");
            Arc::new(NoChannelForwarder)
        }
    };

    let engine = ConversationEngine::new(
        snapshots,
        sessions,
        metrics,
        forwarder,
        config.messages.clone(),
        config.search.shortlist_limit,
    );

    let user = UserContext {
        user_id: args.user_id,
        username: args.username.clone(),
        privileged: config.admin.is_admin(args.username.as_deref()),
    };
    tracing::info!(
        user = %user.display_name(),
        privileged = user.privileged,
        "Console session ready"
    );

    let console = Console {
        engine,
        source,
        user,
        photo_dir: PathBuf::from(&config.conversation.photo_dir),
    };

    // === Console loop ===

    console.handle(START_COMMAND).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => console.handle(&line).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    // The console owns the last forwarder; dropping it lets the relay
    // finish what is queued.
    drop(console);
    if let Some(task) = relay_task {
        relay::drain(task, relay::DRAIN_TIMEOUT).await;
    }

    tracing::info!("Signpost stopped");
    Ok(())
}
