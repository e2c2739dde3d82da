use clap::{Parser, Subcommand};
use etuition_notify::adapters::RestNotificationSource;
use etuition_notify::business::{Inbox, SharedAlertBoard};
use etuition_notify::domain::{ClientConfig, ListParams, Notification, NotificationSource, TransportError};
use etuition_notify::infra::{ConfigManager, CredentialStore, NotificationTransport};
use etuition_notify::polling::{NotificationPoller, PollSettings, SubscriberRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::{Handle, Runtime};

#[derive(Parser)]
#[command(name = "etuition-notify", version, about = "eTuitionBD notification client")]
struct Cli {
    /// Directory holding config.toml and credentials.toml
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Overrides `base_url` from the config file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Store the bearer token used for every request
    Login { token: String },
    /// Forget the stored token
    Logout,
    /// Show one page of notifications
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        unread_only: bool,
    },
    /// Print the unread count
    Count,
    /// Mark one notification as read
    Read { id: String },
    /// Mark every notification as read
    ReadAll,
    /// Delete one notification
    Delete { id: String },
    /// Delete all read notifications
    ClearRead,
    /// Poll for new notifications until Ctrl-C
    Watch {
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let runtime = Runtime::new()?;
    let handle = runtime.handle().clone();
    runtime.block_on(run(cli, handle))
}

async fn run(cli: Cli, rt_handle: Handle) -> anyhow::Result<()> {
    let config_dir = match cli.config_dir {
        Some(dir) => dir,
        None => ConfigManager::default_dir()?,
    };
    let config_manager = ConfigManager::new(config_dir);
    let mut config = config_manager.init().await?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }

    let credentials = Arc::new(CredentialStore::new(config_manager.credentials_path()));
    credentials.load().await?;

    let source: Arc<dyn NotificationSource> = Arc::new(RestNotificationSource::new(
        config.base_url.clone(),
        credentials.clone(),
    )?);
    let transport = NotificationTransport::new(source.clone());
    let inbox = Arc::new(Inbox::new(transport.clone(), SharedAlertBoard::new()));

    match cli.command {
        Command::Login { token } => {
            credentials.save(token).await?;
            println!("Token saved to {}", config_manager.credentials_path().display());
        }
        Command::Logout => {
            credentials.clear().await?;
            println!("Logged out");
        }
        Command::List {
            page,
            limit,
            unread_only,
        } => {
            let params = ListParams {
                page,
                limit: limit.unwrap_or(config.page_size),
                unread_only,
            };
            inbox.refresh(params).await;
            print_inbox(&inbox, credentials.has_token());
        }
        Command::Count => {
            println!("{}", transport.fetch_unread_count().await);
        }
        Command::Read { id } => report(&inbox, inbox.mark_read(&id).await, "Marked as read")?,
        Command::ReadAll => report(&inbox, inbox.mark_all_read().await, "All marked as read")?,
        Command::Delete { id } => report(&inbox, inbox.delete(&id).await, "Deleted")?,
        Command::ClearRead => {
            report(&inbox, inbox.clear_read().await, "Read notifications cleared")?
        }
        Command::Watch { interval_ms } => {
            watch(
                rt_handle,
                source,
                inbox,
                &config,
                interval_ms.map(Duration::from_millis),
            )
            .await?;
        }
    }

    Ok(())
}

async fn watch(
    rt_handle: Handle,
    source: Arc<dyn NotificationSource>,
    inbox: Arc<Inbox>,
    config: &ClientConfig,
    interval: Option<Duration>,
) -> anyhow::Result<()> {
    let registry = Arc::new(SubscriberRegistry::new());
    let poller = NotificationPoller::new(
        rt_handle,
        source,
        registry.clone(),
        PollSettings::from(config),
    );

    inbox
        .refresh(ListParams {
            limit: config.page_size,
            ..Default::default()
        })
        .await;

    let badge_inbox = inbox.clone();
    let shown = AtomicU64::new(u64::MAX);
    registry.on_unread_count_change(move |count| {
        badge_inbox.apply_unread_count(count);
        if shown.swap(count, Ordering::Relaxed) != count {
            println!("({count} unread)");
        }
    });

    let list_inbox = inbox.clone();
    registry.on_new_notification(move |notification| {
        if list_inbox.record_new(notification) {
            println!("{}", format_notification(notification));
        }
    });

    match interval {
        Some(interval) => poller.start(interval),
        None => poller.start_default(),
    }
    log::info!("Watching for notifications, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    poller.stop();
    registry.remove_all_listeners();
    Ok(())
}

fn report(inbox: &Inbox, result: Result<(), TransportError>, done: &str) -> anyhow::Result<()> {
    match result {
        Ok(()) => {
            println!("{done}");
            Ok(())
        }
        Err(e) => {
            for alert in inbox.alerts().active() {
                eprintln!("{}: {}", alert.title, alert.message);
            }
            Err(e.into())
        }
    }
}

fn print_inbox(inbox: &Inbox, logged_in: bool) {
    if !logged_in {
        println!("Not logged in; run `etuition-notify login <token>` first");
        return;
    }

    let items = inbox.items();
    if items.is_empty() {
        println!("No notifications");
    }
    for notification in &items {
        println!("{}", format_notification(notification));
    }

    let (page, pages) = inbox.page();
    println!(
        "page {page}/{pages}, {} total, {} unread",
        inbox.total(),
        inbox.unread_count()
    );
}

fn format_notification(n: &Notification) -> String {
    let marker = if n.is_read { ' ' } else { '*' };
    let mut line = format!(
        "{marker} {} [{}/{}] {}: {}",
        n.created_at.format("%Y-%m-%d %H:%M"),
        n.kind,
        n.priority.label(),
        n.title,
        n.message
    );
    if let Some(link) = &n.link {
        line.push_str(&format!(" ({link})"));
    }
    line.push_str(&format!("  #{}", n.id));
    line
}
