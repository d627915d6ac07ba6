use anyhow::Context;
use clap::Parser;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trackrak_app::commands::HELP;
use trackrak_app::{build_controller, open_store, parse_command, Cli, Command, CommandError, ConsoleHost};
use trackrak_core::PageSnapshot;
use trackrak_store::app_config::Config;
use trackrak_store::SessionStore;
use trackrak_widget::{ControlSignal, Lifecycle, WidgetFlowController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "trackrak_app=debug,trackrak_widget=debug,trackrak_offer=info,trackrak_catalog=info,trackrak_core=info,trackrak_store=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!(backend = ?config.store.backend, "Starting TrackRak console");

    let session = SessionStore::new(open_store(&config.store).await?);

    // Toolbar and reload signals
    let (signal_tx, mut signal_rx) = mpsc::channel(16);
    let url = cli.url.unwrap_or_else(|| config.widget.activation_page_url.clone());
    let markup = match &cli.html {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => String::new(),
    };
    let host = Arc::new(ConsoleHost::new(PageSnapshot::new(url, markup), signal_tx.clone()));

    let lifecycle = Lifecycle::new();
    let mut controller = build_controller(&config, &lifecycle, session.clone(), host.clone())?;
    if cli.open {
        controller.reopen().await;
    } else {
        controller.start().await;
    }
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(signal) = signal_rx.recv() => controller.handle_signal(signal).await,
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                let command = match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => command,
                    Err(CommandError::Empty) => continue,
                    Err(e) => {
                        eprintln!("{}", e);
                        continue;
                    }
                };
                if let Err(e) = run_command(&mut controller, &host, &session, &signal_tx, command).await {
                    tracing::error!("Command failed: {:#}", e);
                }
            }
        }
    }

    tracing::info!("Console closed");
    Ok(())
}

async fn run_command(
    controller: &mut WidgetFlowController,
    host: &ConsoleHost,
    session: &SessionStore,
    signals: &mpsc::Sender<ControlSignal>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => controller.submit_login(&email, password).await,
        Command::Navigate => controller.navigate().await,
        Command::Retry => controller.retry().await,
        Command::Activate => controller.activate().await,
        Command::Dismiss => controller.dismiss().await,
        Command::Reopen => signals.send(ControlSignal::Reopen).await?,
        Command::Close => signals.send(ControlSignal::Close).await?,
        Command::Page { url, html } => {
            let markup = match html {
                Some(path) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                None => String::new(),
            };
            host.set_page(PageSnapshot::new(url, markup));
            // Navigating reloads the page
            signals.send(ControlSignal::Reload).await?;
        }
        Command::Status => {
            let stored = session.load().await;
            let summary = json!({
                "panel": format!("{:?}", controller.state()),
                "isPremium": stored.is_premium,
                "signedIn": stored.identity().is_complete(),
                "widgetClosed": stored.widget_closed,
                "pendingMessage": stored.pending_message,
                "lastActivatedAt": stored.last_activated_at,
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}
