use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use signbridge::config::DEFAULT_CONFIG_PATH;
use signbridge::{
    CommandOutcome, Config, ConsoleSurface, FeedMonitor, HttpFeedTransport, HttpGateway,
    PlaybackScheduler, SessionController, SessionService,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "signbridge", version, about = "Client for the sign language translation service")]
struct Cli {
    /// Config file (extension optional)
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Probe the service health endpoint
    Health,
    /// Record a signing session and print its summary
    Record {
        #[arg(long, default_value_t = 10)]
        seconds: u64,
    },
    /// Convert text to signs and play them back
    Text { text: String },
    /// Convert speech captured by the service to signs
    Speech,
    /// Speak the last recorded sentence
    Speak,
    /// Supervise the video feed and print status changes
    Watch {
        #[arg(long, default_value_t = 60)]
        seconds: u64,
    },
}

struct App {
    config: Config,
    gateway: Arc<HttpGateway>,
    console: Arc<ConsoleSurface>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = Config::load(&cli.config)?;
    info!("Signbridge v{}", env!("CARGO_PKG_VERSION"));
    info!("Service: {}", config.service.base_url);

    let gateway = Arc::new(
        HttpGateway::from_config(&config.service).context("Failed to create service gateway")?,
    );
    let app = App {
        config,
        gateway,
        console: Arc::new(ConsoleSurface::new()),
    };

    match cli.command {
        Command::Health => health(&app).await,
        Command::Record { seconds } => record(&app, seconds).await,
        Command::Text { text } => {
            let scheduler = scheduler(&app);
            let outcome = scheduler.convert_text(&text).await;
            play(&app, &scheduler, outcome).await
        }
        Command::Speech => {
            let scheduler = scheduler(&app);
            let outcome = scheduler.convert_speech().await;
            play(&app, &scheduler, outcome).await
        }
        Command::Speak => {
            let controller = controller(&app);
            expect_applied(controller.speak().await)
        }
        Command::Watch { seconds } => watch(&app, seconds).await,
    }
}

fn controller(app: &App) -> SessionController {
    SessionController::new(
        app.gateway.clone(),
        app.console.clone(),
        app.console.clone(),
        app.config.session.clone(),
    )
}

fn scheduler(app: &App) -> PlaybackScheduler {
    PlaybackScheduler::new(
        app.gateway.clone(),
        app.console.clone(),
        app.console.clone(),
        app.config.playback.clone(),
    )
}

fn expect_applied(outcome: CommandOutcome) -> Result<()> {
    match outcome {
        CommandOutcome::Failed(e) => bail!(e),
        _ => Ok(()),
    }
}

async fn health(app: &App) -> Result<()> {
    let health = app.gateway.health().await?;
    println!("{}", serde_json::to_string_pretty(&health)?);
    if !health.healthy {
        bail!("Service at {} reports unhealthy", app.gateway.base_url());
    }
    Ok(())
}

async fn record(app: &App, seconds: u64) -> Result<()> {
    let controller = controller(app);
    expect_applied(controller.start().await)?;

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted, stopping"),
    }

    let outcome = controller.stop().await;
    info!("Session stats: {}", serde_json::to_string(&controller.stats())?);
    controller.dispose();
    expect_applied(outcome)
}

async fn play(app: &App, scheduler: &PlaybackScheduler, outcome: CommandOutcome) -> Result<()> {
    expect_applied(outcome)?;
    if !scheduler.is_playing() {
        return Ok(());
    }

    let total = scheduler.progress().total as u32;
    let limit = app.config.playback.reveal_interval() * (total + 2);

    tokio::select! {
        result = tokio::time::timeout(limit, app.console.playback_finished()) => {
            result.context("Playback did not finish")?;
        }
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    scheduler.dispose();
    Ok(())
}

async fn watch(app: &App, seconds: u64) -> Result<()> {
    let transport = Arc::new(HttpFeedTransport::new(
        &app.config.service.base_url,
        &app.config.feed.path,
        app.config.feed.load_timeout(),
    )?);
    info!("Watching feed at {}", transport.feed_url());

    let monitor = FeedMonitor::new(
        transport,
        app.console.clone(),
        app.console.clone(),
        app.config.feed.clone(),
    );
    monitor.start();

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs(seconds)) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    println!("{}", serde_json::to_string_pretty(&monitor.snapshot())?);
    monitor.dispose();
    Ok(())
}
