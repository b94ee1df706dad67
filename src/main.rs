use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;

use pawtrack::tracking::{LiveTrackingClient, WebSocketTransport};
use pawtrack::web::{self, Config};

#[derive(Parser)]
#[command(name = "pawtrack")]
#[command(about = "Live delivery tracking for the pet-delivery marketplace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    CheckConfig { config: String },
    /// Serve the tracking status API
    Serve {
        #[arg(short, long, default_value = "pawtrack.yaml")]
        config: String,
    },
    /// Follow a booking's live position on the terminal
    Track {
        booking_id: String,
        #[arg(short, long, default_value = "pawtrack.yaml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::CheckConfig { config } => check_config(&config),
        Commands::Serve { config } => serve(&config).await,
        Commands::Track { booking_id, config } => track(&config, booking_id).await,
    }
}

fn load_config(path: &str) -> Option<Config> {
    match Config::from_file(path) {
        Ok(config) => Some(config),
        Err(e) => {
            eprintln!("Error loading config {}: {}", path, e);
            None
        }
    }
}

fn check_config(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    println!("Config is valid");
    println!("  stream: {}", config.stream.base_url);
    println!(
        "  reconnect: {:?} .. {:?}, {} attempts",
        config.stream.reconnect.initial_delay,
        config.stream.reconnect.max_delay,
        match config.stream.reconnect.max_attempts {
            0 => "unlimited".to_string(),
            n => n.to_string(),
        }
    );
    println!("  web: {} ({} api keys)", config.web.bind, config.api_keys.len());
    ExitCode::SUCCESS
}

async fn serve(path: &str) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    match web::run_server(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn track(path: &str, booking_id: String) -> ExitCode {
    let Some(config) = load_config(path) else {
        return ExitCode::FAILURE;
    };

    if let Err(e) = pawtrack::tracking::validate_booking_id(&booking_id) {
        eprintln!("{}", e);
        return ExitCode::FAILURE;
    }

    let transport = Arc::new(WebSocketTransport::new(
        config.stream.base_url.clone(),
        config.stream.token.clone(),
    ));
    let mut client = LiveTrackingClient::new(transport, config.stream.reconnect.clone());

    println!("Tracking booking {} (Ctrl-C to stop)", booking_id);
    client.connect(
        booking_id,
        |update| {
            println!(
                "{}  {:.5}, {:.5}  {:.1} km/h",
                update.timestamp.format("%H:%M:%S"),
                update.latitude,
                update.longitude,
                update.speed_kmh
            );
        },
        || println!("-- connection lost, reconnecting..."),
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to wait for Ctrl-C: {}", e);
    }
    client.disconnect();
    println!("Stopped");
    ExitCode::SUCCESS
}
