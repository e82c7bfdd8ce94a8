//! # Feeder Daemon Binary
//!
//! Network-triggered servo controller: accepts single-digit commands over
//! TCP and converts each into a bounded servo angle with automatic return
//! to home.
//!
//! # Usage
//!
//! ```bash
//! # Run with the simulation pulse driver and default configuration
//! feederd --simulate
//!
//! # Run with an explicit config file and port override
//! feederd --config /etc/feeder/feeder.toml --port 9090
//!
//! # Verbose logging
//! feederd -s -v
//! ```

#![deny(warnings)]

use clap::Parser;
use feeder_common::config::{ConfigError, ConfigLoader, FeederConfig};
use feeder_hal::{DriverRegistry, ServoController};
use feederd::dispatch::ServoCommandHandler;
use feederd::link::{HostLink, LinkMonitor};
use feederd::server::CommandServer;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

/// Feeder daemon - TCP digit commands to servo actuation
#[derive(Parser, Debug)]
#[command(name = "feederd")]
#[command(version)]
#[command(about = "Network command listener driving a pulse-width-modulated servo")]
#[command(long_about = None)]
struct Args {
    /// Path to configuration file (feeder.toml)
    #[arg(short, long, default_value = "/etc/feeder/feeder.toml")]
    config: PathBuf,

    /// Listen port override (0 = use the default port)
    #[arg(short, long)]
    port: Option<u16>,

    /// Force simulation driver (exclusive - ignores all other drivers)
    #[arg(short = 's', long)]
    simulate: bool,

    /// Load specific driver (can be specified multiple times)
    #[arg(short, long = "driver", action = clap::ArgAction::Append)]
    drivers: Vec<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("Startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    setup_tracing(&args);

    info!("feederd v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration; a missing file yields the defaults.
    let config = match FeederConfig::load(&args.config) {
        Ok(config) => {
            info!("Loaded configuration from {:?}", args.config);
            config
        }
        Err(ConfigError::FileNotFound) => {
            info!(
                "No configuration file at {:?}, using defaults",
                args.config
            );
            FeederConfig::default()
        }
        Err(e) => return Err(e.into()),
    };
    config.validate()?;

    // Determine driver to use
    let driver_name = if args.simulate {
        info!("Simulation mode enabled (exclusive)");
        "simulation".to_string()
    } else if !args.drivers.is_empty() {
        info!("Drivers from CLI: {:?}", args.drivers);
        args.drivers[0].clone()
    } else {
        "simulation".to_string()
    };

    // Servo bring-up. A failure here is contained: the listener still
    // serves and answers every command with the not-initialized error.
    let registry = DriverRegistry::with_builtin_drivers();
    let driver = registry.create_driver(&driver_name)?;
    let mut servo = ServoController::new(driver, &config.servo);
    let servo = match servo.init() {
        Ok(()) => Some(servo),
        Err(e) => {
            error!("Servo initialization failed: {}. Commands will be rejected.", e);
            None
        }
    };

    // Wait for the link with a bounded timeout; standalone mode on expiry.
    let link = HostLink;
    let link_timeout = Duration::from_secs(config.link.wait_timeout_s);
    let link_ready = link.wait_ready(link_timeout);
    if !link_ready {
        warn!(
            "Link not ready after {}s, continuing in standalone mode",
            config.link.wait_timeout_s
        );
    }

    // Listener bring-up; bind failures are fatal.
    let port = args.port.unwrap_or(config.listener.port);
    let mut server = CommandServer::new(config.listener.backlog);
    server.init(port)?;

    let home_delay = Duration::from_millis(config.servo.home_delay_ms);
    server.register_handler(Box::new(ServoCommandHandler::new(servo, home_delay)));

    // Graceful shutdown on SIGINT/SIGTERM.
    let running = server.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    server.start()?;

    info!("=================================================");
    info!("{} service ready", config.shared.service_name);
    info!("Link: {}", if link_ready { "ready" } else { "standalone" });
    if let Some(address) = link.address() {
        info!("Address: {}", address);
    }
    info!("TCP port: {}", server.port());
    info!("=================================================");
    info!("Send commands '0'-'9' to drive the servo (0°-180°)");

    // Block until the serve loop exits.
    server.join();

    info!("feederd shutdown complete");
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
