//! pinwire Device Binary
//!
//! Connects to a controller and serves pin commands from a simulated pin bank.

use clap::Parser;
use pinwire::pin::{Level, SimulatedPins, DEFAULT_PIN_COUNT};
use pinwire::transport::TcpTransport;
use pinwire::{Config, Session};
use tracing_subscriber::{fmt, EnvFilter};

/// pinwire device
#[derive(Parser, Debug)]
#[command(name = "pinwire-device")]
#[command(about = "Serve pin commands from a pinwire controller")]
#[command(version)]
struct Args {
    /// Controller address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:5555")]
    server: String,

    /// Wireless network name
    #[arg(long, requires = "passphrase")]
    ssid: Option<String>,

    /// Wireless network passphrase
    #[arg(long, requires = "ssid")]
    passphrase: Option<String>,

    /// Do not send keepalive PINGs
    #[arg(long)]
    no_keepalive: bool,

    /// Keepalive interval in milliseconds
    #[arg(short = 'i', long, default_value = "5000")]
    ping_interval_ms: u64,

    /// Number of simulated pins
    #[arg(short, long, default_value_t = DEFAULT_PIN_COUNT)]
    pins: usize,

    /// Pins whose simulated input level starts high
    #[arg(long, value_delimiter = ',')]
    high: Vec<u8>,

    /// Largest accepted payload in bytes
    #[arg(long, default_value = "16777216")]
    max_payload: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pinwire=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let args = Args::parse();

    tracing::info!("pinwire device v{}", pinwire::VERSION);

    // Build config from args
    let mut builder = Config::builder()
        .server_addr(&args.server)
        .keepalive_enabled(!args.no_keepalive)
        .keepalive_interval_ms(args.ping_interval_ms)
        .max_payload_size(args.max_payload);
    if let (Some(ssid), Some(passphrase)) = (&args.ssid, &args.passphrase) {
        builder = builder.network(ssid, passphrase);
    }
    let config = builder.build();

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        std::process::exit(1);
    }

    if let Some(ssid) = &config.ssid {
        tracing::info!("Network {} is expected to be joined by the platform", ssid);
    }

    let pins = SimulatedPins::new(args.pins);
    for pin in &args.high {
        if let Err(e) = pins.set_input_level(*pin, Level::High) {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    }

    // One attempt only; a supervisor restarts us if needed
    tracing::info!("Connecting to server {}", config.server_addr);
    let transport = match TcpTransport::connect(config.server_addr.as_str()) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!("Connection to server failed: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!("Connected to server");

    let mut session = Session::new(transport, pins, &config);
    if let Err(e) = session.run() {
        tracing::error!("Session error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Device stopped");
}
