//! pinwire Controller CLI
//!
//! Waits for one device to connect, then performs a single operation on it.

use std::net::TcpListener;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand, ValueEnum};
use pinwire::controller::DeviceLink;
use pinwire::pin::Level;
use pinwire::{Config, Message, PinwireError};
use tracing_subscriber::{fmt, EnvFilter};

/// pinwire controller
#[derive(Parser, Debug)]
#[command(name = "pinwire-ctl")]
#[command(about = "Control a pinwire device")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "0.0.0.0:5555")]
    listen: String,

    /// Acknowledgement timeout in milliseconds
    #[arg(short, long, default_value = "15000")]
    ack_timeout_ms: u64,

    /// Treat the device as gone without a PING for this long (0 disables)
    #[arg(long, default_value = "10000")]
    expect_ping_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drive a pin
    Write {
        /// Pin number
        pin: u8,

        /// Level to drive
        #[arg(value_enum)]
        level: LevelArg,
    },

    /// Read a pin
    Read {
        /// Pin number
        pin: u8,
    },

    /// Send a STRING message
    Text {
        /// Text to send
        text: String,
    },

    /// Print messages from the device
    Watch {
        /// Stop after this many seconds
        #[arg(short, long)]
        seconds: Option<u64>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LevelArg {
    Low,
    High,
}

impl From<LevelArg> for Level {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Low => Level::Low,
            LevelArg::High => Level::High,
        }
    }
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,pinwire=debug"));

    fmt().with_env_filter(filter).with_target(true).init();

    let args = Args::parse();

    let config = Config::builder()
        .ack_timeout_ms(args.ack_timeout_ms)
        .expect_ping_within_ms((args.expect_ping_ms > 0).then_some(args.expect_ping_ms))
        .build();

    if let Err(e) = run(&args, &config) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, config: &Config) -> pinwire::Result<()> {
    config.validate()?;

    let listener = TcpListener::bind(&args.listen)?;
    tracing::info!("Waiting for a device on {}", listener.local_addr()?);

    let mut link = DeviceLink::accept(&listener, config)?;

    match &args.command {
        Commands::Write { pin, level } => {
            link.write_pin(*pin, (*level).into())?;
            println!("pin {} set {:?}", pin, Level::from(*level));
        }
        Commands::Read { pin } => {
            let level = link.read_pin(*pin)?;
            println!("pin {} is {:?}", pin, level);
        }
        Commands::Text { text } => {
            link.request(&Message::string(text))?;
            println!("text acknowledged");
        }
        Commands::Watch { seconds } => watch(&link, seconds.map(Duration::from_secs))?,
    }

    Ok(())
}

fn watch(link: &DeviceLink, limit: Option<Duration>) -> pinwire::Result<()> {
    let started = Instant::now();

    while limit.map_or(true, |limit| started.elapsed() < limit) {
        if !link.is_alive() {
            return Err(PinwireError::Timeout("device keepalive".to_string()));
        }
        if let Some(message) = link.recv(Duration::from_millis(500))? {
            println!("{}", message);
        }
    }
    Ok(())
}
