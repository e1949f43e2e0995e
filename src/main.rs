use clap::{Parser, Subcommand};
use microfwd::config::{self, ChannelProtocol};
use microfwd::dataplane::Forwarder;
use microfwd::protocol::Name;
use microfwd::telemetry::{init_logging, LogConfig, MetricsRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// How often the event loop polls when no packets are arriving.
const POLL_INTERVAL_MS: u64 = 10;

#[derive(Parser)]
#[command(name = "microfwd")]
#[command(about = "A micro NDN forwarder implemented in Rust")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the forwarder daemon
    Run {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Validate config.toml without starting the forwarder
    Validate {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Validate { config }) => {
            if let Err(e) = cmd_validate(&config) {
                eprintln!("[ERROR] {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Run { config }) => {
            if let Err(e) = cmd_run(&config) {
                eprintln!("[ERROR] {}", e);
                std::process::exit(1);
            }
        }
        None => {
            if let Err(e) = cmd_run(&PathBuf::from("config.toml")) {
                eprintln!("[ERROR] {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn cmd_validate(config_path: &PathBuf) -> Result<(), String> {
    println!("[INFO] Validating {}...", config_path.display());

    let cfg = config::load(config_path).map_err(|e| format!("failed to parse config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();

    if validation.has_errors() {
        Err("validation failed".to_string())
    } else {
        println!("[INFO] Configuration is valid");
        Ok(())
    }
}

fn cmd_run(config_path: &PathBuf) -> Result<(), String> {
    let cfg = config::load(config_path).map_err(|e| format!("failed to parse config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();
    if validation.has_errors() {
        return Err("validation failed".to_string());
    }

    // RUST_LOG env var takes priority over the config file
    let log_config: Option<LogConfig> = cfg.log.as_ref().map(Into::into);
    init_logging(log_config.as_ref());

    let metrics = Arc::new(MetricsRegistry::new());
    let mut forwarder = Forwarder::new((&cfg.forwarder).into(), metrics);

    for channel in &cfg.channels {
        let addr = channel
            .bind
            .parse()
            .map_err(|e| format!("channel bind '{}': {}", channel.bind, e))?;
        let bound = match channel.protocol {
            ChannelProtocol::Tcp => forwarder.add_tcp_channel(addr),
            ChannelProtocol::Udp => forwarder.add_udp_channel(addr),
        }
        .map_err(|e| format!("failed to bind channel on '{}': {}", channel.bind, e))?;
        let scheme = match channel.protocol {
            ChannelProtocol::Tcp => "tcp",
            ChannelProtocol::Udp => "udp",
        };
        info!("listening on {}://{}", scheme, bound);
    }

    // Static uplink faces, remembered by uri for the route table below
    let mut face_ids = Vec::new();
    for face in &cfg.faces {
        let (protocol, host, port) =
            config::parse_face_uri(&face.uri).map_err(|e| e.to_string())?;
        let id = match protocol {
            ChannelProtocol::Tcp => forwarder.add_tcp_face(&host, port),
            ChannelProtocol::Udp => forwarder.add_udp_face(&host, port),
        }
        .map_err(|e| format!("failed to connect face '{}': {}", face.uri, e))?;
        face_ids.push((face.uri.clone(), id));
    }

    for route in &cfg.routes {
        let prefix = Name::from_uri(&route.prefix).map_err(|e| e.to_string())?;
        let Some((_, face_id)) = face_ids.iter().find(|(uri, _)| *uri == route.face) else {
            // Validation already rejected this; races with face setup
            // failures are the only way here.
            return Err(format!("route references unknown face '{}'", route.face));
        };
        forwarder.add_route(&prefix, *face_id, route.cost);
        info!("route {} via {} (cost {})", route.prefix, route.face, route.cost);
    }

    info!("forwarder started, processing packets...");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to create runtime: {}", e))?;

    rt.block_on(async move {
        let mut tick = tokio::time::interval(Duration::from_millis(POLL_INTERVAL_MS));
        loop {
            tokio::select! {
                _ = tick.tick() => {
                    if let Err(e) = forwarder.process_events() {
                        // Channel-level failure; faces keep working
                        error!("event loop error: {}", e);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("shutting down");
                    break;
                }
            }
        }
    });

    Ok(())
}
