use clap::{Parser, Subcommand};
use qrewrite_domain::{CliOverrides, MarkerLabel, ProbeSize};
use tracing::info;

mod bootstrap;
mod replay;

#[derive(Parser)]
#[command(name = "qrewrite")]
#[command(version)]
#[command(about = "qrewrite - DNS query-name marker rewriting for path MTU measurement")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Probe size stamped into IPv4 marker labels
    #[arg(long, global = true)]
    ipv4_probe_size: Option<ProbeSize>,

    /// Probe size stamped into IPv6 marker labels
    #[arg(long, global = true)]
    ipv6_probe_size: Option<ProbeSize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a hook over every frame of a pcap capture
    Replay(replay::ReplayArgs),

    /// Validate the configuration and print it
    CheckConfig,

    /// Print the pristine marker label for a probe size
    Marker {
        /// Four-digit probe size
        #[arg(long, default_value_t = ProbeSize::DEFAULT)]
        size: ProbeSize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cli_overrides = CliOverrides {
        ipv4_probe_size: cli.ipv4_probe_size,
        ipv6_probe_size: cli.ipv6_probe_size,
        log_level: cli.log_level.clone(),
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config);
    bootstrap::log_config_source(cli.config.as_deref());

    match cli.command {
        Command::Replay(args) => {
            info!("Starting qrewrite v{}", env!("CARGO_PKG_VERSION"));
            let summary = replay::run(&args, config.probe)?;
            summary.log(args.direction);
        }
        Command::CheckConfig => {
            print!("{}", config.to_toml()?);
        }
        Command::Marker { size } => {
            println!("{}", MarkerLabel::pristine(size));
        }
    }

    Ok(())
}
