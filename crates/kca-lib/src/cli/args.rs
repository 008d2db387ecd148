use crate::listing::Architecture;
use clap::{ArgAction, Parser};
use tracing::Level;
use tracing_subscriber;

#[derive(Debug, Clone)]
pub struct Command {
    pub architecture: Architecture,
    pub kernel_version: String,
    pub directory: String,
    pub config_path: Option<String>,
    pub index_url: Option<String>,
}

pub struct Args {
    pub command: Command,
    pub log_level: Level,
}

#[derive(Debug, Parser)]
#[command(
    name = "kca",
    version,
    about = "Fetch the Ubuntu debug-symbol package for a kernel and disassemble its vmlinux for crash analysis"
)]
struct Cli {
    #[arg(
        short = 'v',
        long = "verbose",
        help = "Sets the level of verbosity",
        action = ArgAction::Count
    )]
    verbose: u8,

    #[arg(
        short = 'a',
        long = "arch",
        value_name = "ARCH",
        help = "Architecture to filter on"
    )]
    arch: Architecture,

    #[arg(
        short = 'k',
        long = "kernel-version",
        value_name = "VERSION",
        help = "Kernel version to filter on, e.g. 5.4.0-42-generic"
    )]
    kernel_version: String,

    #[arg(
        short = 'd',
        long = "directory",
        value_name = "DIR",
        help = "Directory the debug package is downloaded and unpacked into",
        default_value = "."
    )]
    directory: String,

    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        help = "Optional config file (yaml, toml or json)"
    )]
    config: Option<String>,

    #[arg(
        long = "index-url",
        value_name = "URL",
        help = "Overrides the package listing URL from the config"
    )]
    index_url: Option<String>,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn command_from_cli(cli: Cli) -> Command {
    Command {
        architecture: cli.arch,
        kernel_version: cli.kernel_version,
        directory: cli.directory,
        config_path: cli.config,
        index_url: cli.index_url,
    }
}

pub fn parse_args() -> Args {
    let cli = Cli::parse();
    let log_level = log_level(cli.verbose);

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(log_level.into())
                .from_env_lossy()
                .add_directive("hyper_util=warn".parse().expect("static directive is valid")),
        )
        .init();

    Args {
        command: command_from_cli(cli),
        log_level,
    }
}
