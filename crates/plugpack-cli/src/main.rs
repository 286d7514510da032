use clap::{Parser, Subcommand};
use plugpack::commands::{
    agenda::{self, AgendaCommand},
    build::{self, BuildCommand},
    config::{self, ConfigAction},
    discover::{self, DiscoverCommand},
    filter::{self, FilterCommand},
    owner::{self, OwnerCommand},
};
use plugpack::GlobalOpts;
use plugpack_logger as logger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "plugpack")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Plugin build and packaging pipeline",
    long_about = "plugpack discovers plugins, builds their targets and packages them for redistribution."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a plugin and optionally package it
    Build(BuildCommand),
    /// Print the build agenda of a plugin without building
    Agenda(AgendaCommand),
    /// List plugins under the engine and project roots
    Discover(DiscoverCommand),
    /// Print the plugin that declares a module
    Owner(OwnerCommand),
    /// Print the files a package of a plugin would contain
    Filter(FilterCommand),
    /// Configure plugpack
    #[command(subcommand_required = false, arg_required_else_help = false)]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Library events go to the log file, and to stderr unless `--no-stdout` is set
fn init_tracing(no_stdout: bool) {
    let console = (!no_stdout).then(|| {
        tracing_subscriber::fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
    });
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| logger::verbosity_to_filter().into()),
        )
        .with(console)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(|| logger::LogFileWriter),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level(), cli.global.no_stdout)
    {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing(cli.global.no_stdout);

    let result = match cli.command {
        Commands::Build(cmd) => build::handle_build(cmd, &cli.global),
        Commands::Agenda(cmd) => agenda::handle_agenda(cmd, &cli.global),
        Commands::Discover(cmd) => discover::handle_discover(cmd, &cli.global),
        Commands::Owner(cmd) => owner::handle_owner(cmd, &cli.global),
        Commands::Filter(cmd) => filter::handle_filter(cmd, &cli.global),
        Commands::Config { action } => config::handle_config(action, &cli.global),
    };

    if let Err(e) = result {
        logger::spinner_stop();
        logger::error(&format!("{:#}", e));
        if cli.global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}
