pub mod daemon_path;
pub mod process;

use anyhow::Result;
use clap::{Parser, Subcommand};
use process::{daemon_executables, kill_previous_servers, restart_server, signal_daemons};
use sysinfo::Signal;
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{args::ServeOptions, start_daemon},
    utils::{
        config::load_config,
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Keycount", version, long_about = None)]
#[command(about = "Counts key presses in the background", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Starts a daemon for the application")]
    Init {
        #[command(flatten)]
        options: ServeOptions,
    },
    #[command(
        about = "Run a daemon directly in current console. Used for piping key names and for debugging"
    )]
    Serve {
        #[command(flatten)]
        options: ServeOptions,
    },
    #[command(about = "Stop currently running daemon. The final snapshot is written first")]
    Stop {},
    #[command(about = "Write the current snapshot and open it in the default program")]
    Open {},
    #[command(about = "Ask the running daemon to exit with code 418")]
    Exit {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let app_dir = create_application_default_path()?;
    enable_logging(CLI_PREFIX, &app_dir, logging_level, args.log)?;

    match args.commands {
        Commands::Init { options } => {
            restart_server(&options)?;
            Ok(())
        }
        Commands::Stop {} => {
            let stopped = kill_previous_servers(&daemon_executables()?)?;
            println!("Stopped {stopped} daemon(s)");
            Ok(())
        }
        Commands::Open {} => notify_daemons(Signal::User1),
        Commands::Exit {} => notify_daemons(Signal::User2),
        Commands::Serve { options } => {
            let app_dir = options.dir.clone().unwrap_or(app_dir);
            let mut config = load_config(&app_dir)?;
            options.apply(&mut config);

            let exit = start_daemon(config, options.input()).await?;
            // Reading stdin occupies a blocking thread the runtime would wait for on shutdown.
            std::process::exit(exit.code())
        }
    }
}

fn notify_daemons(signal: Signal) -> Result<()> {
    let reached = signal_daemons(&daemon_executables()?, signal)?;
    if reached == 0 {
        println!("No running daemon found");
    }
    Ok(())
}
