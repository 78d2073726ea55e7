//! Koffan CLI entry point.

use clap::Parser;
use koffan::cli::commands::{self, Context};
use koffan::cli::{Cli, Commands};
use koffan::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    if cli.no_color || std::env::var_os("NO_COLOR").is_some() {
        colored::control::set_override(false);
    }

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    let ctx = Context {
        db: cli.db.as_deref(),
        token: cli.token.as_deref(),
        json,
        quiet: cli.quiet,
    };

    // Run the command and handle errors
    match run(&cli, &ctx) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info,hyper=info,reqwest=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, ctx: &Context<'_>) -> Result<(), Error> {
    match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, ctx),
        Commands::Version { check } => commands::version::execute(*check, ctx),

        Commands::List { command } => commands::list::execute(command, ctx),
        Commands::Section { command } => commands::section::execute(command, ctx),
        Commands::Item { command } => commands::item::execute(command, ctx),
        Commands::History { command } => commands::history::execute(command, ctx),
        Commands::Template { command } => commands::template::execute(command, ctx),

        Commands::Export(args) => commands::transfer::export(args, ctx),
        Commands::Import(args) => commands::transfer::import(args, ctx),
        Commands::Clear { confirm } => commands::clear::execute(confirm, ctx),

        // Shell completions
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
