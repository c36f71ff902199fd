//! Userbase command line client and development server.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod client;
mod commands;
mod output;

use cli::{Cli, Commands};
use output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Client commands only surface warnings.
    let directive = match cli.command {
        Commands::Serve(_) => "userbase=info",
        _ => "userbase=warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let format = OutputFormat::from_flag(cli.json);
    match &cli.command {
        Commands::List(args) => commands::users::list(&cli.client, args, format).await,
        Commands::Get(args) => commands::users::get(&cli.client, args, format).await,
        Commands::Add(args) => commands::users::add(&cli.client, args, format).await,
        Commands::Update(args) => commands::users::update(&cli.client, args, format).await,
        Commands::Delete(args) => commands::users::delete(&cli.client, args, format).await,
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Health => commands::health::run(&cli.client).await,
    }
}
