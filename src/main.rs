use clap::Parser;
use miette::Result;

use hunter::cli::commands;
use hunter::cli::session::{load_config, log_filter};
use hunter::cli::{Cli, Commands};
use hunter::core::logging::init_logging;

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    let config = load_config(&global)?;
    init_logging(&log_filter(&global, &config))?;

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &global, &config),
        Commands::Company(cmd) => commands::company::run(cmd, &global, &config),
        Commands::User(cmd) => commands::user::run(cmd, &global, &config),
        Commands::Customer(cmd) => commands::customer::run(cmd, &global, &config),
        Commands::Vehicle(cmd) => commands::vehicle::run(cmd, &global, &config),
        Commands::Estimate(cmd) => commands::estimate::run(cmd, &global, &config),
        Commands::Wo(cmd) => commands::wo::run(cmd, &global, &config),
        Commands::Settings(cmd) => commands::settings::run(cmd, &global, &config),
        Commands::Report(args) => commands::report::run(args, &global, &config),
        Commands::Completions { shell } => commands::completions::run(shell),
    }
}
