use std::path::Path;
use permigrate::cli::{Cli, Commands};
use permigrate::commands::{execute_init, execute_plan, report_plan};
use permigrate::config::MigrateConfig;
use permigrate::error::{format_error_chain, suggest_fix, Result};
use permigrate::logging::{self, format_duration, output};
use permigrate::output::CliOutputHandler;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    if let Err(err) = run(cli).await {
        output::error(format_error_chain(&err));
        if let Some(suggestion) = suggest_fix(&err) {
            output::hint(suggestion);
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Init => {
            let path = execute_init(Path::new("."))?;
            output::step(format!("Sample configuration written to {}", path.display()));
        }
        Commands::Plan {
            permissions,
            destination,
            permissions_schema,
            schema,
            skip_dangling,
            output_graph,
            json,
        } => {
            let config = MigrateConfig::merge_with_cli(
                MigrateConfig::load_from_file()?,
                permissions,
                destination,
                permissions_schema,
                schema,
                output_graph,
                skip_dangling,
            );

            let result = execute_plan(&config).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result.report)?);
            } else {
                report_plan(&result.report, &CliOutputHandler);
                output::step(format!("Planned in {}", format_duration(result.duration)));
            }
        }
    }

    Ok(())
}
