//! Command dispatch
//!
//! Loads settings, applies command-line overrides, and runs the service.

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::Source;
use crate::cli::args::{Cli, Commands, ConfigCommands, DuplicatePolicyArg};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::Settings;
use crate::infrastructure::ServiceContainer;

/// Execute the parsed command line.
#[instrument(level = "debug", skip(cli))]
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Apply {
            input,
            output,
            pretty,
            compact,
            strict,
            duplicate_sections,
        } => {
            let mut settings = load_settings(cli)?;
            apply_overrides(&mut settings, *pretty, *compact, *strict, *duplicate_sections);
            cmd_apply(&ServiceContainer::new(settings), input.as_deref(), output.as_deref())
        }
        Commands::Check { input } => {
            let container = ServiceContainer::new(load_settings(cli)?);
            cmd_check(&container, input.as_deref())
        }
        Commands::Tree { input, after } => {
            let container = ServiceContainer::new(load_settings(cli)?);
            cmd_tree(&container, input.as_deref(), *after)
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let settings = load_settings(cli)?;
                output::info(&settings.to_toml()?);
                Ok(())
            }
            ConfigCommands::Template => {
                output::info(&Settings::template());
                Ok(())
            }
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let project_dir = match &cli.project_dir {
        Some(dir) => Some(dir.clone()),
        None => std::env::current_dir().ok(),
    };
    let settings = Settings::load(project_dir.as_deref())?;
    debug!(?settings, "loaded settings");
    Ok(settings)
}

fn apply_overrides(
    settings: &mut Settings,
    pretty: bool,
    compact: bool,
    strict: bool,
    duplicate_sections: Option<DuplicatePolicyArg>,
) {
    if pretty {
        settings.output.pretty = true;
    }
    if compact {
        settings.output.pretty = false;
    }
    if strict {
        settings.strict = true;
    }
    if let Some(policy) = duplicate_sections {
        settings.duplicate_sections = policy.into();
    }
}

fn cmd_apply(container: &ServiceContainer, input: Option<&Path>, out: Option<&Path>) -> CliResult<()> {
    let source = Source::from_arg(input);
    let result = container.restructure().apply(&source, out)?;
    for diagnostic in &result.report {
        output::warning(diagnostic);
    }
    match out {
        Some(path) => output::success(&format!("wrote {}", path.display())),
        None => output::info(&result.json),
    }
    Ok(())
}

fn cmd_check(container: &ServiceContainer, input: Option<&Path>) -> CliResult<()> {
    let source = Source::from_arg(input);
    let report = container.restructure().check(&source)?;
    if report.is_clean() {
        output::success(&format!("{}: no diagnostics", describe(&source)));
        return Ok(());
    }
    for diagnostic in &report {
        output::warning(diagnostic);
    }
    Err(CliError::Diagnostics {
        count: report.len(),
    })
}

fn cmd_tree(container: &ServiceContainer, input: Option<&Path>, after: bool) -> CliResult<()> {
    let source = Source::from_arg(input);
    let tree = container.restructure().outline(&source, after)?;
    output::info(&tree);
    Ok(())
}

fn describe(source: &Source) -> String {
    match source {
        Source::Stdin => "<stdin>".to_string(),
        Source::File(path) => path.display().to_string(),
    }
}
