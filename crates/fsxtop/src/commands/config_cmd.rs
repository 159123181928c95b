//! Config subcommand handlers.

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config::{self, Loaded};
use crate::error::CliError;
use crate::output;

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_file(global).display().to_string());
            Ok(())
        }
        ConfigCommand::Show => {
            let loaded = Loaded::load(global, &config::global_overrides(global))?;
            let rendered = match global.output {
                OutputFormat::Json => output::render_json(&loaded.config)?,
                OutputFormat::Table | OutputFormat::Plain => loaded
                    .config
                    .to_toml()
                    .map_err(|e| CliError::from_config(e, &loaded.path))?,
            };
            output::print_output(rendered.trim_end());
            Ok(())
        }
    }
}
