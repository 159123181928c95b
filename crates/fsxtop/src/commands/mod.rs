//! Command dispatch: bridges CLI args -> controllers -> output formatting.

pub mod config_cmd;
pub mod list;
pub mod show;

use fsxtop_core::ChangeStream;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Dispatch a backend-bound command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::List(args) => list::handle(args, global).await,
        Command::Show(args) => show::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(&args, global),
        Command::Completions(args) => {
            completions(args.shell);
            Ok(())
        }
    }
}

fn completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;

    let mut cmd = crate::cli::Cli::command();
    clap_complete::generate(shell, &mut cmd, "fsxtop", &mut std::io::stdout());
}

/// Re-render on every change notification until Ctrl-C, or until the
/// controller behind `changes` is gone.
async fn watch_loop(
    mut changes: ChangeStream,
    format: OutputFormat,
    mut render: impl FnMut() -> Result<String, CliError>,
) -> Result<(), CliError> {
    loop {
        let frame = render()?;
        if format == OutputFormat::Table {
            output::clear_screen();
        }
        output::print_output(&frame);

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = changes.changed() => {
                if !changed {
                    break;
                }
            }
        }
    }
    Ok(())
}
