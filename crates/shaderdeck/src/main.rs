mod cli;
mod config;
mod defaults;
mod editor;
mod paths;
mod run;

use anyhow::Result;
use cli::{Command, DefaultsAction};
use paths::AppPaths;

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Some(Command::Defaults(defaults_cmd)) => handle_defaults_command(defaults_cmd.action),
        None => run::run(cli.run),
    }
}

fn handle_defaults_command(action: DefaultsAction) -> Result<()> {
    let paths = AppPaths::discover()?;

    match action {
        DefaultsAction::Where => {
            println!("Configuration directories:");
            println!("  config:  {}", paths.config_dir().display());
            println!("  data:    {}", paths.data_dir().display());
            println!("  config file:    {}", paths.config_file().display());
            println!("  default shader: {}", paths.default_shader_path().display());
            Ok(())
        }
    }
}
