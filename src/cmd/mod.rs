//! Subcommand dispatch and execution.
//!
//! The [`dispatch`] function routes the parsed CLI to the appropriate
//! subcommand handler: [`call`], [`validate`], or [`init`]. Each handler
//! lives in its own submodule.

pub mod call;
pub mod init;
pub mod validate;

use crate::cli::{Cli, Commands};
use crate::error::CourierError;

pub async fn dispatch(cli: Cli) -> Result<(), CourierError> {
    match cli.command {
        Some(Commands::Call(args)) => call::execute(*args).await,
        Some(Commands::Validate(ref args)) => validate::execute(args),
        Some(Commands::Init(ref args)) => init::execute(args),
        None => {
            print_welcome();
            Ok(())
        }
    }
}

fn print_welcome() {
    let version = env!("CARGO_PKG_VERSION");
    println!(
        "\n  courier v{version} \u{2014} HTTP client for logical remotes\n\n  \
         No command provided. To get started:\n\n    \
         courier init                        Generate a starter config\n    \
         courier validate                    Check ./courier.yaml\n    \
         courier call -r <remote> -p <path>  Call a remote once\n    \
         courier --help                      See all commands and options\n"
    );
}
