//! Command dispatch: bridges CLI args -> command sessions -> output.

pub mod config_cmd;
pub mod notify;
pub mod watch;

use sfa_config::Config;
use sfa_core::{Command as Subscription, SocketEndpoint};

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch an engine-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    cfg: &Config,
    endpoint: SocketEndpoint,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Status(args) => {
            let session = config::session(cfg, args.interval)?;
            watch::handle(Subscription::Status, &args.watch, endpoint, session, global).await
        }
        Command::Groups(args) => {
            let session = config::session(cfg, None)?;
            watch::handle(Subscription::Group, &args, endpoint, session, global).await
        }
        Command::Log(args) => {
            let session = config::session(cfg, None)?;
            watch::handle(Subscription::Log, &args, endpoint, session, global).await
        }
        Command::ClashMode(args) => {
            let session = config::session(cfg, None)?;
            watch::handle(Subscription::ClashMode, &args, endpoint, session, global).await
        }
        Command::Notify(args) => {
            let session = config::session(cfg, None)?;
            notify::handle(&args, cfg, endpoint, session, global).await
        }
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "local command routed to the engine dispatcher".into(),
        )),
    }
}
