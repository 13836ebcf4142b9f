//! Command dispatch: bridges CLI args -> `BookingFlow` -> output formatting.

pub mod book;
pub mod config_cmd;
pub mod slots;
pub mod util;

use slotbook_core::BookingFlow;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch an endpoint-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, flow: &BookingFlow, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Slots(args) => slots::handle(flow, args, global).await,
        Command::Book(args) => book::handle(flow, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
