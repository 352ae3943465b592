//! Search commands

use super::CommandStatus;
use crate::error::Result;
use crate::viewer::{Direction, Viewer};

/// Show the search bar and focus it
pub fn open_search(viewer: &mut Viewer) -> Result<CommandStatus> {
    viewer.open_search();
    Ok(CommandStatus::Success)
}

/// Bring the next line with a match into view
pub fn next_match(viewer: &mut Viewer) -> Result<CommandStatus> {
    Ok(status(viewer.goto_match(Direction::Forward)))
}

/// Bring the previous line with a match into view
pub fn previous_match(viewer: &mut Viewer) -> Result<CommandStatus> {
    Ok(status(viewer.goto_match(Direction::Backward)))
}

fn status(found: bool) -> CommandStatus {
    if found {
        CommandStatus::Success
    } else {
        CommandStatus::Failure
    }
}
