//! Navigation commands - scrolling and section jumps

use super::CommandStatus;
use crate::error::Result;
use crate::viewer::Viewer;

/// Scroll down one line
pub fn scroll_line_down(viewer: &mut Viewer) -> Result<CommandStatus> {
    viewer.scroll_by(1);
    Ok(CommandStatus::Success)
}

/// Scroll up one line
pub fn scroll_line_up(viewer: &mut Viewer) -> Result<CommandStatus> {
    viewer.scroll_by(-1);
    Ok(CommandStatus::Success)
}

/// Scroll down one page
pub fn scroll_page_down(viewer: &mut Viewer) -> Result<CommandStatus> {
    let total = viewer.layout.len();
    viewer.viewport.page_down(total);
    Ok(CommandStatus::Success)
}

/// Scroll up one page
pub fn scroll_page_up(viewer: &mut Viewer) -> Result<CommandStatus> {
    let total = viewer.layout.len();
    viewer.viewport.page_up(total);
    Ok(CommandStatus::Success)
}

/// Back to the start of the lesson
pub fn scroll_to_top(viewer: &mut Viewer) -> Result<CommandStatus> {
    viewer.viewport.to_top();
    Ok(CommandStatus::Success)
}

/// Jump to the end of the lesson
pub fn scroll_to_bottom(viewer: &mut Viewer) -> Result<CommandStatus> {
    let total = viewer.layout.len();
    viewer.viewport.to_bottom(total);
    Ok(CommandStatus::Success)
}

/// Jump to the heading of the section after the active one
pub fn next_section(viewer: &mut Viewer) -> Result<CommandStatus> {
    let next = viewer.active_section().map_or(0, |idx| idx + 1);
    if next >= viewer.layout.section_starts.len() {
        viewer.display.set_message("Last section");
        return Ok(CommandStatus::Failure);
    }
    viewer.goto_section(next);
    Ok(CommandStatus::Success)
}

/// Jump to the heading of the active section, or the one before if
/// already there
pub fn previous_section(viewer: &mut Viewer) -> Result<CommandStatus> {
    let Some(active) = viewer.active_section() else {
        return Ok(CommandStatus::Failure);
    };
    let start = viewer.layout.section_starts[active];
    let target = if viewer.viewport.top() > start {
        active
    } else if active > 0 {
        active - 1
    } else {
        viewer.display.set_message("First section");
        return Ok(CommandStatus::Failure);
    };
    viewer.goto_section(target);
    Ok(CommandStatus::Success)
}
