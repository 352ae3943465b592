//! Miscellaneous commands

use super::CommandStatus;
use crate::error::Result;
use crate::viewer::Viewer;

/// Copy the quoted block at the top of the view
pub fn copy_quote(viewer: &mut Viewer) -> Result<CommandStatus> {
    let now = viewer.key_time();
    if viewer.copy_quote(now) {
        Ok(CommandStatus::Success)
    } else {
        Ok(CommandStatus::Failure)
    }
}

/// Show the most recent copy in the minibuffer
pub fn show_last_copy(viewer: &mut Viewer) -> Result<CommandStatus> {
    match viewer.clipboard.latest() {
        Some(text) => {
            let text = text.replace('\n', " ");
            viewer.display.set_message(text);
            Ok(CommandStatus::Success)
        }
        None => {
            viewer.display.set_message("Nothing copied yet");
            Ok(CommandStatus::Failure)
        }
    }
}

/// Redraw the display
pub fn redraw_display(viewer: &mut Viewer) -> Result<CommandStatus> {
    viewer.display.force_redraw();
    Ok(CommandStatus::Success)
}

/// Show the most useful bindings in the minibuffer
pub fn describe_bindings(viewer: &mut Viewer) -> Result<CommandStatus> {
    const SHOWN: [&str; 6] = [
        "open-search",
        "next-match",
        "copy-quote",
        "scroll-to-top",
        "next-section",
        "quit",
    ];

    let bindings = viewer.keytab.all_bindings();
    let mut parts = Vec::new();
    for name in SHOWN {
        let keys: Vec<String> = bindings
            .iter()
            .filter(|(_, n)| *n == name)
            .map(|(k, _)| k.display_name())
            .collect();
        if !keys.is_empty() {
            parts.push(format!("{} {}", keys.join("/"), name));
        }
    }
    viewer.display.set_message(parts.join("  "));
    Ok(CommandStatus::Success)
}

/// Quit the viewer
pub fn quit(viewer: &mut Viewer) -> Result<CommandStatus> {
    viewer.quit();
    Ok(CommandStatus::Success)
}

/// Abort current operation
pub fn abort(_viewer: &mut Viewer) -> Result<CommandStatus> {
    Ok(CommandStatus::Abort)
}
