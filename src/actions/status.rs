use crate::gdbus::windows::{WindowCalls, WindowManager};
use crate::gdbus::{Result, WindowDetails};

use super::ActionKind;

/// The parts of the host application an action may poke at.
///
/// Passed in by whoever runs the action; actions never reach for the host on
/// their own.
pub trait HostFacade {
    fn main_window_visible(&self) -> bool;
    fn reopen(&mut self);
    fn focus_action_configurator(&mut self, action: ActionKind);
}

/// Brings the host's configurator for `action` to the front, reopening the
/// main window first if it was hidden.
pub fn reveal_configurator(host: &mut dyn HostFacade, action: ActionKind) {
    if !host.main_window_visible() {
        host.reopen();
    }

    host.focus_action_configurator(action);
}

/// Details of every window matching the patterns.
///
/// Windows that vanish between the lookup and the details call are left out.
pub fn matching_window_details<C: WindowCalls>(
    windows: &WindowManager<C>,
    wm_class_pattern: &str,
    title_pattern: &str,
) -> Result<Vec<WindowDetails>> {
    let details = windows
        .find_windows(wm_class_pattern, title_pattern)?
        .into_iter()
        .filter_map(|id| windows.window_details(id).ok().flatten())
        .collect();

    Ok(details)
}
