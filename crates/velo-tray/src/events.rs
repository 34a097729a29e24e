use velo_common::{ClickButton, MenuItemId};

/// Input coming from the native tray, after translation out of
/// platform-specific ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEvent {
    /// A menu node was activated by the user.
    MenuItemActivated(MenuItemId),
    /// The status icon itself was clicked and released.
    IconClicked(ClickButton),
}
