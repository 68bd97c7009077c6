use crate::window_types::{WindowDescriptor, WindowId};

pub const TRAY_MENU_OPEN_WINDOW_PREFIX: &str = "tray_open_window:";
pub const TRAY_MENU_QUIT: &str = "tray_quit";
pub const TRAY_MENU_QUIT_LABEL: &str = "Quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayMenuAction {
    OpenWindow(WindowId),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrayMenuEntry {
    Item { menu_id: String, label: String },
    Separator,
}

pub fn open_window_menu_id(id: &WindowId) -> String {
    format!("{TRAY_MENU_OPEN_WINDOW_PREFIX}{id}")
}

pub fn action_from_menu_id(menu_id: &str) -> Option<TrayMenuAction> {
    if menu_id == TRAY_MENU_QUIT {
        return Some(TrayMenuAction::Quit);
    }

    menu_id
        .strip_prefix(TRAY_MENU_OPEN_WINDOW_PREFIX)
        .filter(|id| !id.is_empty())
        .map(|id| TrayMenuAction::OpenWindow(WindowId::from(id)))
}

/// One entry per descriptor in the given order, then a separator and `Quit`.
pub fn tray_menu_entries<I>(descriptors: I) -> Vec<TrayMenuEntry>
where
    I: IntoIterator<Item = WindowDescriptor>,
{
    let mut entries: Vec<TrayMenuEntry> = descriptors
        .into_iter()
        .map(|descriptor| TrayMenuEntry::Item {
            menu_id: open_window_menu_id(&descriptor.id),
            label: descriptor.menu_label,
        })
        .collect();
    entries.push(TrayMenuEntry::Separator);
    entries.push(TrayMenuEntry::Item {
        menu_id: TRAY_MENU_QUIT.to_string(),
        label: TRAY_MENU_QUIT_LABEL.to_string(),
    });
    entries
}
