use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tray_icon::menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, MouseButton, MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent};

use crate::platform;

/// Commands forwarded from the tray event thread to the UI thread, where the
/// owned settings live. Visibility toggling is not a command: it flips the
/// shared flag directly so it works while the event loop is parked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    OpenSettings,
    ToggleMoveMode,
    ToggleImage,
    OpenColorPicker,
    Exit,
}

/// The tray icon and the menu items whose labels flip with app state. Lives
/// on the UI thread; only menu-item ids cross into the event thread.
pub struct Tray {
    _icon: TrayIcon,
    show_hide: MenuItem,
    move_mode: MenuItem,
    image: MenuItem,
}

impl Tray {
    pub fn set_visible_label(&self, visible: bool) {
        self.show_hide.set_text(if visible { "Hide" } else { "Show" });
    }

    pub fn set_move_mode_label(&self, move_mode: bool) {
        self.move_mode.set_text(if move_mode {
            "Lock position"
        } else {
            "Move crosshair"
        });
    }

    pub fn set_image_label(&self, has_image: bool) {
        self.image.set_text(if has_image { "Reset image" } else { "Set image…" });
    }
}

/// Draw a 16x16 red crosshair for the system tray.
fn create_tray_icon() -> Icon {
    let size = 16u32;
    let mut rgba = vec![0u8; (size * size * 4) as usize];
    for y in 0..size {
        for x in 0..size {
            if x == 7 || x == 8 || y == 7 || y == 8 {
                let i = ((y * size + x) * 4) as usize;
                rgba[i] = 216; // R
                rgba[i + 1] = 40; // G
                rgba[i + 2] = 40; // B
                rgba[i + 3] = 255; // A
            }
        }
    }
    Icon::from_rgba(rgba, size, size).expect("Failed to create tray icon")
}

/// Build the tray icon and spawn the event thread. Returns the tray handle
/// (keep it alive) and the command channel for the UI thread to drain.
pub fn build(
    visible: Arc<Mutex<bool>>,
    ctx: eframe::egui::Context,
    has_image: bool,
) -> (Tray, mpsc::Receiver<TrayCommand>) {
    let menu = Menu::new();
    let settings_item = MenuItem::new("Settings…", true, None);
    let move_item = MenuItem::new("Move crosshair", true, None);
    let image_item = MenuItem::new(if has_image { "Reset image" } else { "Set image…" }, true, None);
    let show_item = MenuItem::new("Hide", true, None);
    let quit_item = MenuItem::new("Exit", true, None);

    menu.append(&settings_item).unwrap();
    menu.append(&move_item).unwrap();
    menu.append(&image_item).unwrap();
    menu.append(&show_item).unwrap();
    menu.append(&PredefinedMenuItem::separator()).unwrap();
    menu.append(&quit_item).unwrap();

    let icon = TrayIconBuilder::new()
        .with_menu(Box::new(menu))
        .with_tooltip(platform::WINDOW_TITLE)
        .with_icon(create_tray_icon())
        .build()
        .expect("Failed to build tray icon");

    let settings_id = settings_item.id().clone();
    let move_id = move_item.id().clone();
    let image_id = image_item.id().clone();
    let show_id = show_item.id().clone();
    let quit_id = quit_item.id().clone();

    let (tx, rx) = mpsc::channel();

    // Menu and icon events arrive on global channels; poll both in one
    // thread and hand everything to the UI thread.
    thread::spawn(move || loop {
        if let Ok(event) = MenuEvent::receiver().try_recv() {
            if event.id() == &show_id {
                toggle_visible(&visible);
            } else if event.id() == &settings_id {
                deliver(&tx, &visible, TrayCommand::OpenSettings);
            } else if event.id() == &move_id {
                deliver(&tx, &visible, TrayCommand::ToggleMoveMode);
            } else if event.id() == &image_id {
                deliver(&tx, &visible, TrayCommand::ToggleImage);
            } else if event.id() == &quit_id {
                deliver(&tx, &visible, TrayCommand::Exit);
            }
            ctx.request_repaint();
        }

        if let Ok(event) = TrayIconEvent::receiver().try_recv() {
            match event {
                TrayIconEvent::DoubleClick {
                    button: MouseButton::Left,
                    ..
                } => {
                    toggle_visible(&visible);
                    ctx.request_repaint();
                }
                TrayIconEvent::Click {
                    button: MouseButton::Middle,
                    button_state: MouseButtonState::Down,
                    ..
                } => {
                    deliver(&tx, &visible, TrayCommand::OpenColorPicker);
                    ctx.request_repaint();
                }
                _ => {}
            }
        }

        thread::sleep(Duration::from_millis(50));
    });

    let tray = Tray {
        _icon: icon,
        show_hide: show_item,
        move_mode: move_item,
        image: image_item,
    };
    (tray, rx)
}

fn toggle_visible(visible: &Mutex<bool>) {
    let mut v = visible.lock().unwrap();
    *v = !*v;
    // Same Windows fix as in platform.rs: show/hide natively so the change
    // takes effect even while the egui event loop is asleep.
    if *v {
        platform::show_window_native();
    } else {
        platform::hide_window_native();
    }
}

fn deliver(tx: &mpsc::Sender<TrayCommand>, visible: &Mutex<bool>, command: TrayCommand) {
    // A hidden window never runs update() on Windows, so re-show it first;
    // the UI thread then processes the command on its next frame.
    {
        let mut v = visible.lock().unwrap();
        if !*v {
            *v = true;
            platform::show_window_native();
        }
    }
    let _ = tx.send(command);
}
