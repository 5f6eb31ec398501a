use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context as _;
use eframe::egui;
use tracing::{error, warn};

use crate::color;
use crate::config::{self, Settings};
use crate::marker::MarkerStyle;
use crate::platform::{self, ClickThroughSupport};
use crate::storage;
use crate::tray::{self, Tray, TrayCommand};

/// Interaction state of the overlay window.
///
/// Locked is the normal state: pointer input passes through to whatever is
/// beneath. Move Mode catches clicks so the marker can be dragged; it is
/// entered only via the explicit tray/panel action and left via the toggle,
/// Enter, or Escape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Locked,
    MoveMode,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Locked => Mode::MoveMode,
            Mode::MoveMode => Mode::Locked,
        }
    }

    /// Whether the window should be click-through in this state.
    pub fn click_through(self) -> bool {
        matches!(self, Mode::Locked)
    }
}

struct MarkerTexture {
    path: PathBuf,
    handle: egui::TextureHandle,
}

pub struct CrosshairApp {
    /// The one owned configuration record. The tray and the settings panel
    /// mutate it only through this struct, on the UI thread.
    settings: Settings,
    mode: Mode,
    click_through: ClickThroughSupport,
    visible: Arc<Mutex<bool>>,
    was_visible: bool,
    /// Set only by the explicit Exit action; every other close request is
    /// cancelled.
    allow_close: bool,
    settings_open: bool,
    /// Move keyboard focus to the fill-color button on the next panel frame
    /// (tray middle-click opens the panel at the picker).
    focus_fill_color: bool,
    initialized: bool,
    tray: Option<Tray>,
    commands: Option<mpsc::Receiver<TrayCommand>>,
    texture: Option<MarkerTexture>,
    /// Image path that failed to decode; not retried until it changes.
    failed_image: Option<PathBuf>,
}

impl CrosshairApp {
    pub fn new(settings: Settings, visible: Arc<Mutex<bool>>) -> Self {
        Self {
            settings,
            mode: Mode::Locked,
            click_through: platform::click_through_support(),
            visible,
            was_visible: false,
            allow_close: false,
            settings_open: false,
            focus_fill_color: false,
            initialized: false,
            tray: None,
            commands: None,
            texture: None,
            failed_image: None,
        }
    }

    fn init(&mut self, ctx: &egui::Context) {
        let (tray, rx) = tray::build(
            Arc::clone(&self.visible),
            ctx.clone(),
            self.settings.image.is_some(),
        );
        self.tray = Some(tray);
        self.commands = Some(rx);

        self.apply_click_through();
        if self.click_through == ClickThroughSupport::Degraded {
            warn!("no click-through primitive on this platform, overlay stays clickable");
            rfd::MessageDialog::new()
                .set_level(rfd::MessageLevel::Warning)
                .set_title("Platform Warning")
                .set_description(
                    "Click-through is not supported on this platform. \
                     The overlay will remain clickable.",
                )
                .show();
        }
    }

    fn drain_tray_commands(&mut self, ctx: &egui::Context) {
        let commands: Vec<TrayCommand> = match &self.commands {
            Some(rx) => rx.try_iter().collect(),
            None => return,
        };
        for command in commands {
            match command {
                TrayCommand::OpenSettings => self.settings_open = true,
                // The fill-color picker lives in the settings panel; open it
                // with the picker button focused.
                TrayCommand::OpenColorPicker => {
                    self.settings_open = true;
                    self.focus_fill_color = true;
                }
                TrayCommand::ToggleMoveMode => self.set_mode(self.mode.toggled(), ctx),
                TrayCommand::ToggleImage => self.toggle_image(),
                TrayCommand::Exit => self.request_exit(ctx),
            }
        }
    }

    fn set_mode(&mut self, mode: Mode, ctx: &egui::Context) {
        if self.mode == mode {
            return;
        }
        self.mode = mode;
        self.apply_click_through();
        if mode == Mode::MoveMode {
            // The window needs keyboard focus for Enter/Escape to leave
            // move mode again.
            ctx.send_viewport_cmd_to(egui::ViewportId::ROOT, egui::ViewportCommand::Focus);
        }
        if let Some(tray) = &self.tray {
            tray.set_move_mode_label(mode == Mode::MoveMode);
        }
    }

    fn apply_click_through(&self) {
        if self.click_through == ClickThroughSupport::Supported {
            platform::set_click_through(self.mode.click_through());
        }
    }

    /// Set or reset the custom marker image. A cancelled file dialog is a
    /// no-op.
    fn toggle_image(&mut self) {
        if self.settings.image.is_some() {
            self.settings.image = None;
            self.texture = None;
            self.failed_image = None;
        } else if let Some(path) = pick_image_file() {
            self.settings.image = Some(path);
        } else {
            return;
        }
        if let Some(tray) = &self.tray {
            tray.set_image_label(self.settings.image.is_some());
        }
    }

    /// Approve closing, save settings synchronously, then close.
    fn request_exit(&mut self, ctx: &egui::Context) {
        self.track_position(ctx);
        if let Err(e) = storage::save(&self.settings) {
            error!("failed to save settings: {e:#}");
        }
        self.allow_close = true;
        ctx.send_viewport_cmd_to(egui::ViewportId::ROOT, egui::ViewportCommand::Close);
    }

    /// Remember the live window position so it survives restarts.
    fn track_position(&mut self, ctx: &egui::Context) {
        if let Some(rect) = ctx.input(|i| i.viewport().outer_rect) {
            self.settings
                .set_position(rect.min.x.round() as i32, rect.min.y.round() as i32);
        }
    }

    /// On show: restore the saved position, or center when there is none.
    fn apply_position(&self, ctx: &egui::Context) {
        match self.settings.position() {
            Some((x, y)) => ctx.send_viewport_cmd_to(
                egui::ViewportId::ROOT,
                egui::ViewportCommand::OuterPosition(egui::pos2(x as f32, y as f32)),
            ),
            None => self.center(ctx),
        }
    }

    /// Center the overlay on the primary display.
    fn center(&self, ctx: &egui::Context) {
        let monitor = ctx
            .input(|i| i.viewport().monitor_size)
            .unwrap_or(egui::vec2(1920.0, 1080.0));
        let pos = ((monitor - egui::Vec2::splat(config::WINDOW_SIZE)) * 0.5).to_pos2();
        ctx.send_viewport_cmd_to(
            egui::ViewportId::ROOT,
            egui::ViewportCommand::OuterPosition(pos),
        );
    }

    /// Texture for the configured marker image, (re)loaded when the path
    /// changes. On decode failure the path is kept but rendering falls back
    /// to border-only.
    fn marker_texture(&mut self, ctx: &egui::Context) -> Option<&egui::TextureHandle> {
        let path = self.settings.image.clone()?;
        if self.failed_image.as_deref() == Some(path.as_path()) {
            return None;
        }
        let cached = self.texture.as_ref().is_some_and(|t| t.path == path);
        if !cached {
            match load_color_image(&path) {
                Ok(image) => {
                    let handle = ctx.load_texture("marker", image, egui::TextureOptions::LINEAR);
                    self.texture = Some(MarkerTexture {
                        path: path.clone(),
                        handle,
                    });
                    self.failed_image = None;
                }
                Err(e) => {
                    error!("failed to load marker image: {e:#}");
                    self.texture = None;
                    self.failed_image = Some(path);
                    return None;
                }
            }
        }
        self.texture.as_ref().map(|t| &t.handle)
    }

    fn show_settings_panel(&mut self, ctx: &egui::Context) {
        let mut open = self.settings_open;
        ctx.show_viewport_immediate(
            egui::ViewportId::from_hash_of("crosshair_settings"),
            egui::ViewportBuilder::default()
                .with_title("Crosshair Settings")
                .with_inner_size([300.0, 240.0])
                .with_resizable(false)
                .with_always_on_top(),
            |ctx, _class| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    self.settings_panel_ui(ui);
                });
                if ctx.input(|i| i.viewport().close_requested()) {
                    open = false;
                }
            },
        );
        self.settings_open = open;
    }

    fn settings_panel_ui(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.horizontal(|ui| {
                ui.label("Size:");
                ui.add(
                    egui::Slider::new(&mut self.settings.size, config::MIN_SIZE..=config::MAX_SIZE)
                        .suffix(" px"),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Opacity:");
                // The control runs 0-255 like the original slider; stored as
                // 0.0-1.0.
                let mut opacity = (self.settings.opacity * 255.0).round() as u32;
                if ui.add(egui::Slider::new(&mut opacity, 0..=255)).changed() {
                    self.settings.opacity = opacity as f32 / 255.0;
                }
            });
            ui.horizontal(|ui| {
                ui.label("Border:");
                ui.add(
                    egui::Slider::new(
                        &mut self.settings.border_thickness,
                        0..=config::MAX_BORDER_THICKNESS,
                    )
                    .suffix(" px"),
                );
            });
            ui.horizontal(|ui| {
                ui.label("Fill color:");
                let fill = color_field(ui, &mut self.settings.color, egui::Color32::RED);
                if self.focus_fill_color {
                    fill.request_focus();
                    self.focus_fill_color = false;
                }
                ui.label("Border color:");
                color_field(ui, &mut self.settings.border_color, egui::Color32::BLACK);
            });
        });

        ui.add_space(4.0);

        ui.horizontal(|ui| {
            ui.label("Image:");
            match self
                .settings
                .image
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
            {
                Some(name) => {
                    ui.monospace(name);
                    if ui.button("Reset").clicked() {
                        self.toggle_image();
                    }
                }
                None => {
                    if ui.button("Set image…").clicked() {
                        self.toggle_image();
                    }
                }
            }
        });

        ui.separator();

        ui.horizontal(|ui| {
            let move_label = if self.mode == Mode::MoveMode {
                "Lock position"
            } else {
                "Move crosshair"
            };
            if ui.button(move_label).clicked() {
                let ctx = ui.ctx().clone();
                self.set_mode(self.mode.toggled(), &ctx);
            }
            if ui.button("Center on screen").clicked() {
                let ctx = ui.ctx().clone();
                self.center(&ctx);
            }
        });

        if self.mode == Mode::MoveMode {
            ui.weak("Drag the marker to move it. Double-click to center, Enter/Escape to lock.");
        }
    }
}

impl eframe::App for CrosshairApp {
    /// Keep the window background fully transparent; only the marker is
    /// painted.
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Build the tray and probe the platform on the first frame (now we
        // have the real Context and a live native window).
        if !self.initialized {
            self.initialized = true;
            self.init(ctx);
        }

        // Poll periodically so tray/visibility changes are picked up.
        ctx.request_repaint_after(Duration::from_millis(100));

        self.drain_tray_commands(ctx);

        // Sync the shared visibility flag (toggled from the tray thread)
        // with the native window.
        let is_visible = *self.visible.lock().unwrap();
        if is_visible && !self.was_visible {
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
            ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
            self.apply_position(ctx);
            if let Some(tray) = &self.tray {
                tray.set_visible_label(true);
            }
        } else if !is_visible && self.was_visible {
            ctx.send_viewport_cmd(egui::ViewportCommand::Visible(false));
            if let Some(tray) = &self.tray {
                tray.set_visible_label(false);
            }
        }
        self.was_visible = is_visible;

        // Only the explicit Exit action may close the window; OS close
        // signals are suppressed.
        if should_cancel_close(
            ctx.input(|i| i.viewport().close_requested()),
            self.allow_close,
        ) {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
        }

        if !is_visible {
            // Window is hidden — don't render but keep the loop alive.
            return;
        }

        if self.mode == Mode::MoveMode
            && ctx.input(|i| i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Escape))
        {
            self.set_mode(Mode::Locked, ctx);
        }

        self.track_position(ctx);

        let style = MarkerStyle::from_settings(&self.settings);
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let rect = egui::Rect::from_center_size(
                    ui.max_rect().center(),
                    egui::Vec2::splat(style.size),
                );
                let sense = if self.mode == Mode::MoveMode {
                    egui::Sense::click_and_drag()
                } else {
                    egui::Sense::hover()
                };
                let response = ui.allocate_rect(rect, sense);

                let texture = self.marker_texture(ui.ctx());
                style.paint(ui.painter(), rect, texture);

                if self.mode == Mode::MoveMode {
                    if response.double_clicked() {
                        self.center(ui.ctx());
                    } else if response.drag_started() {
                        // The OS drag loop does the cursor-minus-offset
                        // tracking for us.
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::StartDrag);
                    }
                }
            });

        if self.settings_open {
            self.show_settings_panel(ctx);
        }
    }
}

/// A close request is honored only once the Exit action has approved it;
/// anything else (OS close signal, Alt+F4) gets cancelled.
fn should_cancel_close(close_requested: bool, allow_close: bool) -> bool {
    close_requested && !allow_close
}

fn color_field(ui: &mut egui::Ui, value: &mut String, fallback: egui::Color32) -> egui::Response {
    let mut color = color::parse(value).unwrap_or(fallback);
    let response = ui.color_edit_button_srgba(&mut color);
    if response.changed() {
        *value = color::format(color);
    }
    response
}

fn pick_image_file() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Choose Crosshair Image")
        .add_filter(
            "Images",
            &["png", "jpg", "jpeg", "svg", "bmp", "gif", "webp"],
        )
        .pick_file()
}

fn load_color_image(path: &Path) -> anyhow::Result<egui::ColorImage> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgba8();
    let size = [image.width() as usize, image.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, image.as_raw()))
}
