use std::path::PathBuf;
use std::sync::Arc;

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::config::EditorConfig;
use crate::export::{export_json, write_export, ExportError};
use crate::layers::LayerCommand;
use crate::session::EditorSession;

use super::input::{AppInput, InputTranslator, ShellCommand};
use super::rendering::{Renderer, TilesetSlot};

/// Tile indices cycled by `[`/`]` when no atlas bounds them.
const FALLBACK_TILE_COUNT: u32 = 8;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: EditorConfig) -> Result<(), AppError> {
    let mut app = EditorApp::new(&config);
    info!(
        export_path = %config.export_path.display(),
        layer_width = config.session.layer_width,
        layer_height = config.session.layer_height,
        "startup"
    );

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window.title.clone())
            .with_inner_size(LogicalSize::new(
                config.window.width as f64,
                config.window.height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer =
        Renderer::new(Arc::clone(&window), &mut app.session).map_err(AppError::CreateRenderer)?;
    let mut translator = InputTranslator::default();
    let mut last_applied_title: Option<String> = None;

    event_loop.set_control_flow(ControlFlow::Wait);

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => {
                let input = match event {
                    WindowEvent::CloseRequested => {
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                        None
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                        window.request_redraw();
                        None
                    }
                    WindowEvent::ModifiersChanged(modifiers) => {
                        translator.set_modifiers(modifiers.state());
                        None
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        translator.cursor_moved(position.x as f32, position.y as f32)
                    }
                    WindowEvent::CursorLeft { .. } => translator.cursor_left(),
                    WindowEvent::Focused(false) => {
                        let mut redraw = false;
                        for input in translator.focus_lost() {
                            redraw |= app.apply(input);
                        }
                        if redraw {
                            window.request_redraw();
                        }
                        None
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        translator.mouse_input(button, state)
                    }
                    WindowEvent::MouseWheel { delta, .. } => translator.mouse_wheel(delta),
                    WindowEvent::KeyboardInput { event, .. } => {
                        translator.key_input(event.physical_key, event.state)
                    }
                    WindowEvent::RedrawRequested => {
                        if let Err(error) = renderer.render(&app.session, app.tileset.atlas()) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }
                        let next_title = app.window_title(&config.window.title);
                        if last_applied_title.as_ref() != Some(&next_title) {
                            window.set_title(&next_title);
                            last_applied_title = Some(next_title);
                        }
                        None
                    }
                    _ => None,
                };

                if let Some(input) = input {
                    if app.apply(input) {
                        window.request_redraw();
                    }
                }
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Session plus the shell-level state the window drives.
struct EditorApp {
    session: EditorSession,
    tileset: TilesetSlot,
    export_path: PathBuf,
}

impl EditorApp {
    fn new(config: &EditorConfig) -> Self {
        let mut session = EditorSession::new(config.session.clone());
        session.add_layer("");
        session.set_selected_tile(Some(0));
        Self {
            session,
            tileset: TilesetSlot::load(config.tileset.as_ref()),
            export_path: config.export_path.clone(),
        }
    }

    /// Returns whether the frame needs to be redrawn.
    fn apply(&mut self, input: AppInput) -> bool {
        match input {
            AppInput::Editor(input) => !self.session.handle_input(input).is_empty(),
            AppInput::Shell(command) => self.run_shell_command(command),
        }
    }

    fn run_shell_command(&mut self, command: ShellCommand) -> bool {
        let selected = self.session.layers().selected().map(ToString::to_string);
        match command {
            ShellCommand::AddLayer => !self.session.add_layer("").is_empty(),
            ShellCommand::DeleteSelectedLayer => selected.is_some_and(|name| {
                !self
                    .session
                    .apply_layer_command(LayerCommand::Delete { name })
                    .is_empty()
            }),
            ShellCommand::SelectNextLayer => {
                let Some(name) = next_layer_name(self.session.layers().names(), selected.as_deref())
                else {
                    return false;
                };
                !self
                    .session
                    .apply_layer_command(LayerCommand::Select { name })
                    .is_empty()
            }
            ShellCommand::ToggleSelectedVisibility => selected.is_some_and(|name| {
                !self
                    .session
                    .apply_layer_command(LayerCommand::ToggleVisibility { name })
                    .is_empty()
            }),
            ShellCommand::PreviousTile => self.step_selected_tile(-1),
            ShellCommand::NextTile => self.step_selected_tile(1),
            ShellCommand::Export => {
                if let Err(error) = self.export() {
                    warn!(error = %error, "export_failed");
                }
                false
            }
        }
    }

    fn step_selected_tile(&mut self, step: i32) -> bool {
        let count = self
            .tileset
            .atlas()
            .map(|atlas| atlas.tile_count())
            .unwrap_or(FALLBACK_TILE_COUNT);
        let next = cycle_tile(self.session.selected_tile(), step, count);
        debug!(tile = next, "active_tile_changed");
        self.session.set_selected_tile(Some(next));
        true
    }

    fn export(&self) -> Result<(), ExportError> {
        let text = export_json(&self.session, &self.tileset)?;
        write_export(&self.export_path, &text)
    }

    fn window_title(&self, base: &str) -> String {
        let layer = self.session.layers().selected().unwrap_or("no layer");
        let tile = self
            .session
            .selected_tile()
            .map(|tile| tile.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{base} | {} | {layer} | tile {tile}",
            self.session.active_tool().name()
        )
    }
}

fn next_layer_name(names: &[String], selected: Option<&str>) -> Option<String> {
    if names.is_empty() {
        return None;
    }
    let next = selected
        .and_then(|name| names.iter().position(|candidate| candidate == name))
        .map(|index| (index + 1) % names.len())
        .unwrap_or(0);
    names.get(next).cloned()
}

/// Wraps within `0..count`; a missing or empty selection starts at tile 0.
fn cycle_tile(current: Option<i32>, step: i32, count: u32) -> i32 {
    let count = i64::from(count.max(1));
    let current = current.filter(|tile| *tile >= 0).map(i64::from);
    let next = match current {
        Some(tile) => (tile + i64::from(step)).rem_euclid(count),
        None => 0,
    };
    next as i32
}
