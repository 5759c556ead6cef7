use std::collections::HashSet;

use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

use crate::camera::Vec2;
use crate::tools::{EditorInput, EditorKey, Modifiers, PointerButton, PointerEvent};

/// Pixels reported per wheel notch by line-based scroll devices.
const WHEEL_LINE_DELTA_PX: f32 = 100.0;

/// Actions handled by the shell rather than the tool controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ShellCommand {
    AddLayer,
    DeleteSelectedLayer,
    SelectNextLayer,
    ToggleSelectedVisibility,
    PreviousTile,
    NextTile,
    Export,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum AppInput {
    Editor(EditorInput),
    Shell(ShellCommand),
}

/// Turns raw window events into editor inputs.
///
/// Keys are edge-triggered: a held key reports one press until it is
/// released, so OS auto-repeat never re-fires a command.
#[derive(Debug, Default)]
pub(crate) struct InputTranslator {
    cursor: Option<Vec2>,
    held_button: Option<PointerButton>,
    modifiers: Modifiers,
    keys_down: HashSet<KeyCode>,
}

impl InputTranslator {
    pub(crate) fn set_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = Modifiers {
            alt: state.alt_key(),
            shift: state.shift_key(),
            ctrl: state.control_key() || state.super_key(),
        };
    }

    pub(crate) fn cursor_moved(&mut self, x: f32, y: f32) -> Option<AppInput> {
        let position = Vec2 { x, y };
        self.cursor = Some(position);
        let button = self.held_button?;
        Some(AppInput::Editor(EditorInput::PointerDrag(
            self.pointer_event(position, button),
        )))
    }

    /// Leaving the window ends any drag in progress.
    pub(crate) fn cursor_left(&mut self) -> Option<AppInput> {
        let position = self.cursor.take()?;
        let button = self.held_button.take()?;
        Some(AppInput::Editor(EditorInput::PointerUp(
            self.pointer_event(position, button),
        )))
    }

    /// Releases everything held when the window loses focus, since the
    /// matching release events will never arrive.
    pub(crate) fn focus_lost(&mut self) -> Vec<AppInput> {
        let mut released = Vec::new();
        if let (Some(button), Some(position)) = (self.held_button.take(), self.cursor) {
            released.push(AppInput::Editor(EditorInput::PointerUp(
                self.pointer_event(position, button),
            )));
        }
        if self.keys_down.remove(&KeyCode::Space) {
            released.push(AppInput::Editor(EditorInput::KeyUp(EditorKey::Space)));
        }
        self.keys_down.clear();
        self.modifiers = Modifiers::default();
        released
    }

    pub(crate) fn mouse_input(
        &mut self,
        button: MouseButton,
        state: ElementState,
    ) -> Option<AppInput> {
        let button = pointer_button(button)?;
        let position = self.cursor?;
        match state {
            ElementState::Pressed => {
                if self.held_button.is_some() {
                    return None;
                }
                self.held_button = Some(button);
                Some(AppInput::Editor(EditorInput::PointerDown(
                    self.pointer_event(position, button),
                )))
            }
            ElementState::Released => {
                if self.held_button != Some(button) {
                    return None;
                }
                self.held_button = None;
                Some(AppInput::Editor(EditorInput::PointerUp(
                    self.pointer_event(position, button),
                )))
            }
        }
    }

    pub(crate) fn mouse_wheel(&mut self, delta: MouseScrollDelta) -> Option<AppInput> {
        let delta_y = wheel_delta_y(delta);
        if delta_y == 0.0 {
            return None;
        }
        Some(AppInput::Editor(EditorInput::Wheel {
            delta_y,
            modifiers: self.modifiers,
        }))
    }

    pub(crate) fn key_input(&mut self, key: PhysicalKey, state: ElementState) -> Option<AppInput> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match state {
            ElementState::Pressed => {
                if !self.keys_down.insert(code) {
                    return None;
                }
                self.key_pressed(code)
            }
            ElementState::Released => {
                self.keys_down.remove(&code);
                (code == KeyCode::Space)
                    .then_some(AppInput::Editor(EditorInput::KeyUp(EditorKey::Space)))
            }
        }
    }

    fn key_pressed(&self, code: KeyCode) -> Option<AppInput> {
        if self.modifiers.ctrl {
            return (code == KeyCode::KeyS).then_some(AppInput::Shell(ShellCommand::Export));
        }
        let input = match code {
            KeyCode::Space => AppInput::Editor(EditorInput::KeyDown(EditorKey::Space)),
            KeyCode::Escape => AppInput::Editor(EditorInput::KeyDown(EditorKey::Escape)),
            KeyCode::KeyN => AppInput::Shell(ShellCommand::AddLayer),
            KeyCode::Delete | KeyCode::Backspace => {
                AppInput::Shell(ShellCommand::DeleteSelectedLayer)
            }
            KeyCode::Tab => AppInput::Shell(ShellCommand::SelectNextLayer),
            KeyCode::KeyV => AppInput::Shell(ShellCommand::ToggleSelectedVisibility),
            KeyCode::BracketLeft => AppInput::Shell(ShellCommand::PreviousTile),
            KeyCode::BracketRight => AppInput::Shell(ShellCommand::NextTile),
            other => {
                let letter = tool_letter(other)?;
                AppInput::Editor(EditorInput::KeyDown(EditorKey::Char(letter)))
            }
        };
        Some(input)
    }

    fn pointer_event(&self, client: Vec2, button: PointerButton) -> PointerEvent {
        PointerEvent {
            client,
            button,
            modifiers: self.modifiers,
        }
    }
}

fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right => Some(PointerButton::Secondary),
        MouseButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

fn tool_letter(code: KeyCode) -> Option<char> {
    match code {
        KeyCode::KeyD => Some('d'),
        KeyCode::KeyB => Some('b'),
        KeyCode::KeyE => Some('e'),
        KeyCode::KeyG => Some('g'),
        KeyCode::KeyH => Some('h'),
        KeyCode::KeyZ => Some('z'),
        KeyCode::KeyM => Some('m'),
        _ => None,
    }
}

/// Positive values scroll down, which zooms out.
fn wheel_delta_y(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * WHEEL_LINE_DELTA_PX,
        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
    }
}
