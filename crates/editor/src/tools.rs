use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::{tile_position_on_click, Camera, PointerCoords, TileCoord, TileSize, Vec2};
use crate::layers::{LayerId, LayerRegistry};
use crate::tilemap::{TilemapStore, EMPTY_TILE};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    #[default]
    Default,
    Placement,
    Eraser,
    Fill,
    Pan,
    Magnify,
    /// Reserved for reordering layers by dragging; never touches cells.
    Move,
}

impl Tool {
    pub const ALL: [Tool; 7] = [
        Tool::Default,
        Tool::Placement,
        Tool::Eraser,
        Tool::Fill,
        Tool::Pan,
        Tool::Magnify,
        Tool::Move,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::Default => "default",
            Tool::Placement => "placement",
            Tool::Eraser => "eraser",
            Tool::Fill => "fill",
            Tool::Pan => "pan",
            Tool::Magnify => "magnify",
            Tool::Move => "move",
        }
    }

    pub fn shortcut(self) -> char {
        match self {
            Tool::Default => 'd',
            Tool::Placement => 'b',
            Tool::Eraser => 'e',
            Tool::Fill => 'g',
            Tool::Pan => 'h',
            Tool::Magnify => 'z',
            Tool::Move => 'm',
        }
    }

    pub fn from_shortcut(key: char) -> Option<Tool> {
        let key = key.to_ascii_lowercase();
        Tool::ALL.into_iter().find(|tool| tool.shortcut() == key)
    }
}

/// What releasing the pan override key returns to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanOverrideRestore {
    /// The tool that was active when the hold began.
    #[default]
    PreviousTool,
    /// Always `Tool::Default`, discarding the tool active before the hold.
    DefaultTool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PointerButton {
    #[default]
    Primary,
    Secondary,
    Middle,
}

/// `alt` is the secondary modifier: it flips Magnify to zoom out and gates
/// wheel zoom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub shift: bool,
    pub ctrl: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerEvent {
    pub client: Vec2,
    pub button: PointerButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn primary(x: f32, y: f32) -> Self {
        Self {
            client: Vec2 { x, y },
            ..Self::default()
        }
    }

    pub fn with_button(mut self, button: PointerButton) -> Self {
        self.button = button;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorKey {
    /// Held to pan.
    Space,
    Escape,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditorInput {
    PointerDown(PointerEvent),
    PointerDrag(PointerEvent),
    PointerUp(PointerEvent),
    Wheel { delta_y: f32, modifiers: Modifiers },
    KeyDown(EditorKey),
    KeyUp(EditorKey),
    SelectTool(Tool),
}

/// Everything one input event may read or write, borrowed for the duration
/// of a single dispatch.
pub struct EditContext<'a> {
    pub camera: &'a mut Camera,
    pub layers: &'a LayerRegistry,
    pub tilemap: &'a mut TilemapStore,
    pub selected_tile: Option<i32>,
    pub canvas_origin: Vec2,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolEffect {
    pub camera_changed: bool,
    pub tool_changed: Option<Tool>,
    pub tiles_changed: Option<LayerId>,
    pub cells_changed: usize,
}

impl ToolEffect {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    fn merge(&mut self, other: ToolEffect) {
        self.camera_changed |= other.camera_changed;
        self.tool_changed = other.tool_changed.or(self.tool_changed);
        self.tiles_changed = other.tiles_changed.or(self.tiles_changed);
        self.cells_changed += other.cells_changed;
    }

    fn camera() -> Self {
        Self {
            camera_changed: true,
            ..Self::default()
        }
    }

    fn cells(layer: LayerId, count: usize) -> Self {
        if count == 0 {
            return Self::default();
        }
        Self {
            tiles_changed: Some(layer),
            cells_changed: count,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TargetLayer {
    id: LayerId,
    tile_size: TileSize,
    visible: bool,
}

/// The active tool plus the one-slot register used while the pan key is held.
#[derive(Debug, Clone, Default)]
pub struct ToolController {
    active: Tool,
    override_held: bool,
    restore_to: Option<Tool>,
    restore_mode: PanOverrideRestore,
}

impl ToolController {
    pub fn new(restore_mode: PanOverrideRestore) -> Self {
        Self {
            restore_mode,
            ..Self::default()
        }
    }

    pub fn active(&self) -> Tool {
        self.active
    }

    pub fn is_override_held(&self) -> bool {
        self.override_held
    }

    /// Explicit selection. During a pan hold this also forgets the saved tool,
    /// so the explicit choice survives the key release.
    pub fn select(&mut self, tool: Tool) -> Option<Tool> {
        if self.override_held {
            self.restore_to = None;
        }
        self.set_active(tool)
    }

    pub fn begin_pan_override(&mut self) -> Option<Tool> {
        if self.override_held {
            return None;
        }
        self.override_held = true;
        self.restore_to = Some(self.active);
        self.set_active(Tool::Pan)
    }

    pub fn end_pan_override(&mut self) -> Option<Tool> {
        if !self.override_held {
            return None;
        }
        self.override_held = false;
        let saved = self.restore_to.take();
        match self.restore_mode {
            PanOverrideRestore::PreviousTool => saved.and_then(|tool| self.set_active(tool)),
            PanOverrideRestore::DefaultTool => saved.and_then(|_| self.set_active(Tool::Default)),
        }
    }

    pub fn handle(&mut self, input: EditorInput, ctx: &mut EditContext<'_>) -> ToolEffect {
        match input {
            EditorInput::PointerDown(event) => self.pointer_down(event, ctx),
            EditorInput::PointerDrag(event) => self.pointer_drag(event, ctx),
            EditorInput::PointerUp(_) => {
                ctx.camera.end_drag();
                ToolEffect::default()
            }
            EditorInput::Wheel { delta_y, modifiers } => {
                if modifiers.alt && ctx.camera.apply_zoom(delta_y) {
                    ToolEffect::camera()
                } else {
                    ToolEffect::default()
                }
            }
            EditorInput::KeyDown(EditorKey::Space) => {
                let changed = self.begin_pan_override();
                if changed.is_some() {
                    ctx.camera.end_drag();
                }
                tool_effect(changed)
            }
            EditorInput::KeyUp(EditorKey::Space) => {
                let changed = self.end_pan_override();
                if changed.is_some() {
                    ctx.camera.end_drag();
                }
                tool_effect(changed)
            }
            EditorInput::KeyDown(EditorKey::Escape) => tool_effect(self.select(Tool::Default)),
            EditorInput::KeyDown(EditorKey::Char(key)) => {
                let changed = Tool::from_shortcut(key).and_then(|tool| self.select(tool));
                tool_effect(changed)
            }
            EditorInput::KeyUp(_) => ToolEffect::default(),
            EditorInput::SelectTool(tool) => tool_effect(self.select(tool)),
        }
    }

    pub fn pointer_down(&mut self, event: PointerEvent, ctx: &mut EditContext<'_>) -> ToolEffect {
        let Some(target) = target_layer(ctx.layers) else {
            debug!(tool = self.active.name(), "tool_skipped_no_layer");
            return ToolEffect::default();
        };
        let mut effect = self.one_shot(event, target, ctx);
        effect.merge(self.continuous(event, target, ctx));
        effect
    }

    pub fn pointer_drag(&mut self, event: PointerEvent, ctx: &mut EditContext<'_>) -> ToolEffect {
        let Some(target) = target_layer(ctx.layers) else {
            return ToolEffect::default();
        };
        self.continuous(event, target, ctx)
    }

    fn one_shot(
        &self,
        event: PointerEvent,
        target: TargetLayer,
        ctx: &mut EditContext<'_>,
    ) -> ToolEffect {
        match self.active {
            Tool::Fill => {
                if !target.visible {
                    return ToolEffect::default();
                }
                let (Some(tile), Some(value)) = (
                    tile_under_pointer(event, target, ctx),
                    paintable_tile(ctx.selected_tile),
                ) else {
                    return ToolEffect::default();
                };
                let changed = ctx.tilemap.fill(tile.x, tile.y, value, target.id);
                ToolEffect::cells(target.id, changed)
            }
            Tool::Pan => {
                ctx.camera.set_origin(event.client.x, event.client.y);
                ToolEffect::default()
            }
            Tool::Magnify => {
                let changed = if event.modifiers.alt {
                    ctx.camera.decrement_zoom()
                } else {
                    ctx.camera.increment_zoom()
                };
                if changed {
                    ToolEffect::camera()
                } else {
                    ToolEffect::default()
                }
            }
            Tool::Default | Tool::Placement | Tool::Eraser | Tool::Move => ToolEffect::default(),
        }
    }

    fn continuous(
        &self,
        event: PointerEvent,
        target: TargetLayer,
        ctx: &mut EditContext<'_>,
    ) -> ToolEffect {
        match self.active {
            Tool::Placement => {
                if !target.visible {
                    return ToolEffect::default();
                }
                let Some(tile) = tile_under_pointer(event, target, ctx) else {
                    return ToolEffect::default();
                };
                let value = match event.button {
                    PointerButton::Secondary => EMPTY_TILE,
                    PointerButton::Primary => match paintable_tile(ctx.selected_tile) {
                        Some(value) => value,
                        None => return ToolEffect::default(),
                    },
                    PointerButton::Middle => return ToolEffect::default(),
                };
                let changed = ctx.tilemap.set(tile.x, tile.y, value, target.id);
                ToolEffect::cells(target.id, usize::from(changed))
            }
            Tool::Eraser => {
                if !target.visible {
                    return ToolEffect::default();
                }
                let Some(tile) = tile_under_pointer(event, target, ctx) else {
                    return ToolEffect::default();
                };
                let changed = ctx.tilemap.set(tile.x, tile.y, EMPTY_TILE, target.id);
                ToolEffect::cells(target.id, usize::from(changed))
            }
            Tool::Pan => {
                if event.client == Vec2::ZERO {
                    return ToolEffect::default();
                }
                if ctx.camera.move_to(event.client.x, event.client.y) {
                    ToolEffect::camera()
                } else {
                    ToolEffect::default()
                }
            }
            Tool::Default | Tool::Fill | Tool::Magnify | Tool::Move => ToolEffect::default(),
        }
    }

    fn set_active(&mut self, tool: Tool) -> Option<Tool> {
        if self.active == tool {
            return None;
        }
        debug!(from = self.active.name(), to = tool.name(), "tool_changed");
        self.active = tool;
        Some(tool)
    }
}

fn tool_effect(changed: Option<Tool>) -> ToolEffect {
    ToolEffect {
        tool_changed: changed,
        ..ToolEffect::default()
    }
}

fn target_layer(layers: &LayerRegistry) -> Option<TargetLayer> {
    layers.selected_layer().map(|layer| TargetLayer {
        id: layer.id,
        tile_size: layer.tile_size,
        visible: layer.visible,
    })
}

fn tile_under_pointer(
    event: PointerEvent,
    target: TargetLayer,
    ctx: &EditContext<'_>,
) -> Option<TileCoord> {
    tile_position_on_click(
        PointerCoords {
            client: event.client,
            canvas_origin: ctx.canvas_origin,
        },
        ctx.camera.scaled_tile_size(target.tile_size),
        ctx.camera.position,
    )
}

fn paintable_tile(selected: Option<i32>) -> Option<i32> {
    selected.filter(|value| *value != EMPTY_TILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TILE: TileSize = TileSize::new(16, 16);

    struct Fixture {
        camera: Camera,
        layers: LayerRegistry,
        tilemap: TilemapStore,
        selected_tile: Option<i32>,
    }

    impl Fixture {
        fn with_layer() -> Self {
            let mut layers = LayerRegistry::new();
            layers.add("ground", TILE);
            let mut tilemap = TilemapStore::new();
            tilemap.create_layer(LayerId(0), 8, 8, TileCoord::default());
            Self {
                camera: Camera::default(),
                layers,
                tilemap,
                selected_tile: Some(3),
            }
        }

        fn empty() -> Self {
            Self {
                camera: Camera::default(),
                layers: LayerRegistry::new(),
                tilemap: TilemapStore::new(),
                selected_tile: Some(3),
            }
        }

        fn run(&mut self, controller: &mut ToolController, input: EditorInput) -> ToolEffect {
            let mut ctx = EditContext {
                camera: &mut self.camera,
                layers: &self.layers,
                tilemap: &mut self.tilemap,
                selected_tile: self.selected_tile,
                canvas_origin: Vec2::ZERO,
            };
            controller.handle(input, &mut ctx)
        }

        fn cell(&self, x: i32, y: i32) -> i32 {
            self.tilemap.get(x, y, LayerId(0))
        }
    }

    fn controller_with(tool: Tool) -> ToolController {
        let mut controller = ToolController::default();
        controller.select(tool);
        controller
    }

    #[test]
    fn shortcuts_round_trip_every_tool() {
        for tool in Tool::ALL {
            assert_eq!(Tool::from_shortcut(tool.shortcut()), Some(tool));
        }
        assert_eq!(Tool::from_shortcut('B'), Some(Tool::Placement));
        assert_eq!(Tool::from_shortcut('q'), None);
    }

    #[test]
    fn placement_paints_selected_tile_under_pointer() {
        let mut fixture = Fixture::with_layer();
        let mut controller = controller_with(Tool::Placement);
        let effect = fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(40.0, 20.0)),
        );
        assert_eq!(fixture.cell(2, 1), 3);
        assert_eq!(effect.tiles_changed, Some(LayerId(0)));
        assert_eq!(effect.cells_changed, 1);
    }

    #[test]
    fn placement_drag_paints_each_cell_visited() {
        let mut fixture = Fixture::with_layer();
        let mut controller = controller_with(Tool::Placement);
        for x in [1.0, 17.0, 33.0] {
            fixture.run(
                &mut controller,
                EditorInput::PointerDrag(PointerEvent::primary(x, 1.0)),
            );
        }
        assert_eq!([fixture.cell(0, 0), fixture.cell(1, 0), fixture.cell(2, 0)], [3, 3, 3]);
    }

    #[test]
    fn placement_secondary_button_clears_cell() {
        let mut fixture = Fixture::with_layer();
        fixture.tilemap.set(1, 1, 9, LayerId(0));
        let mut controller = controller_with(Tool::Placement);
        fixture.run(
            &mut controller,
            EditorInput::PointerDrag(
                PointerEvent::primary(20.0, 20.0).with_button(PointerButton::Secondary),
            ),
        );
        assert_eq!(fixture.cell(1, 1), EMPTY_TILE);
    }

    #[test]
    fn placement_without_active_tile_is_a_no_op() {
        for selected in [None, Some(EMPTY_TILE)] {
            let mut fixture = Fixture::with_layer();
            fixture.selected_tile = selected;
            let mut controller = controller_with(Tool::Placement);
            let effect = fixture.run(
                &mut controller,
                EditorInput::PointerDown(PointerEvent::primary(5.0, 5.0)),
            );
            assert!(effect.is_empty());
            assert_eq!(fixture.cell(0, 0), EMPTY_TILE);
        }
    }

    #[test]
    fn eraser_always_clears() {
        let mut fixture = Fixture::with_layer();
        fixture.tilemap.set(0, 0, 5, LayerId(0));
        fixture.selected_tile = None;
        let mut controller = controller_with(Tool::Eraser);
        fixture.run(
            &mut controller,
            EditorInput::PointerDrag(PointerEvent::primary(3.0, 3.0)),
        );
        assert_eq!(fixture.cell(0, 0), EMPTY_TILE);
    }

    #[test]
    fn fill_floods_region_on_pointer_down_only() {
        let mut fixture = Fixture::with_layer();
        let mut controller = controller_with(Tool::Fill);
        let drag = fixture.run(
            &mut controller,
            EditorInput::PointerDrag(PointerEvent::primary(5.0, 5.0)),
        );
        assert!(drag.is_empty());

        let effect = fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(5.0, 5.0)),
        );
        assert_eq!(effect.cells_changed, 64);
        assert_eq!(fixture.cell(7, 7), 3);
    }

    #[test]
    fn editing_tools_skip_hidden_layers() {
        let mut fixture = Fixture::with_layer();
        fixture.layers.toggle_visibility("ground");
        for tool in [Tool::Placement, Tool::Fill, Tool::Eraser] {
            let mut controller = controller_with(tool);
            let effect = fixture.run(
                &mut controller,
                EditorInput::PointerDown(PointerEvent::primary(5.0, 5.0)),
            );
            assert!(effect.is_empty(), "tool={tool:?}");
        }
        assert_eq!(fixture.cell(0, 0), EMPTY_TILE);
    }

    #[test]
    fn no_selected_layer_means_no_effect() {
        let mut fixture = Fixture::empty();
        for tool in Tool::ALL {
            let mut controller = controller_with(tool);
            let down = fixture.run(
                &mut controller,
                EditorInput::PointerDown(PointerEvent::primary(50.0, 50.0)),
            );
            let drag = fixture.run(
                &mut controller,
                EditorInput::PointerDrag(PointerEvent::primary(60.0, 60.0)),
            );
            assert!(down.is_empty() && drag.is_empty(), "tool={tool:?}");
        }
        assert_eq!(fixture.camera.position, Vec2::ZERO);
        assert_eq!(fixture.camera.zoom_level(), 1.0);
    }

    #[test]
    fn pan_drag_moves_camera_and_ignores_zero_events() {
        let mut fixture = Fixture::with_layer();
        let mut controller = controller_with(Tool::Pan);
        fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(100.0, 100.0)),
        );
        let moved = fixture.run(
            &mut controller,
            EditorInput::PointerDrag(PointerEvent::primary(130.0, 90.0)),
        );
        assert!(moved.camera_changed);
        let spurious = fixture.run(
            &mut controller,
            EditorInput::PointerDrag(PointerEvent::primary(0.0, 0.0)),
        );
        assert!(spurious.is_empty());
        assert_eq!(fixture.camera.position, Vec2 { x: 30.0, y: -10.0 });
    }

    #[test]
    fn magnify_zooms_in_and_out_with_modifier() {
        let mut fixture = Fixture::with_layer();
        let mut controller = controller_with(Tool::Magnify);
        fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(10.0, 10.0)),
        );
        let zoomed_in = fixture.camera.zoom_level();
        assert!(zoomed_in > 1.0);

        let alt = Modifiers {
            alt: true,
            ..Modifiers::default()
        };
        fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(10.0, 10.0).with_modifiers(alt)),
        );
        fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(10.0, 10.0).with_modifiers(alt)),
        );
        assert!(fixture.camera.zoom_level() < zoomed_in);
        assert!(fixture.camera.zoom_level() < 1.0);
    }

    #[test]
    fn move_and_default_never_touch_cells() {
        let mut fixture = Fixture::with_layer();
        for tool in [Tool::Move, Tool::Default] {
            let mut controller = controller_with(tool);
            fixture.run(
                &mut controller,
                EditorInput::PointerDown(PointerEvent::primary(5.0, 5.0)),
            );
            fixture.run(
                &mut controller,
                EditorInput::PointerDrag(PointerEvent::primary(25.0, 5.0)),
            );
        }
        assert!(fixture
            .tilemap
            .grid(LayerId(0))
            .expect("grid")
            .tiles()
            .iter()
            .all(|value| *value == EMPTY_TILE));
    }

    #[test]
    fn wheel_zoom_requires_secondary_modifier() {
        let mut fixture = Fixture::empty();
        let mut controller = ToolController::default();
        let plain = fixture.run(
            &mut controller,
            EditorInput::Wheel {
                delta_y: 120.0,
                modifiers: Modifiers::default(),
            },
        );
        assert!(plain.is_empty());
        let with_alt = fixture.run(
            &mut controller,
            EditorInput::Wheel {
                delta_y: 120.0,
                modifiers: Modifiers {
                    alt: true,
                    ..Modifiers::default()
                },
            },
        );
        assert!(with_alt.camera_changed);
        assert!(fixture.camera.zoom_level() < 1.0);
    }

    #[test]
    fn pan_override_restores_previous_tool() {
        let mut fixture = Fixture::with_layer();
        let mut controller = controller_with(Tool::Eraser);
        fixture.run(&mut controller, EditorInput::KeyDown(EditorKey::Space));
        assert_eq!(controller.active(), Tool::Pan);
        fixture.run(&mut controller, EditorInput::KeyDown(EditorKey::Space));
        fixture.run(&mut controller, EditorInput::KeyUp(EditorKey::Space));
        assert_eq!(controller.active(), Tool::Eraser);
        assert!(!controller.is_override_held());
    }

    #[test]
    fn pan_override_can_revert_to_default() {
        let mut controller = ToolController::new(PanOverrideRestore::DefaultTool);
        controller.select(Tool::Fill);
        controller.begin_pan_override();
        assert_eq!(controller.end_pan_override(), Some(Tool::Default));
        assert_eq!(controller.active(), Tool::Default);
    }

    #[test]
    fn explicit_selection_during_hold_survives_release() {
        let mut controller = controller_with(Tool::Fill);
        controller.begin_pan_override();
        controller.select(Tool::Placement);
        assert_eq!(controller.end_pan_override(), None);
        assert_eq!(controller.active(), Tool::Placement);
    }

    #[test]
    fn explicit_selection_survives_release_in_default_mode() {
        let mut controller = ToolController::new(PanOverrideRestore::DefaultTool);
        controller.select(Tool::Fill);
        controller.begin_pan_override();
        controller.select(Tool::Eraser);
        assert_eq!(controller.end_pan_override(), None);
        assert_eq!(controller.active(), Tool::Eraser);
    }

    #[test]
    fn pan_key_released_before_button_leaves_no_stale_anchor() {
        let mut fixture = Fixture::with_layer();
        let mut controller = ToolController::default();
        fixture.run(&mut controller, EditorInput::KeyDown(EditorKey::Space));
        fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(100.0, 100.0)),
        );
        fixture.run(
            &mut controller,
            EditorInput::PointerDrag(PointerEvent::primary(110.0, 100.0)),
        );
        fixture.run(&mut controller, EditorInput::KeyUp(EditorKey::Space));
        fixture.run(
            &mut controller,
            EditorInput::PointerUp(PointerEvent::primary(110.0, 100.0)),
        );
        assert_eq!(fixture.camera.position, Vec2 { x: 10.0, y: 0.0 });
        assert_eq!(fixture.camera.drag_anchor(), None);

        fixture.run(&mut controller, EditorInput::KeyDown(EditorKey::Space));
        let first = fixture.run(
            &mut controller,
            EditorInput::PointerDrag(PointerEvent::primary(500.0, 500.0)),
        );
        assert!(!first.camera_changed);
        assert_eq!(fixture.camera.position, Vec2 { x: 10.0, y: 0.0 });
    }

    #[test]
    fn pan_key_pressed_mid_drag_starts_from_the_next_position() {
        let mut fixture = Fixture::with_layer();
        let mut controller = controller_with(Tool::Pan);
        fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(50.0, 50.0)),
        );
        controller.select(Tool::Placement);
        fixture.run(&mut controller, EditorInput::KeyDown(EditorKey::Space));
        assert_eq!(fixture.camera.drag_anchor(), None);
        fixture.run(
            &mut controller,
            EditorInput::PointerDrag(PointerEvent::primary(200.0, 200.0)),
        );
        fixture.run(
            &mut controller,
            EditorInput::PointerDrag(PointerEvent::primary(205.0, 200.0)),
        );
        assert_eq!(fixture.camera.position, Vec2 { x: 5.0, y: 0.0 });
    }

    #[test]
    fn release_without_hold_is_ignored() {
        let mut controller = controller_with(Tool::Fill);
        assert_eq!(controller.end_pan_override(), None);
        assert_eq!(controller.active(), Tool::Fill);
    }

    #[test]
    fn key_shortcuts_select_tools() {
        let mut fixture = Fixture::empty();
        let mut controller = ToolController::default();
        let effect = fixture.run(&mut controller, EditorInput::KeyDown(EditorKey::Char('g')));
        assert_eq!(effect.tool_changed, Some(Tool::Fill));
        fixture.run(&mut controller, EditorInput::KeyDown(EditorKey::Escape));
        assert_eq!(controller.active(), Tool::Default);
    }

    #[test]
    fn zoom_changes_tile_under_pointer() {
        let mut fixture = Fixture::with_layer();
        fixture.camera.set_zoom_clamped(2.0);
        let mut controller = controller_with(Tool::Placement);
        fixture.run(
            &mut controller,
            EditorInput::PointerDown(PointerEvent::primary(40.0, 40.0)),
        );
        assert_eq!(fixture.cell(1, 1), 3);
        assert_eq!(fixture.cell(2, 2), EMPTY_TILE);
    }
}
