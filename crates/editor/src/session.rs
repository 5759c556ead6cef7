use std::sync::mpsc::{self, Receiver, Sender};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::camera::{Camera, CameraConfig, TileCoord, TileSize, Vec2};
use crate::layers::{Layer, LayerChange, LayerCommand, LayerId, LayerRegistry};
use crate::tilemap::TilemapStore;
use crate::tools::{EditContext, EditorInput, PanOverrideRestore, Tool, ToolController, ToolEffect};

pub const DEFAULT_LAYER_WIDTH: u32 = 64;
pub const DEFAULT_LAYER_HEIGHT: u32 = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Grid width, in tiles, of every newly added layer.
    pub layer_width: u32,
    pub layer_height: u32,
    pub default_tile_size: TileSize,
    pub camera: CameraConfig,
    pub pan_override_restore: PanOverrideRestore,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            layer_width: DEFAULT_LAYER_WIDTH,
            layer_height: DEFAULT_LAYER_HEIGHT,
            default_tile_size: TileSize::default(),
            camera: CameraConfig::default(),
            pan_override_restore: PanOverrideRestore::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEvent {
    CameraChanged,
    /// The selection moved, or the selected layer's size or visibility changed.
    SelectedLayerChanged,
    LayersChanged,
    TilesChanged { layer: LayerId },
    ToolChanged(Tool),
}

/// Fan-out of editor events to channel-backed subscriptions.
#[derive(Debug, Default)]
pub struct ChangeNotifier {
    subscribers: Vec<Sender<EditorEvent>>,
}

impl ChangeNotifier {
    pub fn subscribe(&mut self) -> Subscription {
        let (sender, receiver) = mpsc::channel();
        self.subscribers.push(sender);
        Subscription { receiver }
    }

    /// Subscriptions that were dropped are pruned here.
    pub fn publish(&mut self, event: EditorEvent) {
        self.subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Receiving end of a [`ChangeNotifier`] subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    receiver: Receiver<EditorEvent>,
}

impl Subscription {
    pub fn drain(&self) -> Vec<EditorEvent> {
        self.receiver.try_iter().collect()
    }
}

/// One open editing session: the camera, layers, tile grids and active tool.
#[derive(Debug)]
pub struct EditorSession {
    config: SessionConfig,
    camera: Camera,
    layers: LayerRegistry,
    tilemap: TilemapStore,
    tools: ToolController,
    selected_tile: Option<i32>,
    canvas_origin: Vec2,
    notifier: ChangeNotifier,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl EditorSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            camera: Camera::new(config.camera),
            layers: LayerRegistry::new(),
            tilemap: TilemapStore::new(),
            tools: ToolController::new(config.pan_override_restore),
            selected_tile: None,
            canvas_origin: Vec2::ZERO,
            notifier: ChangeNotifier::default(),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn layers(&self) -> &LayerRegistry {
        &self.layers
    }

    pub fn tilemap(&self) -> &TilemapStore {
        &self.tilemap
    }

    pub fn active_tool(&self) -> Tool {
        self.tools.active()
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.layers.selected_layer()
    }

    pub fn selected_tile(&self) -> Option<i32> {
        self.selected_tile
    }

    pub fn set_selected_tile(&mut self, tile: Option<i32>) {
        self.selected_tile = tile;
    }

    pub fn canvas_origin(&self) -> Vec2 {
        self.canvas_origin
    }

    /// Client-space position of the canvas top-left corner.
    pub fn set_canvas_origin(&mut self, origin: Vec2) {
        self.canvas_origin = origin;
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.notifier.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.subscriber_count()
    }

    pub fn add_layer(&mut self, name: &str) -> Vec<LayerChange> {
        self.apply_layer_command(LayerCommand::Add {
            name: name.to_string(),
            tile_size: self.config.default_tile_size,
        })
    }

    pub fn apply_layer_command(&mut self, command: LayerCommand) -> Vec<LayerChange> {
        let changes = self.layers.apply(command);
        let mut layers_changed = false;
        let mut selection_changed = false;

        for change in &changes {
            match change {
                LayerChange::Added { name, id } => {
                    self.tilemap.create_layer(
                        *id,
                        self.config.layer_width,
                        self.config.layer_height,
                        TileCoord::default(),
                    );
                    info!(layer = %name, id = id.0, "layer_added");
                    layers_changed = true;
                }
                LayerChange::Removed { name, id } => {
                    self.tilemap.remove_layer(*id);
                    info!(layer = %name, id = id.0, "layer_deleted");
                    layers_changed = true;
                }
                LayerChange::Updated { name } => {
                    debug!(layer = %name, "layer_updated");
                    layers_changed = true;
                    selection_changed |= self.layers.selected() == Some(name.as_str());
                }
                LayerChange::Moved { name, from, to } => {
                    debug!(layer = %name, from, to, "layer_moved");
                    layers_changed = true;
                }
                LayerChange::VisibilityChanged { name, visible } => {
                    debug!(layer = %name, visible, "layer_visibility_changed");
                    layers_changed = true;
                    selection_changed |= self.layers.selected() == Some(name.as_str());
                }
                LayerChange::SelectionChanged { selected } => {
                    debug!(selected = selected.as_deref().unwrap_or(""), "layer_selected");
                    selection_changed = true;
                }
            }
        }

        if layers_changed {
            self.notifier.publish(EditorEvent::LayersChanged);
        }
        if selection_changed {
            self.notifier.publish(EditorEvent::SelectedLayerChanged);
        }
        changes
    }

    /// Dispatches one input event as a single uninterrupted step.
    pub fn handle_input(&mut self, input: EditorInput) -> ToolEffect {
        let mut ctx = EditContext {
            camera: &mut self.camera,
            layers: &self.layers,
            tilemap: &mut self.tilemap,
            selected_tile: self.selected_tile,
            canvas_origin: self.canvas_origin,
        };
        let effect = self.tools.handle(input, &mut ctx);

        if effect.camera_changed {
            self.notifier.publish(EditorEvent::CameraChanged);
        }
        if let Some(tool) = effect.tool_changed {
            self.notifier.publish(EditorEvent::ToolChanged(tool));
        }
        if let Some(layer) = effect.tiles_changed {
            self.notifier.publish(EditorEvent::TilesChanged { layer });
        }
        effect
    }

    pub fn reset_camera(&mut self) {
        self.camera.reset();
        self.notifier.publish(EditorEvent::CameraChanged);
    }
}
