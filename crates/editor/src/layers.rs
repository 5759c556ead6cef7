use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::TileSize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    pub id: LayerId,
    pub name: String,
    pub tile_size: TileSize,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerCommand {
    /// A blank name is replaced with `"Layer {n}"`.
    Add { name: String, tile_size: TileSize },
    Update {
        name: String,
        tile_size: Option<TileSize>,
    },
    Delete { name: String },
    Select { name: String },
    Move { name: String, to: usize },
    ToggleVisibility { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerChange {
    Added { name: String, id: LayerId },
    Removed { name: String, id: LayerId },
    Updated { name: String },
    Moved { name: String, from: usize, to: usize },
    VisibilityChanged { name: String, visible: bool },
    SelectionChanged { selected: Option<String> },
}

/// Ordered, named layers.
///
/// Invariants:
/// - `names` and the keys of `layers` are the same set.
/// - `next_id` only grows; ids of deleted layers are never handed out again.
/// - `selected` is `None` or a name present in `layers`.
#[derive(Debug, Clone, Default)]
pub struct LayerRegistry {
    names: Vec<String>,
    layers: HashMap<String, Layer>,
    selected: Option<String>,
    next_id: u32,
}

impl LayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, command: LayerCommand) -> Vec<LayerChange> {
        match command {
            LayerCommand::Add { name, tile_size } => self.add(&name, tile_size),
            LayerCommand::Update { name, tile_size } => self.update(&name, tile_size),
            LayerCommand::Delete { name } => self.delete(&name),
            LayerCommand::Select { name } => self.select(&name),
            LayerCommand::Move { name, to } => self.move_layer(&name, to),
            LayerCommand::ToggleVisibility { name } => self.toggle_visibility(&name),
        }
    }

    pub fn add(&mut self, name: &str, tile_size: TileSize) -> Vec<LayerChange> {
        let name = if name.trim().is_empty() {
            self.synthesize_name()
        } else {
            name.to_string()
        };
        if self.layers.contains_key(&name) {
            debug!(layer = %name, "layer_add_rejected_duplicate");
            return Vec::new();
        }

        let id = LayerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.names.push(name.clone());
        self.layers.insert(
            name.clone(),
            Layer {
                id,
                name: name.clone(),
                tile_size,
                visible: true,
            },
        );
        self.selected = Some(name.clone());

        vec![
            LayerChange::Added {
                name: name.clone(),
                id,
            },
            LayerChange::SelectionChanged {
                selected: Some(name),
            },
        ]
    }

    pub fn update(&mut self, name: &str, tile_size: Option<TileSize>) -> Vec<LayerChange> {
        let Some(layer) = self.layers.get_mut(name) else {
            debug!(layer = %name, "layer_update_unknown");
            return Vec::new();
        };
        match tile_size {
            Some(tile_size) if tile_size != layer.tile_size => {
                layer.tile_size = tile_size;
                vec![LayerChange::Updated {
                    name: name.to_string(),
                }]
            }
            _ => Vec::new(),
        }
    }

    pub fn delete(&mut self, name: &str) -> Vec<LayerChange> {
        let Some(index) = self.index_of(name) else {
            debug!(layer = %name, "layer_delete_unknown");
            return Vec::new();
        };
        self.names.remove(index);
        let Some(removed) = self.layers.remove(name) else {
            return Vec::new();
        };

        let mut changes = vec![LayerChange::Removed {
            name: removed.name,
            id: removed.id,
        }];
        let was_selected = self.selected.as_deref() == Some(name);
        if was_selected || self.names.is_empty() {
            let reselected = if self.names.is_empty() {
                None
            } else {
                let sibling = index.saturating_sub(1).min(self.names.len() - 1);
                Some(self.names[sibling].clone())
            };
            if reselected != self.selected {
                self.selected = reselected.clone();
                changes.push(LayerChange::SelectionChanged {
                    selected: reselected,
                });
            }
        }
        changes
    }

    /// Unknown names are rejected so `selected` never points outside the registry.
    pub fn select(&mut self, name: &str) -> Vec<LayerChange> {
        if !self.layers.contains_key(name) {
            debug!(layer = %name, "layer_select_unknown");
            return Vec::new();
        }
        if self.selected.as_deref() == Some(name) {
            return Vec::new();
        }
        self.selected = Some(name.to_string());
        vec![LayerChange::SelectionChanged {
            selected: Some(name.to_string()),
        }]
    }

    pub fn move_layer(&mut self, name: &str, to: usize) -> Vec<LayerChange> {
        let Some(from) = self.index_of(name) else {
            debug!(layer = %name, "layer_move_unknown");
            return Vec::new();
        };
        let moved = self.names.remove(from);
        let to = to.min(self.names.len());
        self.names.insert(to, moved);
        if from == to {
            return Vec::new();
        }
        vec![LayerChange::Moved {
            name: name.to_string(),
            from,
            to,
        }]
    }

    pub fn toggle_visibility(&mut self, name: &str) -> Vec<LayerChange> {
        let Some(layer) = self.layers.get_mut(name) else {
            debug!(layer = %name, "layer_toggle_unknown");
            return Vec::new();
        };
        layer.visible = !layer.visible;
        vec![LayerChange::VisibilityChanged {
            name: name.to_string(),
            visible: layer.visible,
        }]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|candidate| candidate == name)
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_layer(&self) -> Option<&Layer> {
        self.selected.as_deref().and_then(|name| self.layers.get(name))
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Layers in render order.
    pub fn iter(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.names.iter().filter_map(|name| self.layers.get(name))
    }

    fn synthesize_name(&self) -> String {
        let mut suffix = u64::from(self.next_id) + 1;
        loop {
            let candidate = format!("Layer {suffix}");
            if !self.layers.contains_key(&candidate) {
                return candidate;
            }
            suffix += 1;
        }
    }
}
