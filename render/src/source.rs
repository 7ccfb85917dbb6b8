//! Input Data Collaborators
//!
//! Read-only shapes the engine consumes during `update`. The engine defines
//! only these traits and plain data types; storage, ingestion, and transport
//! belong to the host. `Static*` implementations back tests and simple
//! embedding hosts with in-memory vectors.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::viewport::FloorId;

/// Operational status of one piece of equipment
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentStatus {
    Operational,
    NeedsRepair,
    Failed,
    Offline,
    #[default]
    Unknown,
}

/// One piece of equipment, as the engine sees it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EquipmentState {
    pub id: String,
    /// Free-form kind tag ("outlet", "panel", ...); drives the glyph table
    pub kind: String,
    pub status: EquipmentStatus,
    pub x: f64,
    pub y: f64,
    pub floor: FloorId,
}

/// One room, in world units
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
    /// Free-form kind tag; feeds keyword-based label coloring
    pub kind: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub floor: FloorId,
}

/// Source of room geometry
pub trait StructureSource: Send + Sync {
    fn rooms(&self) -> Vec<Room>;
}

/// Source of equipment state
pub trait EquipmentSource: Send + Sync {
    fn equipment(&self) -> Vec<EquipmentState>;
}

/// Resolves an entity id to a world position, for camera follow targets
pub trait EntityLocator: Send + Sync {
    fn locate(&self, id: &str) -> Option<(f64, f64, FloorId)>;
}

/// Scalar field sampled per world position (temperature, energy, ...)
///
/// Samples are expected in `[0.0, 1.0]`; the overlay clamps anything else.
/// `None` means "no reading here" and leaves the cell untouched.
pub trait FieldSource: Send + Sync {
    fn sample(&self, floor: FloorId, world_x: f64, world_y: f64) -> Option<f32>;
}

/// In-memory structure source
#[derive(Debug, Default)]
pub struct StaticStructure {
    rooms: Mutex<Vec<Room>>,
}

impl StaticStructure {
    #[must_use]
    pub fn new(rooms: Vec<Room>) -> Self {
        Self {
            rooms: Mutex::new(rooms),
        }
    }

    pub fn set_rooms(&self, rooms: Vec<Room>) {
        *self.rooms.lock().expect("structure source poisoned") = rooms;
    }
}

impl StructureSource for StaticStructure {
    fn rooms(&self) -> Vec<Room> {
        self.rooms.lock().expect("structure source poisoned").clone()
    }
}

/// In-memory equipment source
#[derive(Debug, Default)]
pub struct StaticEquipment {
    items: Mutex<Vec<EquipmentState>>,
}

impl StaticEquipment {
    #[must_use]
    pub fn new(items: Vec<EquipmentState>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    pub fn set_equipment(&self, items: Vec<EquipmentState>) {
        *self.items.lock().expect("equipment source poisoned") = items;
    }
}

impl EquipmentSource for StaticEquipment {
    fn equipment(&self) -> Vec<EquipmentState> {
        self.items.lock().expect("equipment source poisoned").clone()
    }
}

impl EntityLocator for StaticEquipment {
    fn locate(&self, id: &str) -> Option<(f64, f64, FloorId)> {
        self.items
            .lock()
            .expect("equipment source poisoned")
            .iter()
            .find(|item| item.id == id)
            .map(|item| (item.x, item.y, item.floor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_equipment_locates() {
        let source = StaticEquipment::new(vec![EquipmentState {
            id: "pump-1".into(),
            kind: "appliance".into(),
            status: EquipmentStatus::Operational,
            x: 12.0,
            y: 3.0,
            floor: 2,
        }]);
        assert_eq!(source.locate("pump-1"), Some((12.0, 3.0, 2)));
        assert_eq!(source.locate("pump-2"), None);
    }

    #[test]
    fn test_static_structure_replaces() {
        let source = StaticStructure::default();
        assert!(source.rooms().is_empty());
        source.set_rooms(vec![Room {
            name: "Boiler".into(),
            kind: "mechanical".into(),
            x: 0.0,
            y: 0.0,
            width: 8.0,
            height: 4.0,
            floor: 0,
        }]);
        assert_eq!(source.rooms().len(), 1);
    }
}
