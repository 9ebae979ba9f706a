//! Read-only spatial-model snapshot consumed by the builder and validator.
//! The surrounding application owns persistence and editing; this core only
//! ever borrows an immutable snapshot for the duration of one operation.

use serde::{Deserialize, Serialize};

use crate::models::{GeoPoint, TransitionKind};

/// Complete snapshot of the spatial model. `version` is bumped by the owning
/// application on every edit and keys the graph cache.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct SpatialModel {
    pub version: u64,
    pub outdoor: Layer,
    pub buildings: Vec<Building>,
}

/// Roads, landmarks and intersections of one map layer. The outdoor layer and
/// every floor share this shape.
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Layer {
    #[serde(default)]
    pub roads: Vec<Road>,
    #[serde(default)]
    pub landmarks: Vec<Landmark>,
    #[serde(default)]
    pub intersections: Vec<Intersection>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub id: String,
    pub name: String,
    pub floors: Vec<Floor>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: String,
    /// Display level (ground floor 0, basements negative).
    pub level: i32,
    #[serde(flatten)]
    pub layer: Layer,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Road {
    pub id: String,
    pub name: String,
    /// Ordered polyline. Fewer than two points is degenerate input; the
    /// builder skips it and the validator reports it.
    pub points: Vec<GeoPoint>,
    #[serde(default)]
    pub one_way: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Intersection {
    pub id: String,
    pub position: GeoPoint,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub position: GeoPoint,
    pub kind: LandmarkKind,
}

/// Closed set of landmark kinds. Exhaustive matching replaces the source
/// model's free-form type strings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum LandmarkKind {
    PointOfInterest,
    Entrance {
        #[serde(default)]
        accessible: bool,
    },
    Vertical {
        kind: TransitionKind,
        /// Floor ids this element connects to, within the same building.
        connected_floors: Vec<String>,
    },
}

impl Landmark {
    pub fn vertical_kind(&self) -> Option<TransitionKind> {
        match &self.kind {
            LandmarkKind::Vertical { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Borrowed view of one layer together with its owning scope. Outdoor layers
/// carry no building or floor.
#[derive(Clone, Copy, Debug)]
pub struct LayerRef<'a> {
    pub building: Option<&'a Building>,
    pub floor: Option<&'a Floor>,
    pub layer: &'a Layer,
}

impl<'a> LayerRef<'a> {
    pub fn building_id(&self) -> Option<&'a str> {
        self.building.map(|b| b.id.as_str())
    }

    pub fn floor_id(&self) -> Option<&'a str> {
        self.floor.map(|f| f.id.as_str())
    }
}

impl SpatialModel {
    /// All layers in stable order: outdoor first, then buildings and floors in
    /// declaration order. Builder and validator both iterate through this so
    /// the graph is deterministic.
    pub fn layers(&self) -> impl Iterator<Item = LayerRef<'_>> {
        let outdoor = std::iter::once(LayerRef {
            building: None,
            floor: None,
            layer: &self.outdoor,
        });
        let indoor = self.buildings.iter().flat_map(|b| {
            b.floors.iter().map(move |f| LayerRef {
                building: Some(b),
                floor: Some(f),
                layer: &f.layer,
            })
        });
        outdoor.chain(indoor)
    }

    pub fn find_floor(&self, building_id: &str, floor_id: &str) -> Option<&Floor> {
        self.buildings
            .iter()
            .find(|b| b.id == building_id)?
            .floors
            .iter()
            .find(|f| f.id == floor_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layers_yield_outdoor_then_floors_in_order() {
        let model = SpatialModel {
            version: 1,
            outdoor: Layer::default(),
            buildings: vec![Building {
                id: "b1".into(),
                name: "Main".into(),
                floors: vec![
                    Floor { id: "f1".into(), level: 0, layer: Layer::default() },
                    Floor { id: "f2".into(), level: 1, layer: Layer::default() },
                ],
            }],
        };
        let scopes: Vec<(Option<&str>, Option<&str>)> = model
            .layers()
            .map(|l| (l.building_id(), l.floor_id()))
            .collect();
        assert_eq!(
            scopes,
            vec![(None, None), (Some("b1"), Some("f1")), (Some("b1"), Some("f2"))]
        );
    }

    #[test]
    fn landmark_kind_deserializes_tagged() {
        let v = serde_json::json!({
            "id": "e1",
            "name": "Lift A",
            "position": { "lat": 0.0, "lon": 0.0 },
            "kind": { "type": "vertical", "kind": "elevator", "connected_floors": ["f2"] }
        });
        let lm: Landmark = serde_json::from_value(v).unwrap();
        assert_eq!(lm.vertical_kind(), Some(crate::models::TransitionKind::Elevator));
    }

    #[test]
    fn entrance_accessible_defaults_to_false() {
        let v = serde_json::json!({ "type": "entrance" });
        let k: LandmarkKind = serde_json::from_value(v).unwrap();
        assert_eq!(k, LandmarkKind::Entrance { accessible: false });
    }
}
