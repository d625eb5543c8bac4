//! In-memory plan tree decoded from the architect's response.
//!
//! A plan lives only for the duration of one build sequence; buildings are
//! the persisted form. Missing position components decode to 0 and missing
//! size/color fields stay `None` until materialization applies the same
//! defaults the presentation layer uses, so a structure is never invisible.

use cityforge_db::models::StructureKind;
use serde::{Deserialize, Serialize};

/// Footprint (width/depth) applied when the plan omits a dimension.
pub const DEFAULT_FOOTPRINT: f64 = 3.0;

/// Height applied when the plan omits one.
pub const DEFAULT_HEIGHT: f64 = 10.0;

/// Color applied when the plan omits one.
pub const DEFAULT_COLOR: &str = "#3b82f6";

/// A full construction plan: free-text analysis plus ordered phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityPlan {
    #[serde(default)]
    pub analysis: String,
    pub phases: Vec<PlanPhase>,
}

impl CityPlan {
    /// Total entity count across all phases -- the authoritative progress
    /// denominator reported to consumers.
    pub fn total_buildings(&self) -> usize {
        self.phases.iter().map(|p| p.buildings.len()).sum()
    }
}

/// One ordered stage of construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanPhase {
    /// 1-based ordinal; execution order equals ordinal order.
    pub phase: u32,
    pub name: String,
    #[serde(default)]
    pub buildings: Vec<PlannedBuilding>,
}

/// A structure not yet materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannedBuilding {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StructureKind,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub size: Dimensions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl PlannedBuilding {
    /// Convenience constructor used by the fallback plan.
    pub fn new(
        name: &str,
        kind: StructureKind,
        position: (f64, f64, f64),
        size: (f64, f64, f64),
        color: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            kind,
            position: Position {
                x: position.0,
                y: position.1,
                z: position.2,
            },
            size: Dimensions {
                width: Some(size.0),
                height: Some(size.1),
                depth: Some(size.2),
            },
            color: Some(color.to_string()),
        }
    }

    pub fn color_or_default(&self) -> &str {
        self.color
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_COLOR)
    }
}

/// Center position on the grid. Components default to 0 when absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

/// Extents of a structure; components are optional in plan JSON.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl Dimensions {
    pub fn width_or_default(&self) -> f64 {
        self.width.unwrap_or(DEFAULT_FOOTPRINT)
    }

    pub fn height_or_default(&self) -> f64 {
        self.height.unwrap_or(DEFAULT_HEIGHT)
    }

    pub fn depth_or_default(&self) -> f64 {
        self.depth.unwrap_or(DEFAULT_FOOTPRINT)
    }
}
