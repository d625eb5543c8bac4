//! Deterministic fallback plan.
//!
//! Substituted whenever the architect response cannot be parsed or fails
//! the schema, so a malformed or truncated completion never aborts the
//! pipeline. The plan is fixed data: no clock, no randomness, identical on
//! every call. It does not hit the full 50-entity target -- it only has to
//! be internally consistent and spread across all four quadrants and the
//! corners.

use cityforge_db::models::StructureKind::{Commercial, Office, Park, Residential};

use super::types::{CityPlan, PlanPhase, PlannedBuilding};

/// Build the canned five-phase plan.
pub fn fallback_plan() -> CityPlan {
    CityPlan {
        analysis: "Creating a comprehensive modern city with full grid coverage".to_string(),
        phases: vec![
            PlanPhase {
                phase: 1,
                name: "Public Infrastructure".to_string(),
                buildings: vec![
                    PlannedBuilding::new("Main Avenue", Park, (0.0, 0.0, 0.0), (40.0, 0.3, 4.0), "#555555"),
                    PlannedBuilding::new("Central Park", Park, (-15.0, 0.0, 15.0), (12.0, 0.5, 12.0), "#2d5016"),
                    PlannedBuilding::new("East Plaza", Park, (20.0, 0.0, 20.0), (8.0, 0.4, 8.0), "#3d6b1f"),
                    PlannedBuilding::new("West Garden", Park, (-20.0, 0.0, -15.0), (10.0, 0.5, 10.0), "#2d5016"),
                ],
            },
            PlanPhase {
                phase: 2,
                name: "Commercial District".to_string(),
                buildings: vec![
                    PlannedBuilding::new("Shopping Mall", Commercial, (-12.0, 0.0, -8.0), (8.0, 7.0, 8.0), "#dc2626"),
                    PlannedBuilding::new("Market Center", Commercial, (15.0, 0.0, -10.0), (7.0, 6.0, 7.0), "#ea580c"),
                    PlannedBuilding::new("Restaurant District", Commercial, (-25.0, 0.0, 5.0), (6.0, 5.0, 6.0), "#f97316"),
                    PlannedBuilding::new("Retail Plaza", Commercial, (25.0, 0.0, 8.0), (7.0, 6.0, 7.0), "#fb923c"),
                    PlannedBuilding::new("Business Center", Commercial, (8.0, 0.0, -25.0), (6.0, 7.0, 6.0), "#dc2626"),
                    PlannedBuilding::new("Trade Hub", Commercial, (-8.0, 0.0, 25.0), (7.0, 6.0, 7.0), "#ea580c"),
                ],
            },
            PlanPhase {
                phase: 3,
                name: "Residential Area".to_string(),
                buildings: vec![
                    PlannedBuilding::new("Skyline Apartments", Residential, (-18.0, 0.0, -20.0), (6.0, 15.0, 6.0), "#7c3aed"),
                    PlannedBuilding::new("Garden Residences", Residential, (18.0, 0.0, -18.0), (5.0, 12.0, 5.0), "#a855f7"),
                    PlannedBuilding::new("Harbor View Condos", Residential, (-22.0, 0.0, 22.0), (6.0, 14.0, 6.0), "#8b5cf6"),
                    PlannedBuilding::new("Sunset Towers", Residential, (22.0, 0.0, 22.0), (5.0, 13.0, 5.0), "#a855f7"),
                    PlannedBuilding::new("Riverside Homes", Residential, (12.0, 0.0, 12.0), (5.0, 11.0, 5.0), "#7c3aed"),
                    PlannedBuilding::new("Parkside Living", Residential, (-12.0, 0.0, 8.0), (5.0, 12.0, 5.0), "#9333ea"),
                ],
            },
            PlanPhase {
                phase: 4,
                name: "Office District".to_string(),
                buildings: vec![
                    PlannedBuilding::new("Corporate Tower A", Office, (-10.0, 0.0, -28.0), (7.0, 22.0, 7.0), "#3b82f6"),
                    PlannedBuilding::new("Tech Hub", Office, (10.0, 0.0, -28.0), (6.0, 20.0, 6.0), "#0ea5e9"),
                    PlannedBuilding::new("Financial Center", Office, (28.0, 0.0, -5.0), (7.0, 24.0, 7.0), "#2563eb"),
                    PlannedBuilding::new("Innovation Plaza", Office, (-28.0, 0.0, -8.0), (6.0, 18.0, 6.0), "#3b82f6"),
                    PlannedBuilding::new("Business Park", Office, (5.0, 0.0, -15.0), (6.0, 17.0, 6.0), "#0ea5e9"),
                ],
            },
            PlanPhase {
                phase: 5,
                name: "Public Facilities".to_string(),
                buildings: vec![
                    PlannedBuilding::new("City Hospital", Commercial, (0.0, 0.0, 28.0), (10.0, 10.0, 8.0), "#10b981"),
                    PlannedBuilding::new("Central Library", Commercial, (-28.0, 0.0, -25.0), (9.0, 8.0, 7.0), "#14b8a6"),
                    PlannedBuilding::new("Community Center", Commercial, (28.0, 0.0, -22.0), (8.0, 9.0, 7.0), "#10b981"),
                ],
            },
        ],
    }
}
