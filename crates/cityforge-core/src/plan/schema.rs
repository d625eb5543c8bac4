//! Structural contract a plan must satisfy before acceptance.
//!
//! The contract is exact: five phases in ordinal order with fixed per-phase
//! counts. A plan that misses any count is discarded wholesale in favor of
//! the fallback -- no padding, no partial acceptance.

use thiserror::Error;

use super::types::CityPlan;

/// The fixed phase layout: display name and exact expected entity count.
pub const PHASE_LAYOUT: [(&str, usize); 5] = [
    ("Public Infrastructure", 10),
    ("Commercial District", 12),
    ("Residential Area", 12),
    ("Office District", 10),
    ("Public Facilities", 6),
];

/// Total entities a conforming plan carries: 10 + 12 + 12 + 10 + 6.
pub const TOTAL_PLANNED_BUILDINGS: usize = 50;

/// Errors from validating a decoded plan against the schema.
#[derive(Debug, Error)]
pub enum PlanValidationError {
    #[error("expected {expected} phases, found {found}")]
    PhaseCount { expected: usize, found: usize },

    #[error("phase at index {index} has ordinal {found}, expected {expected}")]
    PhaseOrdinal { index: usize, expected: u32, found: u32 },

    #[error("phase {phase} ({name:?}) has {found} buildings, expected exactly {expected}")]
    BuildingCount {
        phase: u32,
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("building {name:?} in phase {phase} has a non-positive {component}: {value}")]
    NonPositiveSize {
        phase: u32,
        name: String,
        component: &'static str,
        value: f64,
    },

    #[error("building {name:?} in phase {phase} has an empty color")]
    EmptyColor { phase: u32, name: String },
}

/// Validate a decoded plan against the exact-count schema.
///
/// Entity `type` is already enforced by the decoder (unknown kinds fail the
/// parse); this pass checks phase structure, per-phase counts, positive
/// size components, and non-empty colors where a color is present.
pub fn validate_plan(plan: &CityPlan) -> Result<(), PlanValidationError> {
    if plan.phases.len() != PHASE_LAYOUT.len() {
        return Err(PlanValidationError::PhaseCount {
            expected: PHASE_LAYOUT.len(),
            found: plan.phases.len(),
        });
    }

    for (index, phase) in plan.phases.iter().enumerate() {
        let expected_ordinal = (index + 1) as u32;
        if phase.phase != expected_ordinal {
            return Err(PlanValidationError::PhaseOrdinal {
                index,
                expected: expected_ordinal,
                found: phase.phase,
            });
        }

        let expected_count = PHASE_LAYOUT[index].1;
        if phase.buildings.len() != expected_count {
            return Err(PlanValidationError::BuildingCount {
                phase: phase.phase,
                name: phase.name.clone(),
                expected: expected_count,
                found: phase.buildings.len(),
            });
        }

        for building in &phase.buildings {
            for (component, value) in [
                ("width", building.size.width),
                ("height", building.size.height),
                ("depth", building.size.depth),
            ] {
                if let Some(value) = value {
                    if value <= 0.0 {
                        return Err(PlanValidationError::NonPositiveSize {
                            phase: phase.phase,
                            name: building.name.clone(),
                            component,
                            value,
                        });
                    }
                }
            }

            if let Some(color) = &building.color {
                if color.is_empty() {
                    return Err(PlanValidationError::EmptyColor {
                        phase: phase.phase,
                        name: building.name.clone(),
                    });
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use cityforge_db::models::StructureKind;

    use super::super::types::{PlanPhase, PlannedBuilding};
    use super::*;

    /// Build a plan conforming exactly to [`PHASE_LAYOUT`].
    fn conforming_plan() -> CityPlan {
        let phases = PHASE_LAYOUT
            .iter()
            .enumerate()
            .map(|(index, (name, count))| PlanPhase {
                phase: (index + 1) as u32,
                name: name.to_string(),
                buildings: (0..*count)
                    .map(|i| {
                        PlannedBuilding::new(
                            &format!("{name} {i}"),
                            StructureKind::Commercial,
                            (i as f64 * 5.0 - 25.0, 0.0, index as f64 * 12.0 - 25.0),
                            (4.0, 8.0, 4.0),
                            "#dc2626",
                        )
                    })
                    .collect(),
            })
            .collect();
        CityPlan {
            analysis: "test".to_string(),
            phases,
        }
    }

    #[test]
    fn layout_sums_to_total() {
        let sum: usize = PHASE_LAYOUT.iter().map(|(_, c)| c).sum();
        assert_eq!(sum, TOTAL_PLANNED_BUILDINGS);
    }

    #[test]
    fn accepts_conforming_plan() {
        let plan = conforming_plan();
        assert_eq!(plan.total_buildings(), TOTAL_PLANNED_BUILDINGS);
        validate_plan(&plan).expect("conforming plan should validate");
    }

    #[test]
    fn rejects_wrong_phase_count() {
        let mut plan = conforming_plan();
        plan.phases.pop();
        let err = validate_plan(&plan).unwrap_err();
        assert!(matches!(err, PlanValidationError::PhaseCount { found: 4, .. }));
    }

    #[test]
    fn rejects_wrong_ordinal() {
        let mut plan = conforming_plan();
        plan.phases[2].phase = 7;
        let err = validate_plan(&plan).unwrap_err();
        assert!(matches!(
            err,
            PlanValidationError::PhaseOrdinal {
                index: 2,
                expected: 3,
                found: 7
            }
        ));
    }

    #[test]
    fn rejects_short_phase() {
        let mut plan = conforming_plan();
        plan.phases[1].buildings.pop();
        let err = validate_plan(&plan).unwrap_err();
        assert!(matches!(
            err,
            PlanValidationError::BuildingCount {
                phase: 2,
                expected: 12,
                found: 11,
                ..
            }
        ));
    }

    #[test]
    fn rejects_overfull_phase() {
        let mut plan = conforming_plan();
        let extra = plan.phases[4].buildings[0].clone();
        plan.phases[4].buildings.push(extra);
        let err = validate_plan(&plan).unwrap_err();
        assert!(matches!(
            err,
            PlanValidationError::BuildingCount { phase: 5, found: 7, .. }
        ));
    }

    #[test]
    fn rejects_non_positive_size() {
        let mut plan = conforming_plan();
        plan.phases[0].buildings[3].size.height = Some(0.0);
        let err = validate_plan(&plan).unwrap_err();
        assert!(matches!(
            err,
            PlanValidationError::NonPositiveSize {
                component: "height",
                ..
            }
        ));
    }

    #[test]
    fn rejects_empty_color() {
        let mut plan = conforming_plan();
        plan.phases[0].buildings[0].color = Some(String::new());
        let err = validate_plan(&plan).unwrap_err();
        assert!(matches!(err, PlanValidationError::EmptyColor { phase: 1, .. }));
    }

    #[test]
    fn absent_size_and_color_are_fine() {
        // Absent values get operational defaults downstream; only present
        // bad values are rejected.
        let mut plan = conforming_plan();
        plan.phases[0].buildings[0].size.width = None;
        plan.phases[0].buildings[0].color = None;
        validate_plan(&plan).expect("absent fields should validate");
    }
}
