//! Heuristic spatial checks on a plan's placements.
//!
//! These mirror the distribution rules the architect prompt demands: full
//! grid usage, bounded center clustering, edge and corner quotas, balanced
//! quadrants, and minimum spacing. They are advisory -- a violating plan is
//! surveyed and logged, never rejected.

use super::types::CityPlan;

/// Half-extent of the target grid on x and z.
pub const GRID_HALF_SPAN: f64 = 30.0;

/// Center zone half-extent (|x| and |z| both within this).
pub const CENTER_ZONE_HALF: f64 = 10.0;

/// Maximum buildings tolerated in the center zone.
pub const CENTER_ZONE_MAX: usize = 8;

/// Edge threshold: |x| or |z| beyond this counts as edge placement.
pub const EDGE_THRESHOLD: f64 = 15.0;

/// Minimum buildings required at the edges.
pub const EDGE_MIN: usize = 15;

/// Corner threshold: |x| and |z| both beyond this counts as a corner.
pub const CORNER_THRESHOLD: f64 = 20.0;

/// Minimum buildings required in the corners.
pub const CORNER_MIN: usize = 8;

/// Inclusive per-quadrant occupancy range.
pub const QUADRANT_MIN: usize = 10;
pub const QUADRANT_MAX: usize = 15;

/// Minimum center-to-center spacing between any two buildings.
pub const MIN_SPACING: f64 = 4.0;

/// A pair of buildings closer than [`MIN_SPACING`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpacingViolation {
    pub first: String,
    pub second: String,
    pub distance: f64,
}

/// Aggregated placement statistics for one plan.
#[derive(Debug, Clone, PartialEq)]
pub struct SpatialReport {
    pub total: usize,
    pub center_zone: usize,
    pub edge: usize,
    pub corner: usize,
    /// Counts per quadrant: (+x,+z), (-x,+z), (-x,-z), (+x,-z).
    pub quadrants: [usize; 4],
    pub out_of_bounds: usize,
    pub spacing_violations: Vec<SpacingViolation>,
}

impl SpatialReport {
    /// Human-readable advisory findings, empty when the plan satisfies
    /// every heuristic.
    pub fn violations(&self) -> Vec<String> {
        let mut findings = Vec::new();

        if self.center_zone > CENTER_ZONE_MAX {
            findings.push(format!(
                "{} buildings in the center zone (limit {CENTER_ZONE_MAX})",
                self.center_zone
            ));
        }
        if self.edge < EDGE_MIN {
            findings.push(format!(
                "only {} buildings at the edges (want at least {EDGE_MIN})",
                self.edge
            ));
        }
        if self.corner < CORNER_MIN {
            findings.push(format!(
                "only {} buildings in the corners (want at least {CORNER_MIN})",
                self.corner
            ));
        }
        for (quadrant, &count) in self.quadrants.iter().enumerate() {
            if !(QUADRANT_MIN..=QUADRANT_MAX).contains(&count) {
                findings.push(format!(
                    "quadrant {quadrant} holds {count} buildings (want {QUADRANT_MIN}-{QUADRANT_MAX})"
                ));
            }
        }
        if self.out_of_bounds > 0 {
            findings.push(format!(
                "{} buildings outside the [-{GRID_HALF_SPAN}, {GRID_HALF_SPAN}] grid",
                self.out_of_bounds
            ));
        }
        for violation in &self.spacing_violations {
            findings.push(format!(
                "{:?} and {:?} are {:.1} units apart (minimum {MIN_SPACING})",
                violation.first, violation.second, violation.distance
            ));
        }

        findings
    }
}

/// Survey a plan's placements against the distribution heuristics.
pub fn survey(plan: &CityPlan) -> SpatialReport {
    let buildings: Vec<_> = plan.phases.iter().flat_map(|p| &p.buildings).collect();

    let mut report = SpatialReport {
        total: buildings.len(),
        center_zone: 0,
        edge: 0,
        corner: 0,
        quadrants: [0; 4],
        out_of_bounds: 0,
        spacing_violations: Vec::new(),
    };

    for building in &buildings {
        let (x, z) = (building.position.x, building.position.z);

        if x.abs() <= CENTER_ZONE_HALF && z.abs() <= CENTER_ZONE_HALF {
            report.center_zone += 1;
        }
        if x.abs() > EDGE_THRESHOLD || z.abs() > EDGE_THRESHOLD {
            report.edge += 1;
        }
        if x.abs() > CORNER_THRESHOLD && z.abs() > CORNER_THRESHOLD {
            report.corner += 1;
        }
        if x.abs() > GRID_HALF_SPAN || z.abs() > GRID_HALF_SPAN {
            report.out_of_bounds += 1;
        }

        let quadrant = match (x >= 0.0, z >= 0.0) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        };
        report.quadrants[quadrant] += 1;
    }

    for (i, a) in buildings.iter().enumerate() {
        for b in buildings.iter().skip(i + 1) {
            let dx = a.position.x - b.position.x;
            let dz = a.position.z - b.position.z;
            let distance = (dx * dx + dz * dz).sqrt();
            if distance < MIN_SPACING {
                report.spacing_violations.push(SpacingViolation {
                    first: a.name.clone(),
                    second: b.name.clone(),
                    distance,
                });
            }
        }
    }

    report
}
