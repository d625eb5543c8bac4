//! Deterministic city metrics over materialized buildings.
//!
//! Every score is a pure function of the building list, so polling the
//! analytics endpoint twice on an unchanged project yields identical
//! numbers. Population estimation uses fixed per-kind averages instead of
//! sampled ranges for the same reason.

use cityforge_db::models::{Building, StructureKind};
use serde::Serialize;

/// Grid side length used for density calculations.
const GRID_SIZE: f64 = 60.0;

/// Mean pairwise distance considered optimal for efficiency scoring.
const OPTIMAL_DISTANCE: f64 = 10.0;

/// Fixed per-building population contributions.
const RESIDENTS_PER_RESIDENTIAL: i64 = 75;
const WORKERS_PER_COMMERCIAL: i64 = 30;
const WORKERS_PER_OFFICE: i64 = 150;

/// Score weights; distribution and efficiency dominate.
const WEIGHT_EFFICIENCY: f64 = 0.30;
const WEIGHT_DENSITY: f64 = 0.25;
const WEIGHT_DISTRIBUTION: f64 = 0.30;
const WEIGHT_DIVERSITY: f64 = 0.15;

/// Aggregated metrics for one project's buildings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityMetrics {
    pub total_buildings: usize,
    /// 0-100: how close the mean pairwise distance is to the optimum.
    pub efficiency_score: f64,
    /// 0-100: footprint coverage of the grid, optimal between 15% and 25%.
    pub density_score: f64,
    /// 0-100: how evenly the four quadrants are occupied.
    pub distribution_score: f64,
    /// 0-100: normalized Shannon diversity over structure kinds.
    pub diversity_score: f64,
    /// Weighted combination of the four scores.
    pub overall_score: f64,
    /// Estimated residents plus workers.
    pub population_estimate: i64,
}

/// Compute all metrics for a building list.
pub fn analyze(buildings: &[Building]) -> CityMetrics {
    let efficiency_score = efficiency(buildings);
    let density_score = density(buildings);
    let distribution_score = distribution(buildings);
    let diversity_score = diversity(buildings);

    let overall_score = efficiency_score * WEIGHT_EFFICIENCY
        + density_score * WEIGHT_DENSITY
        + distribution_score * WEIGHT_DISTRIBUTION
        + diversity_score * WEIGHT_DIVERSITY;

    CityMetrics {
        total_buildings: buildings.len(),
        efficiency_score,
        density_score,
        distribution_score,
        diversity_score,
        overall_score,
        population_estimate: population_estimate(buildings),
    }
}

/// Estimate the population from residential capacity and workplaces.
pub fn population_estimate(buildings: &[Building]) -> i64 {
    buildings
        .iter()
        .map(|b| match b.kind {
            StructureKind::Residential => RESIDENTS_PER_RESIDENTIAL,
            StructureKind::Commercial => WORKERS_PER_COMMERCIAL,
            StructureKind::Office => WORKERS_PER_OFFICE,
            StructureKind::Park => 0,
        })
        .sum()
}

fn efficiency(buildings: &[Building]) -> f64 {
    if buildings.is_empty() {
        return 0.0;
    }

    let mut distances = Vec::new();
    for (i, a) in buildings.iter().enumerate() {
        for b in buildings.iter().skip(i + 1) {
            let dx = a.position_x - b.position_x;
            let dz = a.position_z - b.position_z;
            distances.push((dx * dx + dz * dz).sqrt());
        }
    }

    if distances.is_empty() {
        return 0.0;
    }
    let avg = distances.iter().sum::<f64>() / distances.len() as f64;
    (100.0 - (avg - OPTIMAL_DISTANCE).abs() * 5.0).clamp(0.0, 100.0)
}

fn density(buildings: &[Building]) -> f64 {
    if buildings.is_empty() {
        return 0.0;
    }

    let total_area = GRID_SIZE * GRID_SIZE;
    let occupied: f64 = buildings.iter().map(|b| b.width * b.depth).sum();
    let ratio = occupied / total_area;

    if (0.15..=0.25).contains(&ratio) {
        100.0
    } else if ratio < 0.15 {
        (ratio / 0.15) * 100.0
    } else {
        (100.0 - (ratio - 0.25) * 200.0).max(0.0)
    }
}

fn distribution(buildings: &[Building]) -> f64 {
    if buildings.len() < 4 {
        return 0.0;
    }

    let mut quadrants = [0f64; 4];
    for b in buildings {
        let q = match (b.position_x >= 0.0, b.position_z >= 0.0) {
            (true, true) => 0,
            (false, true) => 1,
            (false, false) => 2,
            (true, false) => 3,
        };
        quadrants[q] += 1.0;
    }

    let mean = buildings.len() as f64 / 4.0;
    let variance = quadrants.iter().map(|&c| (c - mean) * (c - mean)).sum::<f64>() / 4.0;
    let std_dev = variance.sqrt();
    let max_std = buildings.len() as f64 / 4.0;

    (100.0 - (std_dev / max_std) * 100.0).max(0.0)
}

fn diversity(buildings: &[Building]) -> f64 {
    if buildings.is_empty() {
        return 0.0;
    }

    let total = buildings.len() as f64;
    let kinds = [
        StructureKind::Office,
        StructureKind::Park,
        StructureKind::Residential,
        StructureKind::Commercial,
    ];

    let shannon: f64 = kinds
        .iter()
        .map(|&kind| {
            let count = buildings.iter().filter(|b| b.kind == kind).count() as f64;
            if count == 0.0 {
                0.0
            } else {
                let p = count / total;
                -(p * p.ln())
            }
        })
        .sum();

    let max_diversity = (kinds.len() as f64).ln();
    (shannon / max_diversity) * 100.0
}
