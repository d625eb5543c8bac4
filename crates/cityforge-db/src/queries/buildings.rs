//! Query functions for the `buildings` table.
//!
//! Buildings are immutable: there is no update path. Creation order is the
//! materialization order the executor guarantees, so readers always list by
//! ascending id.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::{Building, StructureKind};

/// Fields for a building about to be materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBuilding {
    pub project_id: i64,
    pub name: String,
    pub kind: StructureKind,
    pub position_x: f64,
    pub position_y: f64,
    pub position_z: f64,
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    pub color: String,
}

/// Insert a building row. Returns the inserted row with its generated id and
/// creation timestamp.
pub async fn insert_building(pool: &PgPool, building: &NewBuilding) -> Result<Building> {
    let row = sqlx::query_as::<_, Building>(
        "INSERT INTO buildings \
         (project_id, name, kind, position_x, position_y, position_z, width, height, depth, color) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         RETURNING *",
    )
    .bind(building.project_id)
    .bind(&building.name)
    .bind(building.kind)
    .bind(building.position_x)
    .bind(building.position_y)
    .bind(building.position_z)
    .bind(building.width)
    .bind(building.height)
    .bind(building.depth)
    .bind(&building.color)
    .fetch_one(pool)
    .await
    .with_context(|| format!("failed to insert building {:?}", building.name))?;

    Ok(row)
}

/// List all buildings for a project in creation order.
pub async fn list_buildings_for_project(pool: &PgPool, project_id: i64) -> Result<Vec<Building>> {
    let buildings = sqlx::query_as::<_, Building>(
        "SELECT * FROM buildings WHERE project_id = $1 ORDER BY id ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await
    .context("failed to list buildings for project")?;

    Ok(buildings)
}

/// Count the buildings materialized so far for a project.
pub async fn count_buildings_for_project(pool: &PgPool, project_id: i64) -> Result<i64> {
    let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM buildings WHERE project_id = $1")
        .bind(project_id)
        .fetch_one(pool)
        .await
        .context("failed to count buildings for project")?;

    Ok(row.0)
}
