//! Plan handling: decoded types, exact-count schema, tolerant parsing,
//! deterministic fallback, spatial heuristics, and prompt construction.

pub mod fallback;
pub mod parser;
pub mod prompt;
pub mod schema;
pub mod spatial;
pub mod types;

pub use fallback::fallback_plan;
pub use parser::{extract_json_object, parse_city_plan, PlanParseError};
pub use schema::{validate_plan, PlanValidationError, PHASE_LAYOUT, TOTAL_PLANNED_BUILDINGS};
pub use spatial::{survey, SpatialReport};
pub use types::{CityPlan, Dimensions, PlanPhase, PlannedBuilding, Position};
