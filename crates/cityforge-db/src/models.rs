use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Lifecycle status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for ProjectStatus {
    type Err = ProjectStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(ProjectStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`ProjectStatus`] string.
#[derive(Debug, Clone)]
pub struct ProjectStatusParseError(pub String);

impl fmt::Display for ProjectStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid project status: {:?}", self.0)
    }
}

impl std::error::Error for ProjectStatusParseError {}

// ---------------------------------------------------------------------------

/// Lifecycle status of an agent task.
///
/// Tasks are created `in_progress` and transition once to `completed` or
/// `failed`; they never re-enter `in_progress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

impl FromStr for TaskStatus {
    type Err = TaskStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(TaskStatusParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`TaskStatus`] string.
#[derive(Debug, Clone)]
pub struct TaskStatusParseError(pub String);

impl fmt::Display for TaskStatusParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid task status: {:?}", self.0)
    }
}

impl std::error::Error for TaskStatusParseError {}

// ---------------------------------------------------------------------------

/// The five fixed responsibility labels used to tag tasks and narration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Architect,
    Frontend,
    Backend,
    Database,
    Qa,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Architect => "architect",
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Database => "database",
            Self::Qa => "qa",
        };
        f.write_str(s)
    }
}

impl FromStr for AgentRole {
    type Err = AgentRoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "architect" => Ok(Self::Architect),
            "frontend" => Ok(Self::Frontend),
            "backend" => Ok(Self::Backend),
            "database" => Ok(Self::Database),
            "qa" => Ok(Self::Qa),
            other => Err(AgentRoleParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`AgentRole`] string.
#[derive(Debug, Clone)]
pub struct AgentRoleParseError(pub String);

impl fmt::Display for AgentRoleParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid agent role: {:?}", self.0)
    }
}

impl std::error::Error for AgentRoleParseError {}

// ---------------------------------------------------------------------------

/// Category of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Office,
    Park,
    Residential,
    Commercial,
}

impl fmt::Display for StructureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Office => "office",
            Self::Park => "park",
            Self::Residential => "residential",
            Self::Commercial => "commercial",
        };
        f.write_str(s)
    }
}

impl FromStr for StructureKind {
    type Err = StructureKindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "office" => Ok(Self::Office),
            "park" => Ok(Self::Park),
            "residential" => Ok(Self::Residential),
            "commercial" => Ok(Self::Commercial),
            other => Err(StructureKindParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`StructureKind`] string.
#[derive(Debug, Clone)]
pub struct StructureKindParseError(pub String);

impl fmt::Display for StructureKindParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid structure kind: {:?}", self.0)
    }
}

impl std::error::Error for StructureKindParseError {}

// ---------------------------------------------------------------------------
// Row structs
// ---------------------------------------------------------------------------

/// A project -- the root entity, one per user request.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Project {
    pub id: i64,
    /// Owning user; 0 is the anonymous sentinel.
    pub owner_id: i64,
    pub name: String,
    /// The original free-text request.
    pub prompt: String,
    pub status: ProjectStatus,
    /// Free-text label of the active role boundary, observability only.
    pub current_step: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A materialized structure. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Building {
    pub id: i64,
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
    pub created_at: DateTime<Utc>,
}

/// A unit of work performed by one role during a build sequence.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AgentTask {
    pub id: i64,
    pub project_id: i64,
    pub role: AgentRole,
    /// Display label of the model assigned to the role.
    pub model: String,
    pub description: String,
    pub status: TaskStatus,
    pub input: Option<String>,
    pub output: Option<String>,
    pub artifact: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One entry in the append-only inter-role narration log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CommunicationLog {
    pub id: i64,
    pub project_id: i64,
    pub from_agent: String,
    pub to_agent: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
