//! Project ownership checks.
//!
//! Anonymous projects (owner 0) are open to everyone. An authenticated
//! caller is rejected only when the project has a real owner and it isn't
//! them; unauthenticated callers pass. Only logged-in mismatches are
//! refused.

use cityforge_db::models::Project;
use thiserror::Error;

/// The owner id marking a project as anonymous.
pub const ANONYMOUS_OWNER: i64 = 0;

/// Authorization failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("caller {caller} does not own project {project}")]
    NotOwner { caller: i64, project: i64 },
}

/// Check whether `caller` may act on `project`.
pub fn authorize(project: &Project, caller: Option<i64>) -> Result<(), AccessError> {
    match caller {
        Some(caller_id)
            if project.owner_id != ANONYMOUS_OWNER && project.owner_id != caller_id =>
        {
            Err(AccessError::NotOwner {
                caller: caller_id,
                project: project.id,
            })
        }
        _ => Ok(()),
    }
}
