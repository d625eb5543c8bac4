//! Narration policy: the inter-role dialogue appended to the communication
//! log around each step of a build sequence.
//!
//! Narration is observability content only; nothing downstream parses it.
//! The policy is data (sequences of {from, to, message} entries
//! parameterized by plan, phase, and building), decoupled from the state
//! machine so pacing stays a presentation concern. `Summary` style keeps
//! the log readable in tests and headless runs by collapsing the planning
//! chatter and dropping per-building commentary.

use cityforge_db::models::AgentRole;

use crate::plan::types::{PlanPhase, PlannedBuilding};
use crate::roles::model_label;

/// One pending log entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrationEntry {
    pub from: String,
    pub to: String,
    pub message: String,
}

fn entry(from: &str, to: &str, message: impl Into<String>) -> NarrationEntry {
    NarrationEntry {
        from: from.to_string(),
        to: to.to_string(),
        message: message.into(),
    }
}

/// How much dialogue to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NarrationStyle {
    /// The full simulated team discussion.
    #[default]
    Full,
    /// One planning-summary entry plus phase boundaries.
    Summary,
}

/// The opening planning discussion among the five roles.
pub fn planning_discussion(style: NarrationStyle, user_prompt: &str) -> Vec<NarrationEntry> {
    let architect = model_label(AgentRole::Architect);
    let database = model_label(AgentRole::Database);
    let backend = model_label(AgentRole::Backend);
    let frontend = model_label(AgentRole::Frontend);
    let qa = model_label(AgentRole::Qa);

    if style == NarrationStyle::Summary {
        return vec![entry(
            "System",
            "All",
            format!(
                "New city building request: \"{user_prompt}\". The team agreed on a 5-phase \
                 approach: infrastructure, commercial, residential, office, public facilities."
            ),
        )];
    }

    vec![
        entry(
            "System",
            architect,
            format!("New city building request: \"{user_prompt}\". Please analyze and propose approach."),
        ),
        entry(
            architect,
            "All",
            "Analyzing requirements... I propose we build this in 5 phases: 1) Infrastructure \
             first (roads, utilities, parks), 2) Commercial zone, 3) Residential area, 4) Office \
             district, 5) Public facilities. This ensures proper foundation before vertical \
             construction.",
        ),
        entry(
            database,
            architect,
            "Good approach. For the database, I suggest we use spatial indexing with x,y,z \
             coordinates. Should we also track construction phases and timestamps for each \
             building?",
        ),
        entry(
            architect,
            database,
            "Yes, definitely track phases and timestamps. Also add building status field. We'll \
             need to query buildings by phase later.",
        ),
        entry(
            backend,
            "All",
            "For the backend API, I'll create endpoints for each construction phase. Should we \
             implement real-time progress tracking? Maybe push updates?",
        ),
        entry(
            frontend,
            backend,
            "Polling should be sufficient for now - push delivery might be overkill. I'll use \
             instanced rendering for better performance once we have 15+ buildings. Planning to \
             add construction animations too.",
        ),
        entry(
            qa,
            "All",
            "I'll need to validate spatial constraints - buildings shouldn't overlap, roads \
             should connect properly. Also need to check color contrast for accessibility. Let's \
             define building spacing rules now.",
        ),
        entry(
            architect,
            qa,
            "Good point. Let's use minimum 4-unit spacing between buildings, roads should be 3-4 \
             units wide. I'll ensure the layout follows grid patterns for realistic city \
             planning.",
        ),
        entry(
            database,
            "All",
            "Should we add metadata like building materials, construction cost, energy \
             efficiency ratings? Could be useful for future analytics.",
        ),
        entry(
            architect,
            database,
            "Let's keep it simple for now - name, type, position, size, color, phase. We can \
             extend the schema later if needed. Focus on core functionality first.",
        ),
        entry(
            qa,
            "All",
            "I'll create test cases for each phase. We need to verify: 1) Infrastructure loads \
             first, 2) Buildings don't overlap, 3) Colors are distinct, 4) The grid is used edge \
             to edge. Agreed?",
        ),
        entry(
            architect,
            "All",
            "Perfect. Everyone clear on their roles? Let's proceed with detailed planning. I'll \
             create the master plan now with all 5 phases defined.",
        ),
        entry(
            "System",
            architect,
            "Proceeding with detailed city plan based on team consensus",
        ),
    ]
}

/// Confirmation after the architect response arrives.
pub fn plan_created() -> NarrationEntry {
    entry(
        model_label(AgentRole::Architect),
        "System",
        "Comprehensive 5-phase plan created",
    )
}

/// Handoff into the database step.
pub fn database_handoff(style: NarrationStyle, total: usize, phases: usize) -> Vec<NarrationEntry> {
    let architect = model_label(AgentRole::Architect);
    let database = model_label(AgentRole::Database);

    let mut entries = vec![entry(
        architect,
        database,
        format!(
            "Plan approved. We have {total} buildings across {phases} phases. Please set up the \
             database schema."
        ),
    )];
    if style == NarrationStyle::Full {
        entries.push(entry(
            database,
            "All",
            "Database is ready! Schema includes spatial indexing for efficient queries and phase \
             tracking for construction management.",
        ));
    }
    entries
}

/// Handoff into the backend step.
pub fn backend_handoff(style: NarrationStyle) -> Vec<NarrationEntry> {
    let database = model_label(AgentRole::Database);
    let backend = model_label(AgentRole::Backend);

    let mut entries = vec![entry(
        database,
        backend,
        "Database ready. Please create API endpoints for phased construction management.",
    )];
    if style == NarrationStyle::Full {
        entries.push(entry(
            backend,
            "All",
            "API is live! All endpoints tested and ready. Supporting phase-based queries and \
             spatial filtering.",
        ));
    }
    entries
}

/// Handoff into the frontend step.
pub fn frontend_handoff(style: NarrationStyle, total: usize, phases: usize) -> Vec<NarrationEntry> {
    let backend = model_label(AgentRole::Backend);
    let frontend = model_label(AgentRole::Frontend);

    let mut entries = vec![entry(
        backend,
        frontend,
        format!(
            "Backend ready. Please create the 3D visualization for {total} buildings across \
             {phases} construction phases."
        ),
    )];
    if style == NarrationStyle::Full {
        entries.push(entry(
            frontend,
            "All",
            "3D visualization is ready! Buildings will animate as they're constructed. \
             Performance optimized for 20+ buildings.",
        ));
    }
    entries
}

/// Opening entries for a phase.
pub fn phase_start(style: NarrationStyle, phase: &PlanPhase) -> Vec<NarrationEntry> {
    let architect = model_label(AgentRole::Architect);
    let qa = model_label(AgentRole::Qa);

    let mut entries = vec![entry(
        architect,
        "All",
        format!(
            "Starting Phase {}: {}. This phase includes {} structures.",
            phase.phase,
            phase.name,
            phase.buildings.len()
        ),
    )];
    if style == NarrationStyle::Full {
        entries.push(entry(
            qa,
            architect,
            format!(
                "Phase {} ready for construction. I'll validate each building as it's created.",
                phase.phase
            ),
        ));
    }
    entries
}

/// Discussion before one building is materialized.
pub fn building_proposal(style: NarrationStyle, building: &PlannedBuilding) -> Vec<NarrationEntry> {
    if style == NarrationStyle::Summary {
        return Vec::new();
    }

    let architect = model_label(AgentRole::Architect);
    let database = model_label(AgentRole::Database);
    let frontend = model_label(AgentRole::Frontend);

    vec![
        entry(
            architect,
            "All",
            format!(
                "Next: {} ({}). Proposed location: ({}, {}), size: {}x{}x{}",
                building.name,
                building.kind,
                building.position.x,
                building.position.z,
                building.size.width_or_default(),
                building.size.height_or_default(),
                building.size.depth_or_default(),
            ),
        ),
        entry(
            database,
            architect,
            "Checking spatial constraints... Location is clear, no overlaps detected. Proceeding \
             with database entry.",
        ),
        entry(
            frontend,
            "All",
            format!(
                "Preparing 3D model for {}. Color: {}. Will animate construction.",
                building.name,
                building.color_or_default()
            ),
        ),
    ]
}

/// Confirmation after one building is materialized.
pub fn building_confirmation(
    style: NarrationStyle,
    building: &PlannedBuilding,
) -> Vec<NarrationEntry> {
    if style == NarrationStyle::Summary {
        return Vec::new();
    }

    let backend = model_label(AgentRole::Backend);
    let qa = model_label(AgentRole::Qa);

    vec![
        entry(
            backend,
            "All",
            format!(
                "{} created successfully. Database updated, API responding with new building \
                 data.",
                building.name
            ),
        ),
        entry(
            qa,
            "All",
            format!(
                "{} validated. Position correct, no collisions, color contrast acceptable.",
                building.name
            ),
        ),
    ]
}

/// Closing entry for a phase.
pub fn phase_complete(phase: &PlanPhase) -> NarrationEntry {
    entry(
        model_label(AgentRole::Architect),
        "All",
        format!(
            "Phase {} ({}) completed! Moving to next phase.",
            phase.phase, phase.name
        ),
    )
}

/// Entries around the final QA validation.
pub fn qa_kickoff(style: NarrationStyle, total: usize, phases: usize) -> Vec<NarrationEntry> {
    let architect = model_label(AgentRole::Architect);
    let qa = model_label(AgentRole::Qa);

    let mut entries = vec![entry(
        architect,
        qa,
        "All construction phases complete. Please perform final validation and quality check.",
    )];
    if style == NarrationStyle::Full {
        entries.push(entry(
            qa,
            "All",
            format!(
                "Starting comprehensive validation... Checking all {total} buildings across \
                 {phases} phases."
            ),
        ));
    }
    entries
}

/// Closing entries once the sequence is done.
pub fn completion(total: usize, phases: usize) -> Vec<NarrationEntry> {
    let architect = model_label(AgentRole::Architect);
    let qa = model_label(AgentRole::Qa);

    vec![
        entry(
            qa,
            "All",
            format!("Final validation complete! All {total} buildings passed quality checks."),
        ),
        entry(
            architect,
            "System",
            format!(
                "Project completed successfully. {total} buildings constructed across {phases} \
                 phases."
            ),
        ),
    ]
}
