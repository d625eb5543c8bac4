//! Static role labeling.
//!
//! Each role carries one fixed model display label. This is a naming
//! convention for tasks and narration, not a dispatch mechanism: every
//! completion goes through the same backend client.

use cityforge_db::models::AgentRole;

/// The role order the executor walks through a build sequence.
pub const STEP_ORDER: [AgentRole; 5] = [
    AgentRole::Architect,
    AgentRole::Database,
    AgentRole::Backend,
    AgentRole::Frontend,
    AgentRole::Qa,
];

/// Display label of the model assigned to a role.
pub fn model_label(role: AgentRole) -> &'static str {
    match role {
        AgentRole::Architect => "GPT-4 (Architect)",
        AgentRole::Database => "Llama (Database)",
        AgentRole::Backend => "Gemini (Backend)",
        AgentRole::Frontend => "Claude (Frontend)",
        AgentRole::Qa => "Mistral (QA)",
    }
}
