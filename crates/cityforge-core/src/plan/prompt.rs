//! Prompt construction for the generative backend.
//!
//! The architect prompt embeds the exact structural and spatial rules from
//! the plan schema, so the numbers here and in [`super::schema`] /
//! [`super::spatial`] must stay in lockstep. Pure string assembly, no I/O.

use super::schema::{PHASE_LAYOUT, TOTAL_PLANNED_BUILDINGS};
use super::types::CityPlan;

/// System message for the architect request.
pub const ARCHITECT_SYSTEM: &str =
    "You are an expert city architect. Always respond with valid JSON only.";

/// System message for the final QA request.
pub const QA_SYSTEM: &str =
    "You are a senior QA engineer. Provide detailed but concise validation reports.";

/// System message for the debate-summary request.
pub const SUMMARY_SYSTEM: &str =
    "You are an expert at analyzing technical discussions. Always respond with valid JSON only.";

/// Example JSON embedded in the architect prompt.
const PLAN_SHAPE_EXAMPLE: &str = r##"{
  "analysis": "Brief analysis of the request and overall strategy",
  "phases": [
    {
      "phase": 1,
      "name": "Public Infrastructure",
      "buildings": [
        {
          "name": "Main Avenue",
          "type": "park",
          "position": {"x": 0, "y": 0, "z": 0},
          "size": {"width": 30, "height": 0.3, "depth": 4},
          "color": "#555555"
        },
        {
          "name": "Central Park",
          "type": "park",
          "position": {"x": 0, "y": 0, "z": 10},
          "size": {"width": 12, "height": 0.5, "depth": 12},
          "color": "#2d5016"
        }
      ]
    },
    {
      "phase": 2,
      "name": "Commercial District",
      "buildings": [
        {
          "name": "Shopping Mall",
          "type": "commercial",
          "position": {"x": -10, "y": 0, "z": -8},
          "size": {"width": 8, "height": 6, "depth": 8},
          "color": "#dc2626"
        }
      ]
    }
  ]
}"##;

/// Build the architect prompt for a user request.
///
/// Embeds the request verbatim plus the exact-count schema and the spatial
/// distribution rules.
pub fn build_architect_prompt(user_prompt: &str) -> String {
    let mut prompt = String::with_capacity(4096);

    prompt.push_str(&format!(
        "You are a city architect. Create a detailed city plan for: \"{user_prompt}\"\n\n"
    ));
    prompt.push_str(&format!(
        "Create a JSON plan with this EXACT structure (EXACTLY {TOTAL_PLANNED_BUILDINGS} buildings total across {} phases):\n\n",
        PHASE_LAYOUT.len()
    ));
    prompt.push_str(PLAN_SHAPE_EXAMPLE);
    prompt.push_str("\n\nCRITICAL REQUIREMENTS:\n");
    prompt.push_str(&format!(
        "- MUST CREATE EXACTLY {TOTAL_PLANNED_BUILDINGS} BUILDINGS TOTAL (including infrastructure)\n"
    ));
    prompt.push_str("- Phase 1 (Infrastructure): EXACTLY 10 items (roads, parks, utilities, plazas, gardens)\n");
    prompt.push_str("- Phase 2 (Commercial): EXACTLY 12 buildings (shops, restaurants, malls, markets, stores)\n");
    prompt.push_str("- Phase 3 (Residential): EXACTLY 12 buildings (apartments, houses, condos, towers)\n");
    prompt.push_str("- Phase 4 (Office): EXACTLY 10 buildings (office towers, business centers, corporate buildings)\n");
    prompt.push_str("- Phase 5 (Public Facilities): EXACTLY 6 buildings (schools, hospitals, libraries, community centers, stadiums)\n");
    prompt.push_str("- COUNT CAREFULLY: 10 + 12 + 12 + 10 + 6 = 50 buildings EXACTLY\n");
    prompt.push_str("- Building type must be one of: office, park, residential, commercial\n");
    prompt.push_str("\nSPATIAL DISTRIBUTION RULES (CRITICAL):\n");
    prompt.push_str("- MUST USE FULL GRID: x from -30 to +30, z from -30 to +30\n");
    prompt.push_str("- AVOID CENTER CLUSTERING: Maximum 8 buildings in center zone (x: -10 to 10, z: -10 to 10)\n");
    prompt.push_str("- REQUIRE EDGE PLACEMENT: At least 15 buildings must have |x| > 15 OR |z| > 15\n");
    prompt.push_str("- REQUIRE CORNER USAGE: At least 8 buildings in corners (|x| > 20 AND |z| > 20)\n");
    prompt.push_str("- SPREAD EVENLY: Divide grid into 4 quadrants, each must have 10-15 buildings\n");
    prompt.push_str("- Minimum spacing: 4 units between buildings\n");
    prompt.push_str("- Heights: infrastructure 0.3-1, commercial 5-10, residential 10-18, office 15-25, facilities 8-12\n");
    prompt.push_str("\nEXAMPLE GOOD POSITIONS: (-28, 0, 25), (22, 0, -27), (-15, 0, 28), (29, 0, -18), etc.\n");
    prompt.push_str("EXAMPLE BAD POSITIONS (avoid): (0, 0, 0), (5, 0, 3), (-8, 0, 7), (2, 0, -5), etc.");

    prompt
}

/// Build the final validation prompt, enumerating per-phase totals of the
/// plan that was actually executed.
pub fn build_qa_prompt(plan: &CityPlan) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("Perform final validation for this city project:\n\n");
    prompt.push_str("Project Summary:\n");
    prompt.push_str(&format!("- Total Buildings: {}\n", plan.total_buildings()));
    prompt.push_str(&format!("- Construction Phases: {}\n", plan.phases.len()));
    for phase in &plan.phases {
        prompt.push_str(&format!(
            "- Phase {} ({}): {} buildings\n",
            phase.phase,
            phase.name,
            phase.buildings.len()
        ));
    }
    prompt.push_str("\nValidation Checklist:\n");
    prompt.push_str("1. All buildings created successfully\n");
    prompt.push_str("2. No spatial overlaps or collisions\n");
    prompt.push_str("3. Proper phase sequencing (infrastructure -> commercial -> residential -> office -> facilities)\n");
    prompt.push_str("4. Database integrity maintained\n");
    prompt.push_str("5. Layout uses the full grid without center clustering\n");
    prompt.push_str("\nProvide a brief validation report with pass/fail status.");

    prompt
}

/// Build the debate-summary prompt over concatenated narration lines.
pub fn build_summary_prompt(debate_text: &str) -> String {
    format!(
        "Analyze this AI team debate and provide a structured summary:\n\n\
         {debate_text}\n\n\
         Provide a JSON response with this structure:\n\
         {{\n\
         \x20 \"keyArguments\": [{{\"llm\": \"LLM name\", \"argument\": \"main point\"}}],\n\
         \x20 \"agreements\": [\"point of agreement\"],\n\
         \x20 \"disagreements\": [\"point of discussion or debate\"],\n\
         \x20 \"conclusion\": \"final consensus reached by the team\"\n\
         }}\n\n\
         Focus on technical decisions, architecture choices, and implementation strategies."
    )
}
