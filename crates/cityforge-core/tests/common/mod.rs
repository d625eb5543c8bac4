//! Shared helpers for core integration tests: scripted completion clients
//! and a schema-conforming plan payload.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use cityforge_core::llm::{ChatMessage, CompletionClient, LlmError};
use cityforge_core::plan::types::{CityPlan, PlanPhase, PlannedBuilding};
use cityforge_core::plan::PHASE_LAYOUT;
use cityforge_db::models::StructureKind;

/// Completion client that replays a fixed list of responses and counts
/// calls. Exhausting the script is an error, so tests catch unexpected
/// extra round trips.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<String>>,
    calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new<S: Into<String>>(responses: impl IntoIterator<Item = S>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionClient for ScriptedClient {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmError::InvalidResponse("script exhausted".to_string()))
    }
}

/// Build a plan that satisfies the exact 10/12/12/10/6 schema, with
/// per-phase kinds and spread-out positions.
pub fn conforming_plan() -> CityPlan {
    let kinds = [
        StructureKind::Park,
        StructureKind::Commercial,
        StructureKind::Residential,
        StructureKind::Office,
        StructureKind::Commercial,
    ];

    let phases = PHASE_LAYOUT
        .iter()
        .enumerate()
        .map(|(index, (name, count))| PlanPhase {
            phase: (index + 1) as u32,
            name: name.to_string(),
            buildings: (0..*count)
                .map(|i| {
                    let x = -28.0 + ((index * 13 + i * 7) % 57) as f64;
                    let z = -28.0 + ((index * 19 + i * 11) % 57) as f64;
                    PlannedBuilding::new(
                        &format!("{name} {}", i + 1),
                        kinds[index],
                        (x, 0.0, z),
                        (4.0, 6.0 + i as f64, 4.0),
                        "#3b82f6",
                    )
                })
                .collect(),
        })
        .collect();

    CityPlan {
        analysis: "Balanced test city across all phases".to_string(),
        phases,
    }
}

/// The conforming plan wrapped the way a model would return it.
pub fn conforming_plan_response() -> String {
    format!(
        "Here is the full plan:\n```json\n{}\n```",
        serde_json::to_string_pretty(&conforming_plan()).unwrap()
    )
}

/// Flattened building names of a plan, in phase-then-entity order.
pub fn plan_order_names(plan: &CityPlan) -> Vec<String> {
    plan.phases
        .iter()
        .flat_map(|p| p.buildings.iter().map(|b| b.name.clone()))
        .collect()
}
