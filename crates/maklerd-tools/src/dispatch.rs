// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local servicing of assistant tool calls.
//!
//! One match over the tool name replaces per-call-site branching; every tool
//! call receives an output, since a paused run cannot resume otherwise.
//! Failures are rendered into the output text for the model to relay.

use std::path::PathBuf;

use maklerd_analytics::{productive_brokers, target_actual_report, ReportOutcome};
use maklerd_core::{ToolCall, ToolOutput};
use tracing::{info, warn};

use crate::definitions::names;

/// German definition of a productive broker, prefixed to the classification
/// listing so the model applies the agreed criteria.
const PRODUCTIVE_DEFINITION: &str = "produktive Makler (individuell entsprechend des \
     Maklerportfolios festgesetzt); grds. produktiv, wenn Neu-/Mehrgeschäft das Soll erreicht \
     und i.H.v. 20% des Bestandes liegt (min. aber 25.000€). Hier hast du eine Liste mit den \
     aktuellen Zahlen, bitte analysiere sie noch nach der Definition der produktiven Makler.";

/// Services tool calls against local data files and calendar mocks.
#[derive(Debug, Clone)]
pub struct ToolDispatcher {
    performance_csv: PathBuf,
    productivity_csv: PathBuf,
}

impl ToolDispatcher {
    pub fn new(performance_csv: PathBuf, productivity_csv: PathBuf) -> Self {
        Self {
            performance_csv,
            productivity_csv,
        }
    }

    /// Services one tool call. Always yields an output for the call id;
    /// handler failures become descriptive output text.
    pub fn dispatch(&self, call: &ToolCall) -> ToolOutput {
        info!(tool = %call.name, call_id = %call.id, "servicing tool call");
        let output = match call.name.as_str() {
            names::TEAM_ANALYZE => format!(
                "Aktuelle Team Performancedaten: {}",
                mock_team_performance()
            ),
            names::CREATE_APPOINTMENT => {
                "Kalendernachricht: Termin wurde im Kalender hinterlegt.".to_string()
            }
            names::CREATE_APPOINTMENT_TASK => format!(
                "Es gibt Mögliche freie Termine am : {}",
                mock_free_slots()
            ),
            names::TARGET_ANALYZE => self.target_analyze(call),
            names::TARGET_GAP => format!(
                "Ich habe Dein Maklerportfolio analysiert und Zielkorrelationen \
                 berücksichtigt um deine persönlichen Ziele effizient zu erreichen.: {}",
                mock_team_performance()
            ),
            names::PRODUCTIVE_BROKER_ANALYZE => self.productive_broker_analyze(),
            unknown => {
                warn!(tool = unknown, "unknown tool call name");
                format!("Unbekanntes Werkzeug: {unknown}. Keine Daten verfügbar.")
            }
        };
        ToolOutput {
            tool_call_id: call.id.clone(),
            output,
        }
    }

    /// Services all tool calls of a paused run, preserving call order.
    pub fn dispatch_all(&self, calls: &[ToolCall]) -> Vec<ToolOutput> {
        calls.iter().map(|call| self.dispatch(call)).collect()
    }

    fn target_analyze(&self, call: &ToolCall) -> String {
        let Some(broker_id) = call.arguments.get("BrokerID").and_then(|v| v.as_str()) else {
            return "Es wurde keine Maklernummer (BrokerID) übergeben.".to_string();
        };
        match target_actual_report(broker_id, &self.performance_csv) {
            Ok(ReportOutcome::Report(records)) => match serde_json::to_string(&records) {
                Ok(json) => {
                    format!("Im Folgenden findest Du eine aktuelle Auflistung: {json}")
                }
                Err(e) => {
                    warn!(error = %e, "failed to render performance report");
                    "Die Auswertung konnte nicht aufbereitet werden.".to_string()
                }
            },
            Ok(ReportOutcome::NotFound { broker_id }) => {
                format!("No data found for broker number: {broker_id}")
            }
            Err(e) => {
                warn!(error = %e, "target/actual report failed");
                format!("Die Zielerreichung konnte nicht ermittelt werden: {e}")
            }
        }
    }

    fn productive_broker_analyze(&self) -> String {
        match productive_brokers(&self.productivity_csv) {
            Ok(brokers) => match serde_json::to_string(&brokers) {
                Ok(json) => format!("{PRODUCTIVE_DEFINITION} : {json}"),
                Err(e) => {
                    warn!(error = %e, "failed to render productivity listing");
                    "Die Produktivitätsliste konnte nicht aufbereitet werden.".to_string()
                }
            },
            Err(e) => {
                warn!(error = %e, "productive-broker classification failed");
                format!("Die produktiven Makler konnten nicht ermittelt werden: {e}")
            }
        }
    }
}

fn mock_team_performance() -> &'static str {
    "Max Mustermann hat eine Performance = 65%, Dieter Hans hat eine Performance = 82%, \
     Ulrich Mark hat eine Performance = 85% "
}

fn mock_free_slots() -> &'static str {
    "05.10. 14:15 ; 07.10 16:35"
}
