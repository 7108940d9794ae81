// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Function-tool definitions advertised to the hosted assistant.

use maklerd_assistant::{FunctionDefinition, Tool};
use serde_json::json;

/// Tool name constants, shared between definitions and dispatch.
pub mod names {
    pub const TEAM_ANALYZE: &str = "team_analyze";
    pub const TARGET_ANALYZE: &str = "target_analyze";
    pub const TARGET_GAP: &str = "target_gap";
    pub const CREATE_APPOINTMENT_TASK: &str = "create_appointment_task";
    pub const CREATE_APPOINTMENT: &str = "create_appointment";
    pub const PRODUCTIVE_BROKER_ANALYZE: &str = "productive_broker_analyze";
}

/// All function tools the assistant may call, plus hosted file search.
pub fn assistant_tools() -> Vec<Tool> {
    let mut tools = function_tools();
    tools.push(Tool::FileSearch);
    tools
}

/// The six locally-serviced function tools.
pub fn function_tools() -> Vec<Tool> {
    vec![
        Tool::Function {
            function: FunctionDefinition {
                name: names::TARGET_ANALYZE.into(),
                description: "Give an overview to the account manager on the status of \
                              achieving his targets (Zielerreichung)."
                    .into(),
                parameters: Some(json!({
                    "type": "object",
                    "properties": {
                        "BrokerID": {
                            "type": "string",
                            "description": "The unique identifier of the broker, e.g., 815"
                        }
                    },
                    "required": ["BrokerID"]
                })),
            },
        },
        Tool::Function {
            function: FunctionDefinition {
                name: names::TARGET_GAP.into(),
                description: "Make suggestions on how to reach the personal targets \
                              (persönliche Ziele) of the account manager."
                    .into(),
                parameters: None,
            },
        },
        Tool::Function {
            function: FunctionDefinition {
                name: names::TEAM_ANALYZE.into(),
                description: "Get the current performance of the team and evaluate each \
                              member's statistics."
                    .into(),
                parameters: Some(json!({
                    "type": "object",
                    "properties": {
                        "TeamID": {
                            "type": "string",
                            "description": "The unique identifier of the team, e.g., TE12345"
                        }
                    },
                    "required": ["TeamID"]
                })),
            },
        },
        Tool::Function {
            function: FunctionDefinition {
                name: names::CREATE_APPOINTMENT_TASK.into(),
                description: "Searches a free appointment time in the calendar for a broker \
                              meeting (Maklergespräch)."
                    .into(),
                parameters: Some(json!({
                    "type": "object",
                    "properties": {
                        "brokerID": {
                            "type": "string",
                            "description": "The unique identifier of the broker, e.g., BR12345"
                        }
                    },
                    "required": ["brokerID"]
                })),
            },
        },
        Tool::Function {
            function: FunctionDefinition {
                name: names::PRODUCTIVE_BROKER_ANALYZE.into(),
                description: "Get an overview of the brokers who can currently be labeled \
                              as productive according to target definition."
                    .into(),
                parameters: None,
            },
        },
        Tool::Function {
            function: FunctionDefinition {
                name: names::CREATE_APPOINTMENT.into(),
                description: "Create an appointment for a broker meeting (Maklergespräch)."
                    .into(),
                parameters: Some(json!({
                    "type": "object",
                    "properties": {
                        "freeslot": {
                            "type": "string",
                            "description": "A time slot when the broker is available."
                        }
                    },
                    "required": ["freeslot"]
                })),
            },
        },
    ]
}
