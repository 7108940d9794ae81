// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV-backed broker analytics: target/actual aggregation and
//! productive-broker classification.

pub mod productive;
pub mod report;

pub use productive::{parse_amount, productive_brokers, BrokerProductivity};
pub use report::{target_actual_report, Achievements, PerformanceRecord, ReportOutcome, Targets};
