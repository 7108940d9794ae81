// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Target/actual performance report for a single broker.
//!
//! Reads the performance CSV, filters to the requested broker, and sums
//! target and KPI columns per (division, product) pair in first-seen order.

use std::path::Path;

use maklerd_core::MaklerError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One row of the performance CSV.
#[derive(Debug, Deserialize)]
struct ReportRow {
    #[serde(rename = "BrokerID")]
    broker_id: i64,
    #[serde(rename = "Sparte")]
    division: String,
    #[serde(rename = "Produkt")]
    product: String,
    #[serde(rename = "Target_1")]
    target_1: f64,
    #[serde(rename = "Target_2")]
    target_2: f64,
    #[serde(rename = "Target_3")]
    target_3: f64,
    #[serde(rename = "KPI_1")]
    kpi_1: f64,
    #[serde(rename = "KPI_2")]
    kpi_2: f64,
    #[serde(rename = "KPI_3")]
    kpi_3: f64,
}

/// Summed target columns for one (division, product) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Targets {
    pub target_1: f64,
    pub target_2: f64,
    pub target_3: f64,
}

/// Summed KPI columns for one (division, product) pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Achievements {
    pub kpi_1: f64,
    pub kpi_2: f64,
    pub kpi_3: f64,
}

/// Aggregated performance of one broker within one (division, product) pair.
#[derive(Debug, Clone, Serialize)]
pub struct PerformanceRecord {
    pub division: String,
    pub product: String,
    pub targets: Targets,
    pub achievements: Achievements,
}

/// Result of a target/actual report lookup.
#[derive(Debug)]
pub enum ReportOutcome {
    /// One record per (division, product) pair, first-seen order.
    Report(Vec<PerformanceRecord>),
    /// The CSV holds no rows for this broker.
    NotFound { broker_id: i64 },
}

/// Builds the target/actual report for one broker.
///
/// The broker id must parse as an integer; anything else is invalid input.
/// A missing file, missing column, or malformed cell is a data error.
pub fn target_actual_report(
    broker_id: &str,
    path: &Path,
) -> Result<ReportOutcome, MaklerError> {
    let broker_id: i64 = broker_id.trim().parse().map_err(|_| {
        MaklerError::InvalidInput(format!("broker id must be numeric, got {broker_id:?}"))
    })?;

    let mut reader = csv::Reader::from_path(path).map_err(|e| MaklerError::Data {
        message: format!("failed to open {}: {e}", path.display()),
        source: Some(Box::new(e)),
    })?;

    let mut records: Vec<PerformanceRecord> = Vec::new();
    for row in reader.deserialize::<ReportRow>() {
        let row = row.map_err(|e| MaklerError::Data {
            message: format!("malformed row in {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        if row.broker_id != broker_id {
            continue;
        }

        let idx = match records
            .iter()
            .position(|r| r.division == row.division && r.product == row.product)
        {
            Some(idx) => idx,
            None => {
                records.push(PerformanceRecord {
                    division: row.division.clone(),
                    product: row.product.clone(),
                    targets: Targets::default(),
                    achievements: Achievements::default(),
                });
                records.len() - 1
            }
        };
        let record = &mut records[idx];
        record.targets.target_1 += row.target_1;
        record.targets.target_2 += row.target_2;
        record.targets.target_3 += row.target_3;
        record.achievements.kpi_1 += row.kpi_1;
        record.achievements.kpi_2 += row.kpi_2;
        record.achievements.kpi_3 += row.kpi_3;
    }

    if records.is_empty() {
        debug!(broker_id, "no performance rows for broker");
        return Ok(ReportOutcome::NotFound { broker_id });
    }
    Ok(ReportOutcome::Report(records))
}
