// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Productive-broker classification over the productivity CSV.
//!
//! A broker counts as productive when new/add-on business meets the agreed
//! target and also reaches 20% of the prior-year portfolio.

use std::path::Path;

use maklerd_core::MaklerError;
use serde::{Deserialize, Serialize};

/// Share of the prior-year portfolio new business must reach.
const PORTFOLIO_SHARE: f64 = 0.20;

/// One row of the productivity CSV. Amount cells may carry currency
/// formatting, so they are read as strings and cleaned afterwards.
#[derive(Debug, Deserialize)]
struct ProductivityRow {
    #[serde(rename = "Account Name")]
    account_name: String,
    #[serde(rename = "Vorjahr, Bestand gesamt")]
    prior_year_portfolio: String,
    #[serde(rename = "Soll")]
    target: String,
    #[serde(rename = "Ist, Neu-/Mehrgeschäft")]
    new_business: String,
}

/// Classification result for one broker.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerProductivity {
    pub account_name: String,
    pub prior_year_portfolio: f64,
    pub target: f64,
    pub new_business: f64,
    /// New business reached the agreed target.
    pub meets_target: bool,
    /// New business reached 20% of the prior-year portfolio.
    pub meets_portfolio_share: bool,
    pub productive: bool,
}

/// Parses a formatted amount cell ("25000 €", "1,250", "82%") into a number.
///
/// Currency and percent symbols and thousands separators are stripped.
/// Unparseable cells count as 0.0 so a single bad cell cannot abort the
/// whole classification.
pub fn parse_amount(value: &str) -> f64 {
    let cleaned: String = value
        .chars()
        .filter(|c| !matches!(c, '€' | '%' | ',' | ' '))
        .collect();
    cleaned.trim().parse().unwrap_or(0.0)
}

/// Classifies every broker in the productivity CSV.
pub fn productive_brokers(path: &Path) -> Result<Vec<BrokerProductivity>, MaklerError> {
    let mut reader = csv::Reader::from_path(path).map_err(|e| MaklerError::Data {
        message: format!("failed to open {}: {e}", path.display()),
        source: Some(Box::new(e)),
    })?;

    let mut brokers = Vec::new();
    for row in reader.deserialize::<ProductivityRow>() {
        let row = row.map_err(|e| MaklerError::Data {
            message: format!("malformed row in {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;
        let prior_year_portfolio = parse_amount(&row.prior_year_portfolio);
        let target = parse_amount(&row.target);
        let new_business = parse_amount(&row.new_business);

        let meets_target = new_business >= target;
        let meets_portfolio_share = new_business >= PORTFOLIO_SHARE * prior_year_portfolio;
        brokers.push(BrokerProductivity {
            account_name: row.account_name,
            prior_year_portfolio,
            target,
            new_business,
            meets_target,
            meets_portfolio_share,
            productive: meets_target && meets_portfolio_share,
        });
    }
    Ok(brokers)
}
