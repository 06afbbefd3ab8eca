// crates/stakex-sim/src/output.rs
//
// Output formatting for the Stakex simulator.
// Supports table and JSON output modes.

use clap::ValueEnum;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::scenario::{BalanceSnapshot, PositionSnapshot, ScenarioReport, StepOutcome};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed tables (default).
    Table,
    /// JSON for machine consumption.
    Json,
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Time")]
    at: u64,
    #[tabled(rename = "Result")]
    result: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&StepOutcome> for StepRow {
    fn from(o: &StepOutcome) -> Self {
        Self {
            index: o.index,
            action: o.action.clone(),
            at: o.at,
            result: if o.applied { "ok" } else { "reverted" },
            detail: o.detail.clone(),
        }
    }
}

#[derive(Tabled)]
struct BalanceRow {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

impl From<&BalanceSnapshot> for BalanceRow {
    fn from(b: &BalanceSnapshot) -> Self {
        Self {
            account: b.account.clone(),
            balance: b.balance.clone(),
        }
    }
}

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Package")]
    package_id: u64,
    #[tabled(rename = "Staked")]
    amount: String,
    #[tabled(rename = "Banked")]
    total_profit: String,
    #[tabled(rename = "Pending")]
    pending_profit: String,
    #[tabled(rename = "Unlocks")]
    time_point: u64,
}

impl From<&PositionSnapshot> for PositionRow {
    fn from(p: &PositionSnapshot) -> Self {
        Self {
            account: p.account.clone(),
            package_id: p.package_id,
            amount: p.amount.clone(),
            total_profit: p.total_profit.clone(),
            pending_profit: p.pending_profit.clone(),
            time_point: p.time_point,
        }
    }
}

/// Render a full scenario report.
pub fn render_report(report: &ScenarioReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => format_json(report),
        OutputFormat::Table => {
            let steps: Vec<StepRow> = report.outcomes.iter().map(StepRow::from).collect();
            let balances: Vec<BalanceRow> = report.balances.iter().map(BalanceRow::from).collect();

            let mut out = String::new();
            out.push_str("Steps\n");
            out.push_str(&format_table(&steps));
            out.push_str(&format!(
                "\n\n{} applied, {} reverted\n\nBalances ({})\n",
                report.outcomes.len() - report.reverted(),
                report.reverted(),
                report.token_symbol
            ));
            out.push_str(&format_table(&balances));
            if report.positions.is_empty() {
                out.push_str("\n\nNo open positions\n");
            } else {
                let positions: Vec<PositionRow> =
                    report.positions.iter().map(PositionRow::from).collect();
                out.push_str("\n\nOpen positions\n");
                out.push_str(&format_table(&positions));
                out.push('\n');
            }
            out.push_str(&format!(
                "\nStaking reserve: {} {}\nFee reserve:     {} {}\n",
                report.reserve_balance, report.token_symbol, report.vault_balance, report.token_symbol
            ));
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ScenarioReport {
        ScenarioReport {
            token_symbol: "GOLD".to_string(),
            outcomes: vec![
                StepOutcome {
                    index: 1,
                    action: "stake".to_string(),
                    at: 10,
                    applied: true,
                    detail: "alice staked".to_string(),
                    event: None,
                },
                StepOutcome {
                    index: 2,
                    action: "unstake".to_string(),
                    at: 10,
                    applied: false,
                    detail: "Still locked".to_string(),
                    event: None,
                },
            ],
            balances: vec![BalanceSnapshot {
                account: "alice".to_string(),
                balance: "100".to_string(),
            }],
            positions: vec![],
            reserve_balance: "975".to_string(),
            vault_balance: "0".to_string(),
        }
    }

    #[test]
    fn test_table_report_sections() {
        let out = render_report(&report(), OutputFormat::Table);
        assert!(out.contains("reverted"));
        assert!(out.contains("1 applied, 1 reverted"));
        assert!(out.contains("alice"));
        assert!(out.contains("No open positions"));
        assert!(out.contains("Staking reserve: 975 GOLD"));
    }

    #[test]
    fn test_position_table_shows_unlock_time() {
        let mut report = report();
        report.positions.push(PositionSnapshot {
            account: "alice".to_string(),
            package_id: 1,
            amount: "100".to_string(),
            total_profit: "0".to_string(),
            pending_profit: "5".to_string(),
            start_time: 1_000,
            time_point: 31_105_000,
        });
        let out = render_report(&report, OutputFormat::Table);
        assert!(out.contains("Open positions"));
        assert!(out.contains("Unlocks"));
        assert!(out.contains("31105000"));
    }

    #[test]
    fn test_json_report_parses() {
        let out = render_report(&report(), OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["outcomes"][1]["applied"], false);
        assert_eq!(value["reserve_balance"], "975");
        // Outcomes without an event omit the field
        assert!(value["outcomes"][0].get("event").is_none());
    }
}
