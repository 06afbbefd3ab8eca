// crates/stakex-sim/src/config.rs
//
// Scenario configuration for the Stakex simulator.
// Loaded from a TOML file; every top-level field has a default.
//
// Amounts are decimal token strings ("100", "0.25") so that values beyond
// the TOML integer range stay exact. Accounts are labels ("alice") or
// 0x-prefixed hex addresses; "reserve", "vault", and "engine" name the
// staking reserve, the fee reserve, and the engine itself.

use serde::Deserialize;
use std::fs;

use stakex_economics::DEFAULT_VAULT_LOCK_SECS;

const SECS_PER_DAY: u64 = 86_400;

/// A complete simulation: initial state plus the steps to replay.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Unix time the simulated clock starts at.
    #[serde(default = "default_start_time")]
    pub start_time: u64,

    /// Label of the administrator account.
    #[serde(default = "default_admin")]
    pub admin: String,

    /// Symbol shown next to amounts in reports.
    #[serde(default = "default_token_symbol")]
    pub token_symbol: String,

    /// Seconds the fee reserve stays locked after the scenario starts.
    #[serde(default = "default_vault_lock_secs")]
    pub vault_lock_secs: u64,

    /// Initial balances minted before the first step.
    #[serde(default)]
    pub balances: Vec<BalanceEntry>,

    /// Steps replayed in order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// One initial mint.
#[derive(Debug, Clone, Deserialize)]
pub struct BalanceEntry {
    pub account: String,
    pub amount: String,
}

/// One scenario action. Failing actions are reported and skipped, like a
/// reverted transaction.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    AddPackage {
        /// Defaults to the scenario administrator.
        #[serde(default)]
        caller: Option<String>,
        rate: u64,
        #[serde(default)]
        rate_decimal: u8,
        min_staking: String,
        #[serde(default)]
        lock_days: u64,
        #[serde(default)]
        lock_secs: u64,
    },
    DisablePackage {
        #[serde(default)]
        caller: Option<String>,
        package: u64,
    },
    Fund {
        from: String,
        amount: String,
    },
    Approve {
        account: String,
        amount: String,
    },
    Stake {
        account: String,
        package: u64,
        amount: String,
    },
    Unstake {
        account: String,
        package: u64,
    },
    Transfer {
        from: String,
        to: String,
        amount: String,
    },
    VaultWithdraw {
        #[serde(default)]
        caller: Option<String>,
        to: String,
        amount: String,
    },
    Advance {
        #[serde(default)]
        days: u64,
        #[serde(default)]
        secs: u64,
    },
}

impl Step {
    /// Short action name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Step::AddPackage { .. } => "add_package",
            Step::DisablePackage { .. } => "disable_package",
            Step::Fund { .. } => "fund",
            Step::Approve { .. } => "approve",
            Step::Stake { .. } => "stake",
            Step::Unstake { .. } => "unstake",
            Step::Transfer { .. } => "transfer",
            Step::VaultWithdraw { .. } => "vault_withdraw",
            Step::Advance { .. } => "advance",
        }
    }
}

/// `days` whole days plus `secs` seconds.
pub fn span_secs(days: u64, secs: u64) -> u64 {
    days.saturating_mul(SECS_PER_DAY).saturating_add(secs)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_start_time() -> u64 {
    // 2024-01-01T00:00:00Z
    1_704_067_200
}

fn default_admin() -> String {
    "admin".to_string()
}

fn default_token_symbol() -> String {
    "GOLD".to_string()
}

fn default_vault_lock_secs() -> u64 {
    DEFAULT_VAULT_LOCK_SECS
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            start_time: default_start_time(),
            admin: default_admin(),
            token_symbol: default_token_symbol(),
            vault_lock_secs: default_vault_lock_secs(),
            balances: Vec::new(),
            steps: Vec::new(),
        }
    }
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse a scenario from TOML text.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: ScenarioConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = ScenarioConfig::parse("").unwrap();
        assert_eq!(config.admin, "admin");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.vault_lock_secs, DEFAULT_VAULT_LOCK_SECS);
        assert!(config.steps.is_empty());
    }

    #[test]
    fn test_parse_steps() {
        let config = ScenarioConfig::parse(
            r#"
            start_time = 1000
            token_symbol = "TST"

            [[balances]]
            account = "alice"
            amount = "200"

            [[steps]]
            action = "add_package"
            rate = 10
            min_staking = "100"
            lock_days = 360

            [[steps]]
            action = "stake"
            account = "alice"
            package = 1
            amount = "100"

            [[steps]]
            action = "advance"
            days = 180
            "#,
        )
        .unwrap();

        assert_eq!(config.start_time, 1000);
        assert_eq!(config.token_symbol, "TST");
        assert_eq!(config.balances.len(), 1);
        assert_eq!(config.steps.len(), 3);
        match &config.steps[0] {
            Step::AddPackage {
                caller,
                rate,
                rate_decimal,
                lock_days,
                lock_secs,
                ..
            } => {
                assert!(caller.is_none());
                assert_eq!(*rate, 10);
                assert_eq!(*rate_decimal, 0);
                assert_eq!(span_secs(*lock_days, *lock_secs), 360 * SECS_PER_DAY);
            }
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(config.steps[1].name(), "stake");
        assert!(matches!(config.steps[2], Step::Advance { days: 180, secs: 0 }));
    }

    #[test]
    fn test_unknown_action_rejected() {
        let result = ScenarioConfig::parse(
            r#"
            [[steps]]
            action = "mint_everything"
            "#,
        );
        assert!(result.is_err());
    }
}
