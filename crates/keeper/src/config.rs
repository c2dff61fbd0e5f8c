use std::fs;

use nextcopper_core::constants::{
    GENESIS_BASELINE_PRICE, GENESIS_BASELINE_QUANTITY, GENESIS_BLOCK_REWARD_RATE, GENESIS_TOTAL_SUPPLY,
    REFERENCE_PERIOD_LENGTH, REFERENCE_REQUEST_BLOCK_LIMIT, REFERENCE_REQUEST_PERIOD_LIMIT,
};
use nextcopper_core::{
    AccountId, ElasticityPolicy, Fixed12, GenesisParams, PriceDirectionPolicy, RebasePolicy, WindowRule,
};
use serde::{Deserialize, Serialize};

use crate::error::{KeeperError, KeeperResult};

/// Keeper configuration loaded from TOML file
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct KeeperConfig {
    /// Delay between keeper ticks in milliseconds
    pub poll_interval_ms: u64,

    /// Where the JSON state snapshot is kept
    pub state_path: String,

    /// Rebase engine parameters
    pub engine: EngineConfig,

    /// Genesis baseline and allocations
    pub genesis: GenesisConfig,

    /// Block clock parameters
    pub clock: ClockConfig,

    /// Scheduled oracle parameters
    pub oracle: OracleConfig,
}

/// Which rebase policy the engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    #[default]
    Elasticity,
    PriceDirection,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Blocks per rebase period
    pub period_length: u64,

    /// Minimum blocks between oracle requests
    pub block_count_limit: u64,

    /// Minimum seconds between oracle requests
    pub request_period_limit: i64,

    /// How the two request windows combine
    #[serde(default)]
    pub window_rule: WindowRule,

    #[serde(default)]
    pub policy: PolicyKind,

    /// Supply step in basis points (elasticity policy only)
    pub supply_step_bps: u32,

    /// Reward rate step in basis points (elasticity policy only)
    pub reward_step_bps: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenesisConfig {
    #[serde(with = "fixed12_serde")]
    pub baseline_quantity: Fixed12,

    #[serde(with = "fixed12_serde")]
    pub baseline_price: Fixed12,

    #[serde(with = "fixed12_serde")]
    pub block_reward_rate: Fixed12,

    pub allocations: Vec<AllocationConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AllocationConfig {
    pub account: String,

    #[serde(with = "fixed12_serde")]
    pub balance: Fixed12,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClockConfig {
    /// Milliseconds per block
    pub block_time_ms: u64,

    /// Unix time of block 0; the keeper start time when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genesis_time: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct OracleConfig {
    /// Delay between receiving a request and delivering data
    #[serde(default)]
    pub delivery_delay_ms: u64,

    /// Observations handed out in order, cycling
    pub schedule: Vec<ObservationConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ObservationConfig {
    #[serde(with = "fixed12_serde")]
    pub quantity: Fixed12,

    #[serde(with = "fixed12_serde")]
    pub price: Fixed12,
}

impl KeeperConfig {
    /// Load configuration from TOML file
    pub fn load(path: &str) -> KeeperResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| KeeperError::InvalidConfig(format!("Failed to read config file {}: {}", path, e)))?;

        let config: KeeperConfig = toml::from_str(&content)
            .map_err(|e| KeeperError::InvalidConfig(format!("Failed to parse config file {}: {}", path, e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn save(&self, path: &str) -> KeeperResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> KeeperResult<()> {
        if self.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "0", "greater than 0"));
        }

        if self.state_path.trim().is_empty() {
            return Err(invalid("state_path", "empty", "a file path"));
        }

        self.engine.validate()?;
        self.genesis.validate()?;

        if self.clock.block_time_ms == 0 {
            return Err(invalid("clock.block_time_ms", "0", "greater than 0"));
        }

        if self.oracle.schedule.is_empty() {
            return Err(invalid("oracle.schedule", "empty", "at least one observation"));
        }

        Ok(())
    }

    pub fn to_genesis_params(&self) -> GenesisParams {
        GenesisParams {
            period_length: self.engine.period_length,
            baseline_quantity: self.genesis.baseline_quantity,
            baseline_price: self.genesis.baseline_price,
            block_reward_rate: self.genesis.block_reward_rate,
            block_count_limit: self.engine.block_count_limit,
            request_period_limit: self.engine.request_period_limit,
            window_rule: self.engine.window_rule,
            allocations: self
                .genesis
                .allocations
                .iter()
                .map(|a| (AccountId::new(a.account.clone()), a.balance))
                .collect(),
        }
    }

    pub fn build_policy(&self) -> KeeperResult<Box<dyn RebasePolicy>> {
        Ok(match self.engine.policy {
            PolicyKind::Elasticity => Box::new(ElasticityPolicy::new(
                self.engine.supply_step_bps,
                self.engine.reward_step_bps,
            )?),
            PolicyKind::PriceDirection => Box::new(PriceDirectionPolicy),
        })
    }

    /// `(quantity, price)` pairs in delivery order
    pub fn schedule(&self) -> Vec<(Fixed12, Fixed12)> {
        self.oracle.schedule.iter().map(|o| (o.quantity, o.price)).collect()
    }
}

impl EngineConfig {
    fn validate(&self) -> KeeperResult<()> {
        if self.period_length == 0 {
            return Err(invalid("engine.period_length", "0", "greater than 0"));
        }

        // A block window as long as the period allows one request per period at most
        if self.block_count_limit >= self.period_length {
            return Err(invalid(
                "engine.block_count_limit",
                &self.block_count_limit.to_string(),
                &format!("less than period_length ({})", self.period_length),
            ));
        }

        if self.request_period_limit < 0 {
            return Err(invalid(
                "engine.request_period_limit",
                &self.request_period_limit.to_string(),
                "at least 0",
            ));
        }

        if self.reward_step_bps > 10_000 {
            return Err(invalid(
                "engine.reward_step_bps",
                &self.reward_step_bps.to_string(),
                "at most 10000 (100%)",
            ));
        }

        Ok(())
    }
}

impl GenesisConfig {
    fn validate(&self) -> KeeperResult<()> {
        if self.allocations.is_empty() {
            return Err(invalid("genesis.allocations", "empty", "at least one holder"));
        }

        if self.allocations.iter().any(|a| a.account.is_empty()) {
            return Err(invalid("genesis.allocations.account", "empty", "non-empty string"));
        }

        Ok(())
    }
}

fn invalid(field: &str, value: &str, expected: &str) -> KeeperError {
    KeeperError::InvalidConfig(format!("{} is {}, expected {}", field, value, expected))
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1_000,
            state_path: "nextcopper-state.json".to_string(),
            engine: EngineConfig::default(),
            genesis: GenesisConfig::default(),
            clock: ClockConfig::default(),
            oracle: OracleConfig::default(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        let policy = ElasticityPolicy::default();
        Self {
            period_length: REFERENCE_PERIOD_LENGTH,
            block_count_limit: REFERENCE_REQUEST_BLOCK_LIMIT,
            request_period_limit: REFERENCE_REQUEST_PERIOD_LIMIT,
            window_rule: WindowRule::Either,
            policy: PolicyKind::Elasticity,
            supply_step_bps: policy.supply_step_bps(),
            reward_step_bps: policy.reward_step_bps(),
        }
    }
}

impl Default for GenesisConfig {
    fn default() -> Self {
        Self {
            baseline_quantity: Fixed12::from_raw(GENESIS_BASELINE_QUANTITY),
            baseline_price: Fixed12::from_raw(GENESIS_BASELINE_PRICE),
            block_reward_rate: Fixed12::from_raw(GENESIS_BLOCK_REWARD_RATE),
            allocations: vec![AllocationConfig {
                account: "treasury".to_string(),
                balance: Fixed12::from_raw(GENESIS_TOTAL_SUPPLY),
            }],
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            block_time_ms: 1_000,
            genesis_time: None,
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            delivery_delay_ms: 0,
            schedule: vec![ObservationConfig {
                quantity: Fixed12::from_int(400_000),
                price: Fixed12::from_raw(1_424_000_000_000),
            }],
        }
    }
}

/// Purchases and price (thousandths) of the fourteen reference rounds
const REFERENCE_SCHEDULE: [(u64, u128); 14] = [
    (400_000, 1424),
    (3_600_000, 1424),
    (12_000_000, 1426),
    (16_000_000, 1427),
    (8_000_000, 1424),
    (4_100_000, 1423),
    (17_860_000, 1424),
    (26_790_000, 1425),
    (43_757_000, 1422),
    (893_000, 1420),
    (17_100_000, 1417),
    (34_200_000, 1423),
    (51_300_000, 1422),
    (25_000_000, 1426),
];

/// The reference parameters with the full fourteen-round schedule
pub fn reference_config() -> KeeperResult<KeeperConfig> {
    let schedule = REFERENCE_SCHEDULE
        .iter()
        .map(|(quantity, price)| {
            Ok(ObservationConfig {
                quantity: Fixed12::from_int(*quantity),
                price: Fixed12::from_ratio(*price, 1_000)?,
            })
        })
        .collect::<KeeperResult<Vec<_>>>()?;

    Ok(KeeperConfig {
        oracle: OracleConfig {
            delivery_delay_ms: 500,
            schedule,
        },
        ..KeeperConfig::default()
    })
}

/// Create example configuration file
pub fn create_example_config(path: &str) -> KeeperResult<()> {
    let mut example_config = reference_config()?;
    example_config.clock.genesis_time = Some(chrono::Utc::now().timestamp());
    example_config.save(path)?;
    Ok(())
}

// Fixed12 values are written as decimal strings; TOML integers stop at i64
mod fixed12_serde {
    use nextcopper_core::Fixed12;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Fixed12, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed12, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
