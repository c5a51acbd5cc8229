use crate::{
    contracts::BASE_USDC_ADDRESS,
    models::{TokenAmount, USDC_DECIMALS},
    services::estimator::DEFAULT_GAS_LIMIT,
};
use anyhow::{bail, Context, Result};
use ethers::types::{Address, U256};
use std::str::FromStr;
use std::time::Duration;

/// Base mainnet.
pub const BASE_CHAIN_ID: u64 = 8453;

/// Largest single payment accepted by default, in whole tokens.
pub const DEFAULT_MAX_PAYMENT: u64 = 10_000;

pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

/// Everything the payment core needs; independent of how it was loaded.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub token: Address,
    pub decimals: u8,
    pub max_amount: TokenAmount,
    pub fallback_gas_limit: U256,
    pub relay_enabled: bool,
    pub relay_timeout: Duration,
    pub rpc_timeout: Duration,
    pub poll_interval: Duration,
    pub confirmation_timeout: Duration,
}

impl Default for PaymentSettings {
    fn default() -> Self {
        Self {
            token: Address::from_str(BASE_USDC_ADDRESS).unwrap_or_default(),
            decimals: USDC_DECIMALS,
            max_amount: TokenAmount::from_units(
                U256::from(DEFAULT_MAX_PAYMENT) * U256::exp10(USDC_DECIMALS as usize),
                USDC_DECIMALS,
            ),
            fallback_gas_limit: U256::from(DEFAULT_GAS_LIMIT),
            relay_enabled: true,
            relay_timeout: Duration::from_secs(30),
            rpc_timeout: Duration::from_secs(20),
            poll_interval: Duration::from_secs(2),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        }
    }
}

impl PaymentSettings {
    /// Reject values that would stall or crash the payment flow at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.max_amount.is_zero() {
            bail!("MAX_PAYMENT_AMOUNT must be greater than zero");
        }
        if self.poll_interval.is_zero() {
            bail!("CONFIRMATION_POLL_MS must be greater than zero");
        }
        if self.rpc_timeout.is_zero() {
            bail!("RPC_TIMEOUT_SECS must be greater than zero");
        }
        if self.relay_timeout.is_zero() {
            bail!("RELAY_TIMEOUT_SECS must be greater than zero");
        }
        if self.fallback_gas_limit.is_zero() {
            bail!("FALLBACK_GAS_LIMIT must be greater than zero");
        }

        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Payment network
    pub rpc_url: String,
    pub rpc_fallback_url: Option<String>,
    pub chain_id: u64,
    pub payer_private_key: String,

    // Relay (x402-style submission service)
    pub relay_url: Option<String>,

    pub idempotency_ttl: Duration,

    pub payment: PaymentSettings,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let environment = Self::parse_environment()?;
        let decimals: u8 = Self::parse_var("TOKEN_DECIMALS", "6")?;

        let max_amount_raw = std::env::var("MAX_PAYMENT_AMOUNT")
            .unwrap_or_else(|_| DEFAULT_MAX_PAYMENT.to_string());
        let max_amount = TokenAmount::parse(&max_amount_raw, decimals)
            .with_context(|| format!("Invalid MAX_PAYMENT_AMOUNT: {}", max_amount_raw))?;

        let payment = PaymentSettings {
            token: Self::parse_address("USDC_ADDRESS", BASE_USDC_ADDRESS)?,
            decimals,
            max_amount,
            fallback_gas_limit: U256::from(Self::parse_var::<u64>(
                "FALLBACK_GAS_LIMIT",
                &DEFAULT_GAS_LIMIT.to_string(),
            )?),
            relay_enabled: Self::parse_var("RELAY_ENABLED", "true")?,
            relay_timeout: Duration::from_secs(Self::parse_var("RELAY_TIMEOUT_SECS", "30")?),
            rpc_timeout: Duration::from_secs(Self::parse_var("RPC_TIMEOUT_SECS", "20")?),
            poll_interval: Duration::from_millis(Self::parse_var("CONFIRMATION_POLL_MS", "2000")?),
            confirmation_timeout: DEFAULT_CONFIRMATION_TIMEOUT,
        };

        let config = Self {
            environment,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: Self::parse_var("PORT", "8080")?,

            rpc_url: std::env::var("RPC_URL").context("RPC_URL required")?,
            rpc_fallback_url: std::env::var("RPC_FALLBACK_URL").ok().filter(|url| !url.is_empty()),
            chain_id: Self::parse_var("CHAIN_ID", &BASE_CHAIN_ID.to_string())?,
            payer_private_key: std::env::var("PAYER_PRIVATE_KEY")
                .context("PAYER_PRIVATE_KEY required")?,

            relay_url: std::env::var("RELAY_URL").ok().filter(|url| !url.is_empty()),

            idempotency_ttl: Duration::from_secs(Self::parse_var("IDEMPOTENCY_TTL_SECS", "600")?),

            payment,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_var<T>(var: &str, default: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        std::env::var(var)
            .unwrap_or_else(|_| default.to_string())
            .parse()
            .with_context(|| format!("Invalid {}", var))
    }

    fn parse_address(var: &str, default: &str) -> Result<Address> {
        let addr_str = std::env::var(var).unwrap_or_else(|_| default.to_string());
        Address::from_str(&addr_str)
            .with_context(|| format!("Invalid address for {}", var))
    }

    /// Relay calls only happen when a relay is configured and enabled.
    pub fn relay_active(&self) -> bool {
        self.payment.relay_enabled && self.relay_url.is_some()
    }

    fn validate(&self) -> Result<()> {
        if !self.rpc_url.starts_with("http") {
            bail!("RPC_URL must be HTTP(S) URL");
        }
        if let Some(relay_url) = &self.relay_url {
            if !relay_url.starts_with("http") {
                bail!("RELAY_URL must be HTTP(S) URL");
            }
        }

        if !self.payer_private_key.starts_with("0x") {
            bail!("PAYER_PRIVATE_KEY must start with 0x");
        }

        self.payment.validate()?;

        tracing::info!(
            "Configuration validated for {:?} environment (relay active: {})",
            self.environment,
            self.relay_active()
        );

        Ok(())
    }
}
