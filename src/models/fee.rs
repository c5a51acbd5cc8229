use ethers::types::U256;
use serde::{Deserialize, Serialize};

/// Advisory cost of a transfer.
///
/// `native_cost_wei` is `None` when no fee-per-gas sample was available; the gas figure is
/// still usable on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeEstimate {
    pub gas_units: U256,
    pub gas_price_wei: Option<U256>,
    pub native_cost_wei: Option<U256>,
    /// Set when simulation failed and `gas_units` is the fallback constant.
    pub degraded: bool,
}

impl FeeEstimate {
    pub fn simulated(gas_units: U256) -> Self {
        Self {
            gas_units,
            gas_price_wei: None,
            native_cost_wei: None,
            degraded: false,
        }
    }

    pub fn fallback(gas_units: U256) -> Self {
        Self {
            degraded: true,
            ..Self::simulated(gas_units)
        }
    }

    pub fn with_gas_price(mut self, gas_price_wei: U256) -> Self {
        self.gas_price_wei = Some(gas_price_wei);
        self.native_cost_wei = self.gas_units.checked_mul(gas_price_wei);
        self
    }

    /// Native cost in ether, for display only.
    pub fn native_cost_eth(&self) -> Option<String> {
        self.native_cost_wei.map(ethers::utils::format_ether)
    }
}
