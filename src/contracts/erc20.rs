use ethers::prelude::*;

// Minimal ERC-20 surface used for stablecoin transfers
abigen!(
    IERC20,
    r#"[
        function transfer(address to, uint256 amount) external returns (bool)
        function balanceOf(address account) external view returns (uint256)
        function decimals() external view returns (uint8)
    ]"#
);

/// Native USDC on Base mainnet.
pub const BASE_USDC_ADDRESS: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";

/// ABI-encoded `transfer(to, amount)` calldata.
pub fn encode_transfer(to: Address, amount: U256) -> Bytes {
    use ethers::abi::AbiEncode;

    TransferCall { to, amount }.encode().into()
}
