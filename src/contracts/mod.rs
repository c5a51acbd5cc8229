pub mod erc20;

pub use erc20::{encode_transfer, IERC20, BASE_USDC_ADDRESS};
