pub mod balance;
pub mod chain;
pub mod estimator;
pub mod executor;
pub mod payment;
pub mod relay;
pub mod submissions;
pub mod watcher;

pub use balance::BalanceOracle;
pub use chain::{ChainClient, WalletSigner};
pub use estimator::{CostEstimator, DEFAULT_GAS_LIMIT};
pub use executor::{TransferExecutor, TransferStage, ValidatedTransfer};
pub use payment::PaymentService;
pub use relay::{PaymentRelay, RelayIntent, RelaySubmission, RelayTransaction};
pub use submissions::SubmissionCache;
pub use watcher::ConfirmationWatcher;
