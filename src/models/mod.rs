pub mod amount;
pub mod confirmation;
pub mod fee;
pub mod payment;
pub mod response;

pub use amount::*;
pub use confirmation::*;
pub use fee::*;
pub use payment::*;
pub use response::*;
