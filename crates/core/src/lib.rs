//! # Creditline Core
//!
//! Domain types cho credit limit back office: tenor-scoped ceilings,
//! loan disbursements và audit mutations. Không có I/O ở crate này.

pub mod capability;
pub mod error;
pub mod limit;
pub mod mutation;
pub mod tenor;
pub mod transaction;

pub use capability::Capability;
pub use error::{CoreError, CoreResult};
pub use limit::{validate_limit_amount, TenorLimit};
pub use mutation::{LimitMutation, MutationAction, NewMutation};
pub use tenor::Tenor;
pub use transaction::{LoanTransaction, TransactionRequest, TransactionStatus};
