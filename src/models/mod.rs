mod classification;
mod code;
mod id;
mod transaction;
mod user;

pub use classification::{
    ClassificationResult, ParsedQuery, ParsedTransaction, QueryPeriod, QueryType, TypeFilter,
};
pub use code::{CodeGenerator, FixedCodeGenerator, RandomCodeGenerator, CODE_ALPHABET, CODE_LEN};
pub use id::Id;
pub use transaction::{Recurrence, Transaction, TxStatus, TxType, DEFAULT_CATEGORY};
pub use user::{User, UserProfile};
