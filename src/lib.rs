pub mod coin;
pub mod crypto;
pub mod hash;
pub mod settlement;
pub mod transaction;
pub mod utxo_pool;
pub mod validation;

pub use self::{
    coin::*, crypto::*, hash::*, settlement::*, transaction::*, utxo_pool::*, validation::*,
};
