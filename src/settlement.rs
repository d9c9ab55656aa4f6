use crate::crypto::SignatureVerifier;
use crate::transaction::Transaction;
use crate::utxo_pool::UtxoPool;
use crate::validation::TransactionValidator;
use log::{debug, trace};

/// Settles batches of candidate transactions against a spendable-output pool.
///
/// The settler owns a full copy of the pool it was constructed from and is its
/// only writer. Candidates are processed strictly in the order given: each one
/// is validated against the pool as mutated by the candidates accepted before
/// it, so when two candidates claim the same output the earlier one wins and
/// the later one fails the existence check. Rejections never undo earlier
/// acceptances.
pub struct BatchSettler<V> {
    pool: UtxoPool,
    validator: TransactionValidator<V>,
}

impl<V: SignatureVerifier> BatchSettler<V> {
    /// Creates a settler over an independent copy of the given pool.
    pub fn new(pool: &UtxoPool, verifier: V) -> Self {
        Self {
            pool: pool.clone(),
            validator: TransactionValidator::new(verifier),
        }
    }

    /// Validates each candidate against the current pool state, applies the
    /// accepted ones, and returns them in acceptance order.
    ///
    /// Outputs created by an accepted candidate are immediately spendable by
    /// later candidates of the same batch.
    pub fn settle(&mut self, candidates: Vec<Transaction>) -> Vec<Transaction> {
        let mut accepted = Vec::new();
        for candidate in candidates {
            match self.validator.validate(&candidate, &self.pool) {
                Ok(()) => {
                    self.apply(&candidate);
                    debug!("accepted transaction {}", candidate.id());
                    accepted.push(candidate);
                }
                Err(reason) => {
                    debug!("rejected transaction {}: {}", candidate.id(), reason);
                }
            }
        }
        accepted
    }

    /// Marks the transaction's inputs as spent and its outputs as spendable.
    /// Only called for transactions that validated against the current pool.
    fn apply(&mut self, transaction: &Transaction) {
        for input in transaction.inputs() {
            trace!("spending {}", input.utxo_id());
            self.pool.remove(input.utxo_id());
        }
        for (index, output) in transaction.outputs().iter().enumerate() {
            let utxo_id = transaction.output_utxo_id(index as u32);
            trace!("creating {}", utxo_id);
            self.pool.insert(utxo_id, output.clone());
        }
    }

    pub fn pool(&self) -> &UtxoPool {
        &self.pool
    }

    pub fn into_pool(self) -> UtxoPool {
        self.pool
    }
}
