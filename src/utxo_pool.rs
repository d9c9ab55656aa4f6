use crate::transaction::{TransactionOutput, UtxoId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::iter::FromIterator;

/// A pool of confirmed and unspent transaction outputs.
///
/// The pool is the sole source of truth for whether an output is currently
/// spendable: a key is present exactly while the output exists and has not
/// been spent. Only settlement mutates it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UtxoPool {
    // Unspent transaction outputs, indexed by the transaction that created them
    // and their position within it.
    utxos: HashMap<UtxoId, TransactionOutput>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self {
            utxos: HashMap::new(),
        }
    }

    pub fn contains(&self, utxo_id: &UtxoId) -> bool {
        self.utxos.contains_key(utxo_id)
    }

    pub fn get(&self, utxo_id: &UtxoId) -> Option<&TransactionOutput> {
        self.utxos.get(utxo_id)
    }

    /// Adds the output under the given key, replacing any previous mapping.
    pub fn insert(&mut self, utxo_id: UtxoId, output: TransactionOutput) {
        self.utxos.insert(utxo_id, output);
    }

    /// Removes the mapping if present. Removing an absent key is a no-op.
    pub fn remove(&mut self, utxo_id: &UtxoId) {
        self.utxos.remove(utxo_id);
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UtxoId, &TransactionOutput)> {
        self.utxos.iter()
    }
}

impl FromIterator<(UtxoId, TransactionOutput)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (UtxoId, TransactionOutput)>>(iter: I) -> Self {
        Self {
            utxos: iter.into_iter().collect(),
        }
    }
}
