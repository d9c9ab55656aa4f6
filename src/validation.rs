use crate::coin::Coin;
use crate::crypto::SignatureVerifier;
use crate::transaction::{Transaction, UtxoId};
use crate::utxo_pool::UtxoPool;
use std::collections::HashSet;
use thiserror::Error;

/// The reason a transaction was rejected.
///
/// Invalidity is a normal outcome of validation, not a failure: the settler
/// inspects it to skip the candidate and logs the reason.
#[derive(Error, Debug, Clone, Eq, PartialEq)]
pub enum ValidationError {
    #[error("input claims output {0} which is not in the pool")]
    UnknownUtxo(UtxoId),
    #[error("signature does not authorize spending output {0}")]
    BadSignature(UtxoId),
    #[error("output {0} is claimed more than once within the transaction")]
    DoubleClaim(UtxoId),
    #[error("output {index} has negative amount {amount}")]
    NegativeOutput { index: usize, amount: Coin },
    #[error("outputs total {output_total} exceeds inputs total {input_total}")]
    ValueCreated {
        input_total: Coin,
        output_total: Coin,
    },
    #[error("value total does not fit in the amount representation")]
    ValueOverflow,
}

/// Checks a single transaction against the current pool state.
///
/// Validation never mutates the pool, so repeated calls against an unchanged
/// pool always agree.
pub struct TransactionValidator<V> {
    verifier: V,
}

impl<V: SignatureVerifier> TransactionValidator<V> {
    pub fn new(verifier: V) -> Self {
        Self { verifier }
    }

    /// A transaction is valid if all of the following hold:
    ///   - every input claims an output that is currently in the pool,
    ///   - every input's signature verifies over its signed message under the
    ///     key that owns the claimed output,
    ///   - no output is claimed by more than one input of the transaction,
    ///   - every output amount is non-negative, and
    ///   - the inputs total is greater than or equal to the outputs total.
    ///
    /// Checks run in that order and stop at the first violation.
    pub fn validate(
        &self,
        transaction: &Transaction,
        pool: &UtxoPool,
    ) -> Result<(), ValidationError> {
        let mut claimed = HashSet::new();
        let mut input_total = Coin::zero();

        for input in transaction.inputs() {
            let utxo_id = *input.utxo_id();
            let output = pool
                .get(&utxo_id)
                .ok_or(ValidationError::UnknownUtxo(utxo_id))?;

            // The claimed spender must be authorized by the recorded owner of
            // the output, not by any key the input itself could supply.
            let authorized = self.verifier.verify(
                output.recipient(),
                input.signed_message(),
                input.signature(),
            );
            if !authorized {
                return Err(ValidationError::BadSignature(utxo_id));
            }

            if !claimed.insert(utxo_id) {
                return Err(ValidationError::DoubleClaim(utxo_id));
            }

            input_total = input_total
                .checked_add(output.amount())
                .ok_or(ValidationError::ValueOverflow)?;
        }

        let mut output_total = Coin::zero();
        for (index, output) in transaction.outputs().iter().enumerate() {
            if output.amount().is_negative() {
                return Err(ValidationError::NegativeOutput {
                    index,
                    amount: output.amount(),
                });
            }
            output_total = output_total
                .checked_add(output.amount())
                .ok_or(ValidationError::ValueOverflow)?;
        }

        // Value may be destroyed but never created.
        if input_total < output_total {
            return Err(ValidationError::ValueCreated {
                input_total,
                output_total,
            });
        }
        Ok(())
    }

    pub fn is_valid(&self, transaction: &Transaction, pool: &UtxoPool) -> bool {
        self.validate(transaction, pool).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Ed25519Verifier, PublicKey, Signature};
    use crate::hash::Sha256;
    use crate::transaction::{
        OutputIndex, TransactionId, TransactionInput, TransactionOutput,
    };
    use ed25519_dalek::{Signer, SigningKey};

    fn key_pair(seed: u8) -> (SigningKey, PublicKey) {
        let signing_key = SigningKey::from_bytes(&[seed; 32]);
        let public_key = PublicKey::new(signing_key.verifying_key().to_bytes().to_vec());
        (signing_key, public_key)
    }

    fn genesis_utxo_id(seed: u8) -> UtxoId {
        UtxoId::new(
            TransactionId::new(Sha256::from_raw([seed; 32])),
            OutputIndex::new(0),
        )
    }

    fn signed_input(signer: &SigningKey, utxo_id: UtxoId) -> TransactionInput {
        let message = utxo_id.to_string().into_bytes();
        let signature = Signature::new(signer.sign(&message).to_bytes().to_vec());
        TransactionInput::new(utxo_id, signature, message)
    }

    fn validator() -> TransactionValidator<Ed25519Verifier> {
        TransactionValidator::new(Ed25519Verifier)
    }

    // One genesis output of 10 coins owned by the key with the given seed.
    fn pool_with_genesis_output(seed: u8, amount: i64) -> UtxoPool {
        let (_, owner) = key_pair(seed);
        let mut pool = UtxoPool::new();
        pool.insert(
            genesis_utxo_id(seed),
            TransactionOutput::new(Coin::new(amount), owner),
        );
        pool
    }

    fn simple_transfer(input_seed: u8, output_amount: i64) -> Transaction {
        let (signer, _) = key_pair(input_seed);
        let (_, recipient) = key_pair(99);
        Transaction::new(
            vec![signed_input(&signer, genesis_utxo_id(input_seed))],
            vec![TransactionOutput::new(Coin::new(output_amount), recipient)],
        )
        .unwrap()
    }

    #[test]
    fn well_formed_transfer_is_valid() {
        let pool = pool_with_genesis_output(1, 10);
        let transaction = simple_transfer(1, 10);
        assert_eq!(validator().validate(&transaction, &pool), Ok(()));
        assert!(validator().is_valid(&transaction, &pool));
    }

    #[test]
    fn destroying_value_is_valid() {
        let pool = pool_with_genesis_output(1, 10);
        let transaction = simple_transfer(1, 7);
        assert!(validator().is_valid(&transaction, &pool));
    }

    #[test]
    fn claiming_an_absent_output_is_invalid() {
        let pool = UtxoPool::new();
        let transaction = simple_transfer(1, 10);
        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(ValidationError::UnknownUtxo(genesis_utxo_id(1)))
        );
    }

    #[test]
    fn signature_by_the_wrong_key_is_invalid() {
        let pool = pool_with_genesis_output(1, 10);
        // Signed by key 2, but the pool records key 1 as the owner.
        let (wrong_signer, _) = key_pair(2);
        let (_, recipient) = key_pair(99);
        let transaction = Transaction::new(
            vec![signed_input(&wrong_signer, genesis_utxo_id(1))],
            vec![TransactionOutput::new(Coin::new(10), recipient)],
        )
        .unwrap();
        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(ValidationError::BadSignature(genesis_utxo_id(1)))
        );
    }

    #[test]
    fn tampered_message_is_invalid() {
        let pool = pool_with_genesis_output(1, 10);
        let (signer, _) = key_pair(1);
        let (_, recipient) = key_pair(99);
        let utxo_id = genesis_utxo_id(1);
        let signature = Signature::new(signer.sign(b"original message").to_bytes().to_vec());
        let input = TransactionInput::new(utxo_id, signature, b"tampered message".to_vec());
        let transaction = Transaction::new(
            vec![input],
            vec![TransactionOutput::new(Coin::new(10), recipient)],
        )
        .unwrap();
        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(ValidationError::BadSignature(utxo_id))
        );
    }

    #[test]
    fn claiming_the_same_output_twice_is_invalid() {
        let pool = pool_with_genesis_output(1, 10);
        let (signer, _) = key_pair(1);
        let (_, recipient) = key_pair(99);
        let utxo_id = genesis_utxo_id(1);
        let transaction = Transaction::new(
            vec![signed_input(&signer, utxo_id), signed_input(&signer, utxo_id)],
            vec![TransactionOutput::new(Coin::new(10), recipient)],
        )
        .unwrap();
        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(ValidationError::DoubleClaim(utxo_id))
        );
    }

    #[test]
    fn negative_output_is_invalid() {
        let pool = pool_with_genesis_output(1, 10);
        let (signer, _) = key_pair(1);
        let (_, recipient) = key_pair(99);
        let transaction = Transaction::new(
            vec![signed_input(&signer, genesis_utxo_id(1))],
            vec![
                TransactionOutput::new(Coin::new(5), recipient.clone()),
                TransactionOutput::new(Coin::new(-1), recipient),
            ],
        )
        .unwrap();
        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(ValidationError::NegativeOutput {
                index: 1,
                amount: Coin::new(-1)
            })
        );
    }

    #[test]
    fn creating_value_is_invalid() {
        let pool = pool_with_genesis_output(1, 10);
        let transaction = simple_transfer(1, 15);
        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(ValidationError::ValueCreated {
                input_total: Coin::new(10),
                output_total: Coin::new(15)
            })
        );
    }

    #[test]
    fn output_sum_overflow_is_invalid() {
        let pool = pool_with_genesis_output(1, 10);
        let (signer, _) = key_pair(1);
        let (_, recipient) = key_pair(99);
        let transaction = Transaction::new(
            vec![signed_input(&signer, genesis_utxo_id(1))],
            vec![
                TransactionOutput::new(Coin::new(i64::MAX), recipient.clone()),
                TransactionOutput::new(Coin::new(i64::MAX), recipient),
            ],
        )
        .unwrap();
        assert_eq!(
            validator().validate(&transaction, &pool),
            Err(ValidationError::ValueOverflow)
        );
    }

    #[test]
    fn inputs_across_multiple_outputs_are_summed() {
        let (signer_a, owner_a) = key_pair(1);
        let (signer_b, owner_b) = key_pair(2);
        let (_, recipient) = key_pair(99);
        let mut pool = UtxoPool::new();
        pool.insert(
            genesis_utxo_id(1),
            TransactionOutput::new(Coin::new(6), owner_a),
        );
        pool.insert(
            genesis_utxo_id(2),
            TransactionOutput::new(Coin::new(4), owner_b),
        );

        let transaction = Transaction::new(
            vec![
                signed_input(&signer_a, genesis_utxo_id(1)),
                signed_input(&signer_b, genesis_utxo_id(2)),
            ],
            vec![TransactionOutput::new(Coin::new(10), recipient)],
        )
        .unwrap();
        assert!(validator().is_valid(&transaction, &pool));
    }

    #[test]
    fn validation_is_idempotent_and_leaves_the_pool_unchanged() {
        let pool = pool_with_genesis_output(1, 10);
        let transaction = simple_transfer(1, 10);
        let validator = validator();

        let first = validator.validate(&transaction, &pool);
        let second = validator.validate(&transaction, &pool);
        assert_eq!(first, second);
        assert_eq!(pool.len(), 1);
        assert!(pool.contains(&genesis_utxo_id(1)));
    }
}
