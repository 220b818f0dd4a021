//! Collateral application payload: a virtual balance ledger.
//!
//! `balances[asset][participant]` are signed: one side's credit is the other
//! side's debt, so every asset row sums to zero. Encoded as the solidity ABI
//! tuple `(int256[][])`, see [`super::abi`].

use super::abi;
use crate::{
    channel::{participant_index, Address, ParticipantIndex, NUM_PARTS},
    int256::Int256,
};
use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, Write};
use thiserror::Error as ThisError;

#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum LedgerError {
    #[error("asset {0} is not in the ledger")]
    UnknownAsset(usize),
    #[error("participant {0} is not in the ledger")]
    UnknownParticipant(ParticipantIndex),
    #[error("{0} is not a channel participant")]
    UnknownAddress(Address),
    #[error("transfer overflows int256 on asset {0}")]
    Overflow(usize),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CollateralData {
    pub balances: Vec<Vec<Int256>>,
}

impl CollateralData {
    pub fn new(balances: Vec<Vec<Int256>>) -> Self {
        Self { balances }
    }

    /// Zero ledger with one row per asset.
    pub fn zero(num_assets: usize) -> Self {
        Self {
            balances: vec![vec![Int256::ZERO; NUM_PARTS]; num_assets],
        }
    }

    pub fn num_assets(&self) -> usize {
        self.balances.len()
    }

    pub fn balance(&self, asset: usize, participant: ParticipantIndex) -> Option<Int256> {
        self.balances
            .get(asset)?
            .get(usize::from(participant))
            .copied()
    }

    /// Balance of the participant registered under `account` in `peers`.
    pub fn balance_of(&self, peers: &[Address], asset: usize, account: &Address) -> Option<Int256> {
        let idx = participant_index(peers, account)?;
        self.balance(asset, idx)
    }

    pub fn is_zero(&self) -> bool {
        self.balances.iter().flatten().all(Int256::is_zero)
    }

    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// The row sum is unchanged. Balances may go negative: collateral coverage is
    /// decided by the receiving side, not here. On error the ledger is untouched.
    pub fn apply_transfer(
        &mut self,
        asset: usize,
        from: ParticipantIndex,
        to: ParticipantIndex,
        amount: Int256,
    ) -> Result<(), LedgerError> {
        let row = self
            .balances
            .get_mut(asset)
            .ok_or(LedgerError::UnknownAsset(asset))?;
        let (f, t) = (usize::from(from), usize::from(to));
        for (idx, participant) in [(f, from), (t, to)] {
            if idx >= row.len() {
                return Err(LedgerError::UnknownParticipant(participant));
            }
        }

        let debited = row[f]
            .checked_sub(amount)
            .ok_or(LedgerError::Overflow(asset))?;
        let base = if f == t { debited } else { row[t] };
        let credited = base
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(asset))?;
        row[f] = debited;
        row[t] = credited;
        Ok(())
    }

    /// [`Self::apply_transfer`] between participants named by address.
    pub fn transfer_between(
        &mut self,
        peers: &[Address],
        asset: usize,
        from: &Address,
        to: &Address,
        amount: Int256,
    ) -> Result<(), LedgerError> {
        let from_idx =
            participant_index(peers, from).ok_or(LedgerError::UnknownAddress(*from))?;
        let to_idx = participant_index(peers, to).ok_or(LedgerError::UnknownAddress(*to))?;
        self.apply_transfer(asset, from_idx, to_idx, amount)
    }

    /// Every asset row sums to exactly zero (and the sum does not overflow).
    pub fn is_balanced(&self) -> bool {
        self.balances
            .iter()
            .all(|row| Int256::checked_sum(row.iter()) == Some(Int256::ZERO))
    }
}

impl Write for CollateralData {
    fn write(&self, writer: &mut impl BufMut) {
        abi::write_tuple_int256_array_array(&self.balances, writer);
    }
}

impl Read for CollateralData {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            balances: abi::read_tuple_int256_array_array(reader)?,
        })
    }
}

impl EncodeSize for CollateralData {
    fn encode_size(&self) -> usize {
        abi::tuple_int256_array_array_size(&self.balances)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int256::WORD_SIZE;
    use commonware_codec::{DecodeExt, Encode};
    use proptest::prelude::*;

    fn int(v: i64) -> Int256 {
        Int256::from(v)
    }

    #[test]
    fn zero_ledger_encoding() {
        let data = CollateralData::zero(1);
        let encoded = data.encode();
        // head, outer length, one offset, inner length, two balances
        assert_eq!(encoded.len(), 6 * WORD_SIZE);
        assert_eq!(encoded[WORD_SIZE - 1], 0x20);
        assert_eq!(encoded[2 * WORD_SIZE - 1], 1);
        assert_eq!(encoded[3 * WORD_SIZE - 1], 0x20);
        assert_eq!(encoded[4 * WORD_SIZE - 1], 2);
        assert!(encoded[4 * WORD_SIZE..].iter().all(|b| *b == 0));
        assert_eq!(CollateralData::decode(encoded.as_ref()).unwrap(), data);
    }

    #[test]
    fn empty_shapes_round_trip() {
        for data in [
            CollateralData::default(),
            CollateralData::new(vec![vec![]]),
            CollateralData::new(vec![vec![], vec![int(3)], vec![]]),
        ] {
            let encoded = data.encode();
            assert_eq!(encoded.len(), data.encode_size());
            assert_eq!(CollateralData::decode(encoded.as_ref()).unwrap(), data);
        }
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut encoded = CollateralData::zero(1).encode().to_vec();
        encoded.push(0);
        assert!(CollateralData::decode(encoded.as_slice()).is_err());
    }

    #[test]
    fn balance_queries() {
        let peers = [Address([1; 20]), Address([2; 20])];
        let data = CollateralData::new(vec![vec![int(-40), int(40)]]);
        assert_eq!(data.balance(0, 0), Some(int(-40)));
        assert_eq!(data.balance(0, 2), None);
        assert_eq!(data.balance(1, 0), None);
        assert_eq!(data.balance_of(&peers, 0, &peers[1]), Some(int(40)));
        assert_eq!(data.balance_of(&peers, 0, &Address([3; 20])), None);
        assert!(!data.is_zero());
        assert!(data.is_balanced());
        assert!(CollateralData::zero(3).is_zero());
    }

    #[test]
    fn unbalanced_rows_are_detected() {
        assert!(!CollateralData::new(vec![vec![int(1), int(0)]]).is_balanced());
        assert!(!CollateralData::new(vec![vec![Int256::MAX, Int256::ONE, int(-1)]]).is_balanced());
        assert!(CollateralData::new(vec![vec![Int256::MIN, Int256::MAX, Int256::ONE]]).is_balanced());
    }

    #[test]
    fn transfers_keep_rows_balanced() {
        let mut data = CollateralData::zero(2);
        data.apply_transfer(0, 0, 1, int(25)).unwrap();
        data.apply_transfer(0, 1, 0, int(5)).unwrap();
        data.apply_transfer(1, 1, 0, int(7)).unwrap();
        assert_eq!(data.balances, vec![vec![int(-20), int(20)], vec![int(7), int(-7)]]);
        assert!(data.is_balanced());

        data.apply_transfer(1, 0, 0, int(100)).unwrap();
        assert_eq!(data.balances[1], vec![int(7), int(-7)]);
    }

    #[test]
    fn transfer_errors_leave_ledger_untouched() {
        let mut data = CollateralData::new(vec![vec![Int256::MIN, Int256::ZERO]]);
        let before = data.clone();
        assert_eq!(
            data.apply_transfer(0, 0, 1, Int256::ONE),
            Err(LedgerError::Overflow(0))
        );
        assert_eq!(
            data.apply_transfer(1, 0, 1, Int256::ONE),
            Err(LedgerError::UnknownAsset(1))
        );
        assert_eq!(
            data.apply_transfer(0, 0, 2, Int256::ONE),
            Err(LedgerError::UnknownParticipant(2))
        );
        assert_eq!(data, before);
    }

    #[test]
    fn transfer_between_resolves_addresses() {
        let peers = [Address([1; 20]), Address([2; 20])];
        let mut data = CollateralData::zero(1);
        data.transfer_between(&peers, 0, &peers[1], &peers[0], int(3))
            .unwrap();
        assert_eq!(data.balance_of(&peers, 0, &peers[0]), Some(int(3)));
        assert_eq!(
            data.transfer_between(&peers, 0, &peers[0], &Address([9; 20]), int(1)),
            Err(LedgerError::UnknownAddress(Address([9; 20])))
        );
    }

    proptest! {
        #[test]
        fn random_shapes_round_trip(
            rows in prop::collection::vec(prop::collection::vec(any::<i128>(), 0..6), 0..6)
        ) {
            let data = CollateralData::new(
                rows.into_iter()
                    .map(|row| row.into_iter().map(Int256::from).collect())
                    .collect(),
            );
            let encoded = data.encode();
            prop_assert_eq!(encoded.len(), data.encode_size());
            prop_assert_eq!(CollateralData::decode(encoded.as_ref()).unwrap(), data);
        }

        #[test]
        fn arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
            let _ = CollateralData::decode(bytes.as_slice());
        }
    }
}
