//! Collateral application: a virtual ledger over a channel that holds no funds.
//!
//! The channel's real allocation stays zero forever; value moves only in the
//! signed app-local ledger, and whether a movement is acceptable is decided by
//! the receiving client (see [`crate::policy`]), not by this predicate.

use super::{ChannelApp, MutationError, TransitionError};
use commonware_codec::{DecodeExt, Encode};
use statechan_types::{
    Address, AppKind, CollateralData, Int256, LedgerError, Params, ParticipantIndex, State,
};

/// Ledger row that payments move value in.
pub const LEDGER_ASSET: usize = 0;

pub struct Collateral;

impl ChannelApp for Collateral {
    const KIND: AppKind = AppKind::Collateral;

    fn valid_init(_: &Params, state: &State) -> Result<(), TransitionError> {
        let data = CollateralData::decode(state.data.as_slice())?;
        let assets = state.allocation.assets.len();
        if data.num_assets() != assets {
            return Err(TransitionError::LedgerShapeMismatch {
                assets,
                rows: data.num_assets(),
            });
        }
        if !data.is_zero() {
            return Err(TransitionError::NonZeroVirtualBalance);
        }
        if !state.allocation.is_zero() {
            return Err(TransitionError::NonZeroRealBalance);
        }
        Ok(())
    }

    fn valid_transition(
        _: &Params,
        _: &State,
        to: &State,
        _: ParticipantIndex,
    ) -> Result<(), TransitionError> {
        CollateralData::decode(to.data.as_slice())?;
        if !to.allocation.is_zero() {
            return Err(TransitionError::NonZeroRealBalance);
        }
        Ok(())
    }
}

/// Initial payload for a channel over `num_assets` assets.
pub fn init_data(num_assets: usize) -> Vec<u8> {
    CollateralData::zero(num_assets).encode().to_vec()
}

/// Move `amount` on [`LEDGER_ASSET`] from `from` to `to` inside `state`.
pub fn transfer(
    peers: &[Address],
    state: &mut State,
    from: &Address,
    to: &Address,
    amount: Int256,
) -> Result<(), MutationError> {
    let mut data = CollateralData::decode(state.data.as_slice())?;
    data.transfer_between(peers, LEDGER_ASSET, from, to, amount)?;
    state.data = data.encode().to_vec();
    tracing::debug!(%from, %to, %amount, "ledger transfer");
    Ok(())
}

/// Balance of `account` on [`LEDGER_ASSET`] in `state`.
pub fn channel_balance(
    peers: &[Address],
    state: &State,
    account: &Address,
) -> Result<Int256, MutationError> {
    let data = CollateralData::decode(state.data.as_slice())?;
    data.balance_of(peers, LEDGER_ASSET, account)
        .ok_or(MutationError::Ledger(LedgerError::UnknownAddress(*account)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use primitive_types::U256;
    use statechan_types::{Allocation, AppId, Asset};

    fn peers() -> Vec<Address> {
        vec![Address([1; 20]), Address([2; 20])]
    }

    fn params() -> Params {
        Params::new(peers(), 60, AppId(Address([0xcc; 20])))
    }

    fn state() -> State {
        State::new(
            [1; 32],
            params().app,
            Allocation::zero(vec![Asset(Address([0xee; 20]))], 2),
            init_data(1),
        )
    }

    #[test]
    fn init_accepts_zero_ledger() {
        assert_eq!(Collateral::valid_init(&params(), &state()), Ok(()));
    }

    #[test]
    fn init_rejections() {
        let mut s = state();
        s.data = init_data(2);
        assert_eq!(
            Collateral::valid_init(&params(), &s),
            Err(TransitionError::LedgerShapeMismatch { assets: 1, rows: 2 })
        );

        let mut s = state();
        transfer(&peers(), &mut s, &peers()[0], &peers()[1], Int256::ONE).unwrap();
        assert_eq!(
            Collateral::valid_init(&params(), &s),
            Err(TransitionError::NonZeroVirtualBalance)
        );

        let mut s = state();
        s.allocation.balances[0][0] = U256::one();
        assert_eq!(
            Collateral::valid_init(&params(), &s),
            Err(TransitionError::NonZeroRealBalance)
        );

        let mut s = state();
        s.data = vec![0; 31];
        assert!(matches!(
            Collateral::valid_init(&params(), &s),
            Err(TransitionError::MalformedPayload(_))
        ));
    }

    #[test]
    fn transitions_only_require_zero_real_allocation() {
        let from = state();
        let mut to = from.clone();
        transfer(&peers(), &mut to, &peers()[1], &peers()[0], Int256::from(42i64)).unwrap();
        assert_eq!(Collateral::valid_transition(&params(), &from, &to, 1), Ok(()));

        to.allocation.balances[0][1] = U256::from(5u64);
        assert_eq!(
            Collateral::valid_transition(&params(), &from, &to, 1),
            Err(TransitionError::NonZeroRealBalance)
        );

        let mut to = from.clone();
        to.data.push(0);
        assert!(matches!(
            Collateral::valid_transition(&params(), &from, &to, 0),
            Err(TransitionError::MalformedPayload(_))
        ));
    }

    #[test]
    fn transfer_updates_both_sides() {
        let mut s = state();
        transfer(&peers(), &mut s, &peers()[0], &peers()[1], Int256::from(30i64)).unwrap();
        transfer(&peers(), &mut s, &peers()[1], &peers()[0], Int256::from(12i64)).unwrap();
        assert_eq!(
            channel_balance(&peers(), &s, &peers()[0]),
            Ok(Int256::from(-18i64))
        );
        assert_eq!(
            channel_balance(&peers(), &s, &peers()[1]),
            Ok(Int256::from(18i64))
        );
    }

    #[test]
    fn transfer_to_stranger_fails() {
        let mut s = state();
        let before = s.clone();
        let stranger = Address([9; 20]);
        assert_eq!(
            transfer(&peers(), &mut s, &peers()[0], &stranger, Int256::ONE),
            Err(MutationError::Ledger(LedgerError::UnknownAddress(stranger)))
        );
        assert_eq!(s, before);
        assert!(channel_balance(&peers(), &s, &stranger).is_err());
    }
}
