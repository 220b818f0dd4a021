//! Channel-level types handed to applications by the channel client.
//!
//! These mirror the snapshot the surrounding state-channel framework passes to an
//! application on every update and every dispute step: immutable [`Params`], and a
//! [`State`] carrying the real [`Allocation`] plus the opaque application payload.

use commonware_utils::hex;
use primitive_types::U256;
use std::fmt;

/// Number of participants every application in this workspace supports.
pub const NUM_PARTS: usize = 2;

/// Length of an on-chain account address.
pub const ADDRESS_LENGTH: usize = 20;

/// Index of a participant in [`Params::participants`].
pub type ParticipantIndex = u8;

/// On-chain account address.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex(&self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Asset identifier (the asset holder contract holding the channel's deposits).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Asset(pub Address);

/// Application definition: the on-chain address of the app's validator contract.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AppId(pub Address);

/// Immutable per-channel constants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Params {
    pub participants: Vec<Address>,
    /// Challenge duration in seconds.
    pub challenge_duration: u64,
    pub app: AppId,
}

impl Params {
    pub fn new(participants: Vec<Address>, challenge_duration: u64, app: AppId) -> Self {
        Self {
            participants,
            challenge_duration,
            app,
        }
    }

    pub fn num_parts(&self) -> usize {
        self.participants.len()
    }

    pub fn participant_index(&self, address: &Address) -> Option<ParticipantIndex> {
        participant_index(&self.participants, address)
    }
}

/// Linear scan for `address` in `peers`.
pub fn participant_index(peers: &[Address], address: &Address) -> Option<ParticipantIndex> {
    peers
        .iter()
        .position(|peer| peer == address)
        .and_then(|idx| ParticipantIndex::try_from(idx).ok())
}

/// Real (on-chain enforceable) balances of a channel: `balances[asset][participant]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Allocation {
    pub assets: Vec<Asset>,
    pub balances: Vec<Vec<U256>>,
}

impl Allocation {
    pub fn new(assets: Vec<Asset>, balances: Vec<Vec<U256>>) -> Self {
        Self { assets, balances }
    }

    /// All-zero allocation over `assets` for `num_parts` participants.
    pub fn zero(assets: Vec<Asset>, num_parts: usize) -> Self {
        let balances = vec![vec![U256::zero(); num_parts]; assets.len()];
        Self { assets, balances }
    }

    pub fn balance(&self, asset: usize, participant: ParticipantIndex) -> Option<U256> {
        self.balances
            .get(asset)?
            .get(usize::from(participant))
            .copied()
    }

    pub fn is_zero(&self) -> bool {
        self.balances.iter().flatten().all(|balance| balance.is_zero())
    }

    /// Total held for `asset` across participants, `None` if unknown or the sum overflows.
    pub fn asset_sum(&self, asset: usize) -> Option<U256> {
        self.balances
            .get(asset)?
            .iter()
            .try_fold(U256::zero(), |acc, balance| acc.checked_add(*balance))
    }

    /// Same assets in the same order.
    pub fn assets_equal(&self, other: &Allocation) -> bool {
        self.assets == other.assets
    }
}

/// Snapshot of a channel state as seen by an application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State {
    pub id: [u8; 32],
    pub version: u64,
    pub app: AppId,
    pub allocation: Allocation,
    /// Encoded application payload (see [`crate::app::AppData`]).
    pub data: Vec<u8>,
    pub is_final: bool,
}

impl State {
    pub fn new(id: [u8; 32], app: AppId, allocation: Allocation, data: Vec<u8>) -> Self {
        Self {
            id,
            version: 0,
            app,
            allocation,
            data,
            is_final: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(byte: u8) -> Address {
        Address([byte; ADDRESS_LENGTH])
    }

    #[test]
    fn participant_index_scans_peers() {
        let peers = [address(1), address(2)];
        assert_eq!(participant_index(&peers, &address(1)), Some(0));
        assert_eq!(participant_index(&peers, &address(2)), Some(1));
        assert_eq!(participant_index(&peers, &address(3)), None);
    }

    #[test]
    fn allocation_sums_and_zero_checks() {
        let assets = vec![Asset(address(9))];
        let mut alloc = Allocation::zero(assets, NUM_PARTS);
        assert!(alloc.is_zero());
        assert_eq!(alloc.asset_sum(0), Some(U256::zero()));

        alloc.balances[0][1] = U256::from(70u64);
        alloc.balances[0][0] = U256::from(30u64);
        assert!(!alloc.is_zero());
        assert_eq!(alloc.asset_sum(0), Some(U256::from(100u64)));
        assert_eq!(alloc.balance(0, 1), Some(U256::from(70u64)));
        assert_eq!(alloc.balance(1, 0), None);
        assert_eq!(alloc.asset_sum(1), None);

        alloc.balances[0] = vec![U256::MAX, U256::one()];
        assert_eq!(alloc.asset_sum(0), None);
    }

    #[test]
    fn address_formats_as_hex() {
        assert_eq!(
            address(0xab).to_string(),
            "0xabababababababababababababababababababab"
        );
    }
}
