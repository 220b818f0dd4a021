//! Countersign decision for incoming collateral-ledger updates.
//!
//! [`Collateral::valid_transition`] only guards what a dispute can enforce. Before
//! signing a peer's proposal the receiving client also checks that the update is a
//! payment *to* it, that the ledger still balances, and that the peer's resulting
//! debt is something it is willing to carry given the peer's on-chain collateral.

use crate::apps::{
    collateral::{Collateral, LEDGER_ASSET},
    ChannelApp, TransitionError,
};
use commonware_codec::DecodeExt;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use statechan_types::{Address, CollateralData, Int256, Params, ParticipantIndex, State};
use thiserror::Error;

/// On-chain facts about a peer, looked up when deciding on a payment.
pub trait CollateralSource {
    /// Collateral the peer has deposited.
    fn peer_collateral(&self, peer: &Address) -> anyhow::Result<U256>;

    /// Part of the peer's collateral locked into the channel with us.
    fn channel_funding(&self, peer: &Address) -> anyhow::Result<U256>;

    /// Whether the peer ever settled a channel with more debt than it covered.
    fn has_overdrawn(&self, peer: &Address) -> anyhow::Result<bool>;
}

/// Everything a policy may consider about one incoming payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaymentContext {
    /// Increase of our own ledger balance.
    pub amount: U256,
    pub collateral: U256,
    pub funding: U256,
    /// Peer's ledger balance after the payment (negative when in debt).
    pub peer_balance: Int256,
    pub has_overdrawn: bool,
}

impl PaymentContext {
    /// What the peer owes after the payment.
    pub fn peer_debt(&self) -> U256 {
        if self.peer_balance.is_negative() {
            self.peer_balance.unsigned_abs()
        } else {
            U256::zero()
        }
    }
}

pub trait PaymentAcceptancePolicy {
    fn accept(&self, payment: &PaymentContext) -> bool;
}

impl<F> PaymentAcceptancePolicy for F
where
    F: Fn(&PaymentContext) -> bool,
{
    fn accept(&self, payment: &PaymentContext) -> bool {
        self(payment)
    }
}

/// Threshold policy: accept while the peer's debt is covered.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Unsecured debt tolerated on top of collateral and channel funding.
    pub credit_line: u64,
    /// Keep accepting payments from peers that overdrew before.
    pub allow_overdrawn_peers: bool,
}

impl PaymentAcceptancePolicy for PolicyConfig {
    fn accept(&self, payment: &PaymentContext) -> bool {
        if payment.has_overdrawn && !self.allow_overdrawn_peers {
            return false;
        }
        let cover = payment
            .collateral
            .saturating_add(payment.funding)
            .saturating_add(U256::from(self.credit_line));
        payment.peer_debt() <= cover
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UpdateRejection {
    #[error("invalid transition: {0}")]
    InvalidTransition(#[from] TransitionError),
    #[error("{0} is not a participant of this channel")]
    NotAParticipant(Address),
    #[error("ledger has no balance for {0}")]
    MissingBalance(Address),
    #[error("payment update must increase our balance")]
    BalanceDecrease,
    #[error("payment update must credit exactly what it debits")]
    CreditDebitMismatch,
    #[error("peer collateral unavailable")]
    CollateralUnavailable,
    #[error("channel funding unavailable")]
    FundingUnavailable,
    #[error("settlement history unavailable")]
    HistoryUnavailable,
    #[error("payment rejected by policy")]
    RejectedByPolicy,
}

/// Decides on collateral-ledger updates proposed to `me`.
pub struct UpdateHandler<S, P> {
    me: Address,
    source: S,
    policy: P,
}

impl<S: CollateralSource, P: PaymentAcceptancePolicy> UpdateHandler<S, P> {
    pub fn new(me: Address, source: S, policy: P) -> Self {
        Self { me, source, policy }
    }

    pub fn address(&self) -> &Address {
        &self.me
    }

    /// Check `proposed` against `current` and return the accepted payment.
    pub fn handle_update(
        &self,
        params: &Params,
        current: &State,
        proposed: &State,
        actor: ParticipantIndex,
    ) -> Result<PaymentContext, UpdateRejection> {
        Collateral::valid_transition(params, current, proposed, actor)?;

        let peer = self.peer(params)?;
        let peers = params.participants.as_slice();
        let current_data = CollateralData::decode(current.data.as_slice())
            .map_err(TransitionError::from)?;
        let proposed_data = CollateralData::decode(proposed.data.as_slice())
            .map_err(TransitionError::from)?;
        let balance = |data: &CollateralData, account: &Address| {
            data.balance_of(peers, LEDGER_ASSET, account)
                .ok_or(UpdateRejection::MissingBalance(*account))
        };
        let current_balance = balance(&current_data, &self.me)?;
        let proposed_balance = balance(&proposed_data, &self.me)?;
        let proposed_peer_balance = balance(&proposed_data, &peer)?;

        if proposed_balance < current_balance {
            return self.reject(&peer, UpdateRejection::BalanceDecrease);
        }
        if proposed_balance.checked_add(proposed_peer_balance) != Some(Int256::ZERO) {
            return self.reject(&peer, UpdateRejection::CreditDebitMismatch);
        }

        let collateral = self.source.peer_collateral(&peer).map_err(|err| {
            tracing::info!(%peer, ?err, "peer collateral lookup failed");
            UpdateRejection::CollateralUnavailable
        })?;
        let funding = self.source.channel_funding(&peer).map_err(|err| {
            tracing::info!(%peer, ?err, "channel funding lookup failed");
            UpdateRejection::FundingUnavailable
        })?;
        let has_overdrawn = self.source.has_overdrawn(&peer).map_err(|err| {
            tracing::info!(%peer, ?err, "overdraw history lookup failed");
            UpdateRejection::HistoryUnavailable
        })?;

        // proposed >= current, so the wrapped difference is exact.
        let (amount, _) = proposed_balance
            .into_raw()
            .overflowing_sub(current_balance.into_raw());
        let payment = PaymentContext {
            amount,
            collateral,
            funding,
            peer_balance: proposed_peer_balance,
            has_overdrawn,
        };
        if !self.policy.accept(&payment) {
            return self.reject(&peer, UpdateRejection::RejectedByPolicy);
        }

        tracing::info!(
            %peer,
            %amount,
            peer_balance = %proposed_peer_balance,
            version = proposed.version,
            "payment update accepted"
        );
        Ok(payment)
    }

    fn peer(&self, params: &Params) -> Result<Address, UpdateRejection> {
        if params.participant_index(&self.me).is_none() {
            return Err(UpdateRejection::NotAParticipant(self.me));
        }
        params
            .participants
            .iter()
            .find(|participant| **participant != self.me)
            .copied()
            .ok_or(UpdateRejection::NotAParticipant(self.me))
    }

    fn reject<T>(&self, peer: &Address, rejection: UpdateRejection) -> Result<T, UpdateRejection> {
        tracing::warn!(%peer, ?rejection, "payment update rejected");
        Err(rejection)
    }
}
