//! Channel application validators and mutators.
//!
//! Each application implements [`ChannelApp`]: a pure predicate deciding whether a
//! channel may open with a given state and whether one state may follow another.
//! The same predicate runs on-chain during disputes, so every check here must
//! accept and reject exactly what the contract does.

pub mod collateral;
pub mod registry;
pub mod tictactoe;


use statechan_types::{
    AppId, AppKind, LedgerError, MoveError, Params, ParticipantIndex, State,
};
use thiserror::Error;

/// Why a state was rejected.
///
/// Validators report the first failing check.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("invalid number of participants: {0}")]
    WrongParticipantCount(usize),
    #[error("invalid actor: expected {expected}, got {got}")]
    WrongActor {
        expected: ParticipantIndex,
        got: ParticipantIndex,
    },
    #[error("invalid next actor: expected {expected}, got {got}")]
    TurnOrderViolation {
        expected: ParticipantIndex,
        got: ParticipantIndex,
    },
    #[error("invalid mark {value} in cell {cell}")]
    InvalidMarkValue { cell: usize, value: u8 },
    #[error("cell {0} is already marked")]
    CellOverwrite(usize),
    #[error("no cell changed")]
    NoChange,
    #[error("more than one cell changed")]
    MultipleChanges,
    #[error("final flag: expected {expected}")]
    FinalityMismatch { expected: bool },
    #[error("allocation does not match the expected payout")]
    AllocationMismatch,
    #[error("assets differ between states")]
    AssetMismatch,
    #[error("real allocation must be zero")]
    NonZeroRealBalance,
    #[error("initial grid must be empty")]
    InvalidInitialGrid,
    #[error("initial state must not be final")]
    InitialStateFinal,
    #[error("invalid next actor {0}")]
    InvalidNextActor(u8),
    #[error("ledger has {rows} asset rows, channel has {assets} assets")]
    LedgerShapeMismatch { assets: usize, rows: usize },
    #[error("initial virtual balances must be zero")]
    NonZeroVirtualBalance,
    #[error("state belongs to another application")]
    AppDataMismatch,
    #[error("pot exceeds uint256")]
    AllocationOverflow,
    #[error("unknown application {0:?}")]
    UnknownApp(AppId),
}

impl From<commonware_codec::Error> for TransitionError {
    fn from(err: commonware_codec::Error) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}

/// Why a mutator could not produce the next state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error(transparent)]
    Move(#[from] MoveError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("winner payout cannot be computed")]
    Payout,
}

impl From<commonware_codec::Error> for MutationError {
    fn from(err: commonware_codec::Error) -> Self {
        Self::MalformedPayload(err.to_string())
    }
}

/// Validity predicate of a channel application.
pub trait ChannelApp {
    const KIND: AppKind;

    /// Whether a channel may be opened with `state`.
    fn valid_init(params: &Params, state: &State) -> Result<(), TransitionError>;

    /// Whether `to` may follow `from` when signed off by `actor`.
    fn valid_transition(
        params: &Params,
        from: &State,
        to: &State,
        actor: ParticipantIndex,
    ) -> Result<(), TransitionError>;
}

pub fn valid_init(kind: AppKind, params: &Params, state: &State) -> Result<(), TransitionError> {
    let result = match kind {
        AppKind::TicTacToe => tictactoe::TicTacToe::valid_init(params, state),
        AppKind::Collateral => collateral::Collateral::valid_init(params, state),
    };
    if let Err(err) = &result {
        tracing::debug!(app = kind.name(), version = state.version, ?err, "initial state rejected");
    }
    result
}

pub fn valid_transition(
    kind: AppKind,
    params: &Params,
    from: &State,
    to: &State,
    actor: ParticipantIndex,
) -> Result<(), TransitionError> {
    let result = match kind {
        AppKind::TicTacToe => tictactoe::TicTacToe::valid_transition(params, from, to, actor),
        AppKind::Collateral => collateral::Collateral::valid_transition(params, from, to, actor),
    };
    match &result {
        Err(err) => tracing::debug!(
            app = kind.name(),
            actor,
            from_version = from.version,
            to_version = to.version,
            ?err,
            "transition rejected"
        ),
        Ok(()) if to.is_final => tracing::debug!(
            app = kind.name(),
            actor,
            to_version = to.version,
            "final transition accepted"
        ),
        Ok(()) => {}
    }
    result
}
