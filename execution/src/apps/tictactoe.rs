//! Tic-tac-toe: alternating marks, winner takes the whole pot.

use super::{ChannelApp, MutationError, TransitionError};
use commonware_codec::{DecodeExt, Encode};
use primitive_types::U256;
use statechan_types::{
    app::{next_actor, Outcome, RawTicTacToeData, GRID_SIZE},
    AppKind, Params, ParticipantIndex, State, TicTacToeData, NUM_PARTS,
};

pub struct TicTacToe;

impl ChannelApp for TicTacToe {
    const KIND: AppKind = AppKind::TicTacToe;

    fn valid_init(params: &Params, state: &State) -> Result<(), TransitionError> {
        if params.num_parts() != NUM_PARTS {
            return Err(TransitionError::WrongParticipantCount(params.num_parts()));
        }
        let data = TicTacToeData::decode(state.data.as_slice())?;
        if !data.is_empty_board() {
            return Err(TransitionError::InvalidInitialGrid);
        }
        if state.is_final {
            return Err(TransitionError::InitialStateFinal);
        }
        if usize::from(data.next_actor) >= NUM_PARTS {
            return Err(TransitionError::InvalidNextActor(data.next_actor));
        }
        Ok(())
    }

    fn valid_transition(
        params: &Params,
        from: &State,
        to: &State,
        actor: ParticipantIndex,
    ) -> Result<(), TransitionError> {
        if !from.allocation.assets_equal(&to.allocation) {
            return Err(TransitionError::AssetMismatch);
        }
        let from_data = TicTacToeData::decode(from.data.as_slice())?;
        // Read raw so an out-of-range mark is reported as such.
        let to_raw = RawTicTacToeData::decode(to.data.as_slice())?;

        if from_data.next_actor != actor {
            return Err(TransitionError::WrongActor {
                expected: from_data.next_actor,
                got: actor,
            });
        }
        if params.num_parts() != NUM_PARTS {
            return Err(TransitionError::WrongParticipantCount(params.num_parts()));
        }
        let expected_next = next_actor(from_data.next_actor);
        if to_raw.next_actor != expected_next {
            return Err(TransitionError::TurnOrderViolation {
                expected: expected_next,
                got: to_raw.next_actor,
            });
        }
        if let Some(cell) = to_raw.invalid_cell() {
            return Err(TransitionError::InvalidMarkValue {
                cell,
                value: to_raw.grid[cell],
            });
        }
        let to_data = TicTacToeData::try_from(to_raw)?;
        check_single_move(&from_data, &to_data)?;

        let outcome = to_data.check_final();
        if to.is_final != outcome.is_final {
            return Err(TransitionError::FinalityMismatch {
                expected: outcome.is_final,
            });
        }

        let expected = match outcome.winner {
            Some(winner) => {
                if from
                    .allocation
                    .balances
                    .iter()
                    .any(|row| row.len() != NUM_PARTS)
                {
                    return Err(TransitionError::AllocationMismatch);
                }
                compute_final_balances(&from.allocation.balances, winner)
                    .ok_or(TransitionError::AllocationOverflow)?
            }
            None => from.allocation.balances.clone(),
        };
        if to.allocation.balances != expected {
            return Err(TransitionError::AllocationMismatch);
        }
        Ok(())
    }
}

/// Exactly one cell changed, and it was empty before.
fn check_single_move(from: &TicTacToeData, to: &TicTacToeData) -> Result<(), TransitionError> {
    let mut changed = None;
    for idx in 0..GRID_SIZE {
        if from.grid[idx] == to.grid[idx] {
            continue;
        }
        if !from.grid[idx].is_empty() {
            return Err(TransitionError::CellOverwrite(idx));
        }
        if changed.is_some() {
            return Err(TransitionError::MultipleChanges);
        }
        changed = Some(idx);
    }
    changed.map(|_| ()).ok_or(TransitionError::NoChange)
}

/// Per asset, the winner receives the sum of all balances and everyone else zero.
///
/// Returns `None` if a pot exceeds uint256 or a row has no slot for `winner`.
pub fn compute_final_balances(
    balances: &[Vec<U256>],
    winner: ParticipantIndex,
) -> Option<Vec<Vec<U256>>> {
    balances
        .iter()
        .map(|row| {
            let pot = row
                .iter()
                .try_fold(U256::zero(), |acc, balance| acc.checked_add(*balance))?;
            let mut payout = vec![U256::zero(); row.len()];
            *payout.get_mut(usize::from(winner))? = pot;
            Some(payout)
        })
        .collect()
}

/// Mark cell (`x`, `y`) for `actor` in `state`, settling the pot if the move ends
/// the game. The result passes [`TicTacToe::valid_transition`] from the old state.
///
/// # Panics
///
/// Panics if `actor` is not the participant whose turn it is.
pub fn set(
    state: &mut State,
    x: usize,
    y: usize,
    actor: ParticipantIndex,
) -> Result<Outcome, MutationError> {
    let mut data = TicTacToeData::decode(state.data.as_slice())?;
    data.apply_move(x, y, actor)?;

    let outcome = data.check_final();
    if outcome.is_final {
        if let Some(winner) = outcome.winner {
            state.allocation.balances =
                compute_final_balances(&state.allocation.balances, winner)
                    .ok_or(MutationError::Payout)?;
        }
        state.is_final = true;
    }
    state.data = data.encode().to_vec();

    tracing::debug!(x, y, actor, winner = ?outcome.winner, "mark placed\n{}", data);
    Ok(outcome)
}
