//! Types shared by the channel application validators.
//!
//! [`channel`] holds the snapshot a state-channel client hands to an application,
//! [`app`] the application payloads and their wire codecs, and [`golden_vectors`]
//! the frozen encodings every implementation of those codecs must reproduce.

pub mod app;
pub use app::{AppData, AppKind, CollateralData, LedgerError, MoveError, TicTacToeData};
pub mod channel;
pub use channel::{
    participant_index, Address, Allocation, AppId, Asset, Params, ParticipantIndex, State,
    NUM_PARTS,
};
pub mod golden_vectors;
pub mod int256;
pub use int256::{Int256, WORD_SIZE};
