//! Statechan execution layer.
//!
//! This crate contains the validity predicates of the channel applications, the
//! mutators producing the states those predicates accept, and the client-side
//! acceptance policy for collateral-ledger payments.
//!
//! ## Determinism requirements
//! - Validators are pure: no clock, no randomness, no I/O.
//! - Every check must match the on-chain validator bit-for-bit, including the order
//!   in which checks fail and checked 256-bit arithmetic.
//!
//! ## Validating an update (example)
//! ```rust,ignore
//! use statechan_execution::{apps::tictactoe, AppRegistry};
//! use statechan_types::AppKind;
//!
//! let mut registry = AppRegistry::new();
//! registry.register(params.app, AppKind::TicTacToe);
//! registry.valid_init(&params, &state)?;
//!
//! let mut next = state.clone();
//! tictactoe::set(&mut next, 1, 1, 0)?;
//! registry.valid_transition(&params, &state, &next, 0)?;
//! ```

pub mod apps;
pub mod policy;

pub use apps::{
    registry::AppRegistry, valid_init, valid_transition, ChannelApp, MutationError,
    TransitionError,
};
pub use policy::{
    CollateralSource, PaymentAcceptancePolicy, PaymentContext, PolicyConfig, UpdateHandler,
    UpdateRejection,
};
