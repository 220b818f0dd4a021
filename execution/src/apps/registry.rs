//! Registry resolving a channel's [`AppId`] to the application that validates it.
//!
//! # Example
//! ```rust,ignore
//! use statechan_execution::apps::registry::AppRegistry;
//! use statechan_types::{Address, AppId, AppKind};
//!
//! let mut registry = AppRegistry::default();
//! let game = AppId(Address([0xaa; 20]));
//! registry.register(game, AppKind::TicTacToe);
//! assert_eq!(registry.resolve(&game), Ok(AppKind::TicTacToe));
//! ```

use super::TransitionError;
use commonware_codec::Decode;
use statechan_types::{AppData, AppId, AppKind, Params, ParticipantIndex, State};
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct AppRegistry {
    apps: HashMap<AppId, AppKind>,
}

impl AppRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `app`, returning the kind previously registered under it.
    pub fn register(&mut self, app: AppId, kind: AppKind) -> Option<AppKind> {
        self.apps.insert(app, kind)
    }

    pub fn resolve(&self, app: &AppId) -> Result<AppKind, TransitionError> {
        self.apps
            .get(app)
            .copied()
            .ok_or(TransitionError::UnknownApp(*app))
    }

    pub fn is_registered(&self, app: &AppId) -> bool {
        self.apps.contains_key(app)
    }

    pub fn len(&self) -> usize {
        self.apps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    /// Decode `bytes` with the payload layout of `app`.
    pub fn decode_data(&self, app: &AppId, bytes: &[u8]) -> Result<AppData, TransitionError> {
        let kind = self.resolve(app)?;
        Ok(AppData::decode_cfg(bytes, &kind)?)
    }

    pub fn valid_init(&self, params: &Params, state: &State) -> Result<(), TransitionError> {
        let kind = self.resolve(&params.app)?;
        if state.app != params.app {
            return Err(TransitionError::AppDataMismatch);
        }
        super::valid_init(kind, params, state)
    }

    pub fn valid_transition(
        &self,
        params: &Params,
        from: &State,
        to: &State,
        actor: ParticipantIndex,
    ) -> Result<(), TransitionError> {
        let kind = self.resolve(&params.app)?;
        if from.app != params.app || to.app != params.app {
            return Err(TransitionError::AppDataMismatch);
        }
        super::valid_transition(kind, params, from, to, actor)
    }
}
