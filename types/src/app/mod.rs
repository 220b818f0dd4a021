//! Application payloads.
//!
//! Every channel state carries its application's payload as opaque bytes. The
//! bytes are not self-describing: which layout applies is decided by the app the
//! channel was opened with, so [`AppKind`] travels alongside the bytes and selects
//! the decoder (`AppData::decode_cfg(bytes, &kind)`).

pub mod abi;
mod collateral;
mod tictactoe;

pub use collateral::{CollateralData, LedgerError};
pub use tictactoe::{
    next_actor, Cell, MoveError, Outcome, RawTicTacToeData, TicTacToeData, BOARD_SIDE, GRID_SIZE,
    MAX_CELL_VALUE, WINNING_TRIPLES,
};

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

/// Applications with a validator in this workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AppKind {
    TicTacToe = 0,
    Collateral = 1,
}

impl AppKind {
    pub const ALL: [AppKind; 2] = [AppKind::TicTacToe, AppKind::Collateral];

    pub fn name(self) -> &'static str {
        match self {
            Self::TicTacToe => "tictactoe",
            Self::Collateral => "collateral",
        }
    }
}

impl Write for AppKind {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for AppKind {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = u8::read(reader)?;
        match value {
            0 => Ok(Self::TicTacToe),
            1 => Ok(Self::Collateral),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for AppKind {
    const SIZE: usize = 1;
}

/// Decoded payload of any supported application.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppData {
    TicTacToe(TicTacToeData),
    Collateral(CollateralData),
}

impl AppData {
    pub fn kind(&self) -> AppKind {
        match self {
            Self::TicTacToe(_) => AppKind::TicTacToe,
            Self::Collateral(_) => AppKind::Collateral,
        }
    }

    pub fn as_tictactoe(&self) -> Option<&TicTacToeData> {
        match self {
            Self::TicTacToe(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_collateral(&self) -> Option<&CollateralData> {
        match self {
            Self::Collateral(data) => Some(data),
            _ => None,
        }
    }
}

impl From<TicTacToeData> for AppData {
    fn from(data: TicTacToeData) -> Self {
        Self::TicTacToe(data)
    }
}

impl From<CollateralData> for AppData {
    fn from(data: CollateralData) -> Self {
        Self::Collateral(data)
    }
}

/// Writes the payload only; the kind is not part of the payload bytes.
impl Write for AppData {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::TicTacToe(data) => data.write(writer),
            Self::Collateral(data) => data.write(writer),
        }
    }
}

impl Read for AppData {
    type Cfg = AppKind;

    fn read_cfg(reader: &mut impl Buf, kind: &Self::Cfg) -> Result<Self, Error> {
        match kind {
            AppKind::TicTacToe => Ok(Self::TicTacToe(TicTacToeData::read(reader)?)),
            AppKind::Collateral => Ok(Self::Collateral(CollateralData::read(reader)?)),
        }
    }
}

impl EncodeSize for AppData {
    fn encode_size(&self) -> usize {
        match self {
            Self::TicTacToe(data) => data.encode_size(),
            Self::Collateral(data) => data.encode_size(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int256::Int256;
    use commonware_codec::{Decode, DecodeExt, Encode};

    #[test]
    fn app_kind_roundtrip() {
        for kind in AppKind::ALL {
            let encoded = kind.encode();
            assert_eq!(AppKind::decode(encoded.as_ref()).unwrap(), kind);
        }
        assert!(matches!(
            AppKind::decode([7u8].as_slice()),
            Err(Error::InvalidEnum(7))
        ));
    }

    #[test]
    fn kind_selects_the_decoder() {
        let game = AppData::from(TicTacToeData::new(1));
        let encoded = game.encode();
        assert_eq!(
            AppData::decode_cfg(encoded.as_ref(), &AppKind::TicTacToe).unwrap(),
            game
        );
        assert!(AppData::decode_cfg(encoded.as_ref(), &AppKind::Collateral).is_err());

        let ledger = AppData::from(CollateralData::new(vec![vec![
            Int256::from(-9i64),
            Int256::from(9i64),
        ]]));
        let encoded = ledger.encode();
        assert_eq!(
            AppData::decode_cfg(encoded.as_ref(), &AppKind::Collateral).unwrap(),
            ledger
        );
        assert!(AppData::decode_cfg(encoded.as_ref(), &AppKind::TicTacToe).is_err());
    }

    #[test]
    fn accessors_match_variant() {
        let game = AppData::from(TicTacToeData::new(0));
        assert_eq!(game.kind(), AppKind::TicTacToe);
        assert!(game.as_tictactoe().is_some());
        assert!(game.as_collateral().is_none());

        let ledger = AppData::from(CollateralData::zero(1));
        assert_eq!(ledger.kind(), AppKind::Collateral);
        assert!(ledger.as_collateral().is_some());
        assert!(ledger.as_tictactoe().is_none());
    }
}
