//! Conformance vectors for the application payload encodings.
//!
//! The on-chain validators decode the very same bytes these codecs produce, so
//! the encodings are pinned here as frozen hex strings. Each vector pairs a
//! logical payload with the exact bytes every implementation must produce for
//! it; the JSON export is what the contract test-suite consumes.
//!
//! # Stability Guarantee
//!
//! Vectors are **frozen** once published. A layout change adds new vectors with a
//! version suffix (e.g. `tictactoe_initial_v2`) and keeps the old ones.

use crate::{
    app::{AppData, Cell, CollateralData, TicTacToeData},
    int256::Int256,
};
use commonware_codec::Encode;
use commonware_utils::{from_hex, hex};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Schema version of the JSON export.
pub const CONFORMANCE_VECTORS_SCHEMA_VERSION: u32 = 1;

const TICTACTOE_INITIAL_HEX: &str = "00000000000000000000";
const TICTACTOE_FIRST_MOVE_HEX: &str = "01000001000000000000";
const TICTACTOE_WON_HEX: &str = "01020001000202010101";

const COLLATERAL_EMPTY_HEX: &str = concat!(
    "0000000000000000000000000000000000000000000000000000000000000020", // tuple head
    "0000000000000000000000000000000000000000000000000000000000000000", // asset count
);

const COLLATERAL_ZERO_HEX: &str = concat!(
    "0000000000000000000000000000000000000000000000000000000000000020", // tuple head
    "0000000000000000000000000000000000000000000000000000000000000001", // asset count
    "0000000000000000000000000000000000000000000000000000000000000020", // offset of asset 0
    "0000000000000000000000000000000000000000000000000000000000000002", // asset 0 length
    "0000000000000000000000000000000000000000000000000000000000000000", // asset 0 participant 0
    "0000000000000000000000000000000000000000000000000000000000000000", // asset 0 participant 1
);

const COLLATERAL_TRANSFER_HEX: &str = concat!(
    "0000000000000000000000000000000000000000000000000000000000000020", // tuple head
    "0000000000000000000000000000000000000000000000000000000000000001", // asset count
    "0000000000000000000000000000000000000000000000000000000000000020", // offset of asset 0
    "0000000000000000000000000000000000000000000000000000000000000002", // asset 0 length
    "fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffb", // -5
    "0000000000000000000000000000000000000000000000000000000000000005", // 5
);

const COLLATERAL_MIXED_HEX: &str = concat!(
    "0000000000000000000000000000000000000000000000000000000000000020", // tuple head
    "0000000000000000000000000000000000000000000000000000000000000002", // asset count
    "0000000000000000000000000000000000000000000000000000000000000040", // offset of asset 0
    "00000000000000000000000000000000000000000000000000000000000000a0", // offset of asset 1
    "0000000000000000000000000000000000000000000000000000000000000002", // asset 0 length
    "0000000000000000000000000000000000000000000000000000000000000001", // 1
    "ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff", // -1
    "0000000000000000000000000000000000000000000000000000000000000000", // asset 1 length
);

const COLLATERAL_EXTREMES_HEX: &str = concat!(
    "0000000000000000000000000000000000000000000000000000000000000020", // tuple head
    "0000000000000000000000000000000000000000000000000000000000000001", // asset count
    "0000000000000000000000000000000000000000000000000000000000000020", // offset of asset 0
    "0000000000000000000000000000000000000000000000000000000000000002", // asset 0 length
    "8000000000000000000000000000000000000000000000000000000000000000", // -2^255
    "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff", // 2^255 - 1
);

/// A single vector: a payload and its frozen encoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConformanceVector {
    pub name: String,
    pub description: String,
    /// Application whose decoder applies (see [`crate::app::AppKind::name`]).
    pub app: String,
    /// Human-readable form of the payload.
    pub value: serde_json::Value,
    pub data_hex: String,
    pub data_length: usize,
}

impl ConformanceVector {
    fn new(name: &str, description: &str, data: &AppData, data_hex: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            app: data.kind().name().to_string(),
            value: describe(data),
            data_hex: data_hex.to_string(),
            data_length: data_hex.len() / 2,
        }
    }

    /// The frozen bytes.
    pub fn bytes(&self) -> Vec<u8> {
        from_hex(&self.data_hex).expect("conformance vector hex is valid")
    }

    /// Check `actual` against the frozen bytes.
    pub fn verify(&self, actual: &[u8]) -> Result<(), VectorMismatch> {
        if actual != self.bytes().as_slice() {
            return Err(VectorMismatch {
                name: self.name.clone(),
                expected_hex: self.data_hex.clone(),
                actual_hex: hex(actual),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
#[error("conformance vector '{name}' mismatch:\n  expected: {expected_hex}\n  actual:   {actual_hex}")]
pub struct VectorMismatch {
    pub name: String,
    pub expected_hex: String,
    pub actual_hex: String,
}

/// The complete set of vectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConformanceVectors {
    pub schema_version: u32,
    pub vectors: Vec<ConformanceVector>,
}

impl ConformanceVectors {
    pub fn canonical() -> Self {
        let vectors = canonical_payloads()
            .iter()
            .map(|(name, description, data, data_hex)| {
                ConformanceVector::new(name, description, data, data_hex)
            })
            .collect();
        Self {
            schema_version: CONFORMANCE_VECTORS_SCHEMA_VERSION,
            vectors,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ConformanceVector> {
        self.vectors.iter().find(|v| v.name == name)
    }

    /// Encode every canonical payload and compare against its frozen bytes.
    pub fn verify_all() -> Result<(), VectorMismatch> {
        let vectors = Self::canonical();
        for (name, _, data, _) in canonical_payloads() {
            let vector = vectors.get(name).expect("vector exists for every payload");
            vector.verify(data.encode().as_ref())?;
        }
        Ok(())
    }
}

/// Export the vectors as pretty-printed JSON.
pub fn export_conformance_vectors_json() -> String {
    serde_json::to_string_pretty(&ConformanceVectors::canonical())
        .expect("ConformanceVectors serialization cannot fail")
}

fn canonical_payloads() -> Vec<(&'static str, &'static str, AppData, &'static str)> {
    use Cell::{Empty as E, O, X};

    vec![
        (
            "tictactoe_initial",
            "Empty board, participant 0 to move",
            TicTacToeData::new(0).into(),
            TICTACTOE_INITIAL_HEX,
        ),
        (
            "tictactoe_first_move",
            "Participant 0 marked (2,0), participant 1 to move",
            TicTacToeData {
                next_actor: 1,
                grid: [E, E, X, E, E, E, E, E, E],
            }
            .into(),
            TICTACTOE_FIRST_MOVE_HEX,
        ),
        (
            "tictactoe_won",
            "Participant 0 completed the bottom row",
            TicTacToeData {
                next_actor: 1,
                grid: [O, E, X, E, O, O, X, X, X],
            }
            .into(),
            TICTACTOE_WON_HEX,
        ),
        (
            "collateral_empty",
            "Ledger without assets",
            CollateralData::default().into(),
            COLLATERAL_EMPTY_HEX,
        ),
        (
            "collateral_zero",
            "Single asset, both balances zero",
            CollateralData::zero(1).into(),
            COLLATERAL_ZERO_HEX,
        ),
        (
            "collateral_transfer",
            "Participant 0 paid 5 to participant 1",
            CollateralData::new(vec![vec![Int256::from(-5i64), Int256::from(5i64)]]).into(),
            COLLATERAL_TRANSFER_HEX,
        ),
        (
            "collateral_mixed",
            "Two assets, the second with an empty balance row",
            CollateralData::new(vec![vec![Int256::ONE, Int256::from(-1i64)], vec![]]).into(),
            COLLATERAL_MIXED_HEX,
        ),
        (
            "collateral_extremes",
            "int256 minimum and maximum",
            CollateralData::new(vec![vec![Int256::MIN, Int256::MAX]]).into(),
            COLLATERAL_EXTREMES_HEX,
        ),
    ]
}

fn describe(data: &AppData) -> serde_json::Value {
    match data {
        AppData::TicTacToe(game) => json!({
            "next_actor": game.next_actor,
            "grid": game.grid.iter().map(|cell| *cell as u8).collect::<Vec<_>>(),
        }),
        AppData::Collateral(ledger) => json!({
            "balances": ledger
                .balances
                .iter()
                .map(|row| row.iter().map(|b| b.to_string()).collect::<Vec<_>>())
                .collect::<Vec<_>>(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use commonware_codec::Decode;

    #[test]
    fn canonical_payloads_match_frozen_bytes() {
        ConformanceVectors::verify_all().unwrap();
    }

    #[test]
    fn frozen_bytes_decode_to_payloads() {
        let vectors = ConformanceVectors::canonical();
        for (name, _, data, _) in canonical_payloads() {
            let vector = vectors.get(name).unwrap();
            let decoded = AppData::decode_cfg(vector.bytes().as_slice(), &data.kind()).unwrap();
            assert_eq!(decoded, data, "{name}");
            assert_eq!(vector.data_length, vector.bytes().len(), "{name}");
        }
    }

    #[test]
    fn vector_names_are_unique() {
        let vectors = ConformanceVectors::canonical();
        let mut names: Vec<_> = vectors.vectors.iter().map(|v| v.name.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), vectors.vectors.len());
    }

    #[test]
    fn mismatch_reports_both_encodings() {
        let vectors = ConformanceVectors::canonical();
        let vector = vectors.get("tictactoe_initial").unwrap();
        let err = vector.verify(&[1, 0, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(err.actual_hex, "01000000000000000000");
        assert!(err.to_string().contains("tictactoe_initial"));
    }

    #[test]
    fn json_export_roundtrips() {
        let json = export_conformance_vectors_json();
        let parsed: ConformanceVectors = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, ConformanceVectors::canonical());
        assert_eq!(parsed.schema_version, CONFORMANCE_VECTORS_SCHEMA_VERSION);

        let transfer = parsed.get("collateral_transfer").unwrap();
        assert_eq!(transfer.app, "collateral");
        assert_eq!(transfer.value["balances"][0][0], "-5");
    }
}
