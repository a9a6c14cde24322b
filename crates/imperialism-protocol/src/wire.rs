//! Binary and JSON encodings for values that cross the engine boundary.

use rmp_serde::{decode, encode};
use thiserror::Error;

use crate::{ClientIntent, TurnEvent, TurnResult};

#[derive(Debug, Error)]
pub enum WireError {
    #[error("encode error: {0}")]
    Encode(#[from] encode::Error),
    #[error("decode error: {0}")]
    Decode(#[from] decode::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn serialize_intent(intent: &ClientIntent) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(intent)?)
}

pub fn deserialize_intent(bytes: &[u8]) -> Result<ClientIntent, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_events(events: &[TurnEvent]) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(events)?)
}

pub fn deserialize_events(bytes: &[u8]) -> Result<Vec<TurnEvent>, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn serialize_turn_result(result: &TurnResult) -> Result<Vec<u8>, WireError> {
    Ok(encode::to_vec_named(result)?)
}

pub fn deserialize_turn_result(bytes: &[u8]) -> Result<TurnResult, WireError> {
    Ok(decode::from_slice(bytes)?)
}

pub fn turn_result_to_json(result: &TurnResult) -> Result<String, WireError> {
    Ok(serde_json::to_string(result)?)
}

/// Deterministic hash of a turn result, for replay and desync checks.
///
/// Hashes the MessagePack-serialized result using FNV-1a 64-bit.
pub fn turn_result_hash(result: &TurnResult) -> Result<u64, WireError> {
    let bytes = serialize_turn_result(result)?;
    Ok(hash_bytes_fnv1a64(&bytes))
}

/// Deterministic, stable 64-bit hash for raw bytes (FNV-1a).
pub fn hash_bytes_fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    let mut hash = OFFSET_BASIS;
    for &byte in bytes {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        NationId, PlannedAction, RejectedOrder, RejectionReason, RoadSegment, TilePosition,
        WorkforceAction, WorkforceId, WorkforceType,
    };

    fn sample_result() -> TurnResult {
        let id = WorkforceId::from_u128(7);
        TurnResult {
            turn: 3,
            roads: vec![RoadSegment::new(
                TilePosition::new(1, 1),
                TilePosition::new(1, 2),
            )],
            rejected: vec![RejectedOrder {
                workforce: id,
                nation: NationId(1),
                order: PlannedAction {
                    target: TilePosition::new(1, 2),
                    action: WorkforceAction::Move,
                },
                reason: RejectionReason::Occupied {
                    by: WorkforceId::from_u128(8),
                },
            }],
            ..TurnResult::default()
        }
    }

    #[test]
    fn turn_result_survives_msgpack() {
        let result = sample_result();
        let bytes = serialize_turn_result(&result).unwrap();
        assert_eq!(deserialize_turn_result(&bytes).unwrap(), result);
    }

    #[test]
    fn hash_is_stable_for_equal_results() {
        assert_eq!(
            turn_result_hash(&sample_result()).unwrap(),
            turn_result_hash(&sample_result()).unwrap()
        );
        let mut other = sample_result();
        other.turn = 4;
        assert_ne!(
            turn_result_hash(&sample_result()).unwrap(),
            turn_result_hash(&other).unwrap()
        );
    }

    #[test]
    fn intents_decode_from_binary() {
        let intent = ClientIntent::AddWorkforce {
            row: 4,
            column: 13,
            kind: WorkforceType::Engineer,
        };
        let bytes = serialize_intent(&intent).unwrap();
        assert_eq!(deserialize_intent(&bytes).unwrap(), intent);

        let edit = ClientIntent::SetProperty {
            key: "title".into(),
            value: serde_json::json!({"en": "The Great War", "year": 1914}),
        };
        let bytes = serialize_intent(&edit).unwrap();
        assert_eq!(deserialize_intent(&bytes).unwrap(), edit);
    }

    #[test]
    fn fnv_matches_reference_vector() {
        assert_eq!(hash_bytes_fnv1a64(b""), 0xcbf29ce484222325);
        assert_eq!(hash_bytes_fnv1a64(b"a"), 0xaf63dc4c8601ec8c);
    }
}
