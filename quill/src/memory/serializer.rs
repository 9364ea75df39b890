//! Serializer for checkpoint state (state <-> bytes).

use crate::memory::checkpointer::CheckpointError;

/// Serializes and deserializes state for checkpoint storage.
///
/// **Interaction**: Used by SqliteSaver. MemorySaver keeps `S` values directly.
pub trait Serializer<S>: Send + Sync
where
    S: Clone + Send + Sync + 'static,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError>;

    fn deserialize(&self, data: &[u8]) -> Result<S, CheckpointError>;
}

/// JSON serializer. Deserialization runs the state's own validation, so a stored
/// payload that breaks an invariant fails to load.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<S> Serializer<S> for JsonSerializer
where
    S: Clone + Send + Sync + serde::Serialize + serde::de::DeserializeOwned + 'static,
{
    fn serialize(&self, state: &S) -> Result<Vec<u8>, CheckpointError> {
        serde_json::to_vec(state).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }

    fn deserialize(&self, data: &[u8]) -> Result<S, CheckpointError> {
        serde_json::from_slice(data).map_err(|e| CheckpointError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SessionState;

    #[test]
    fn json_serializer_rejects_garbage() {
        let ser = JsonSerializer;
        let err = Serializer::<SessionState>::deserialize(&ser, b"{not json").unwrap_err();
        assert!(matches!(err, CheckpointError::Serialization(_)));
    }

    #[test]
    fn json_serializer_roundtrips_session() {
        let ser = JsonSerializer;
        let mut state = SessionState::new();
        state.push_user("hello");
        let bytes = ser.serialize(&state).unwrap();
        let back: SessionState = ser.deserialize(&bytes).unwrap();
        assert_eq!(back, state);
    }
}
