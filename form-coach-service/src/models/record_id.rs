use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier a store assigned to an inserted row.
///
/// Tables created by the bundled migrations use UUID keys. Supabase projects
/// may key the same tables with an identity column, so integer ids are
/// accepted too and echoed back as numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl From<Uuid> for RecordId {
    fn from(id: Uuid) -> Self {
        RecordId::Text(id.to_string())
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => f.write_str(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_identity_and_uuid_keys() {
        let int: RecordId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(int, RecordId::Int(42));
        assert_eq!(serde_json::to_value(&int).unwrap(), json!(42));

        let uuid = Uuid::new_v4();
        let text: RecordId = serde_json::from_value(json!(uuid)).unwrap();
        assert_eq!(text, RecordId::from(uuid));
        assert_eq!(text.to_string(), uuid.to_string());
    }
}
