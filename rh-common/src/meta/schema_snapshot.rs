use std::{
    collections::{hash_map::DefaultHasher, BTreeMap},
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use super::position::Position;

/// Tracked table definitions keyed by `db.tb`, valued by the ordered column signature.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub tables: BTreeMap<String, String>,
}

impl SchemaSnapshot {
    pub fn fingerprint(&self) -> String {
        let mut hasher = DefaultHasher::new();
        self.tables.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    pub fn table_key(schema: &str, tb: &str) -> String {
        format!("{}.{}", schema, tb)
    }
}

/// Schema as it was immediately before the schema event at `position`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDump {
    pub position: Position,
    pub snapshot: SchemaSnapshot,
    pub created_at: String,
}
