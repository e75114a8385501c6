//! Domain identifiers (strongly-typed IDs).
//!
//! ULID ベースの ID + Phantom type パターン。
//! - **時刻でソート可能**: timestamp が先頭にあるため、BatchId は作成時刻から導出される
//! - `Id<T>` の `T` はマーカー型で、BatchId と TaskId を混同できない

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "batch-", "task-"）
    fn prefix() -> &'static str;
}

/// Generic ULID-backed identifier.
///
/// Serializes as the bare ULID string; `Display` adds the marker prefix.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }

    /// Creation time in unix milliseconds (the ULID time component).
    pub fn timestamp_ms(&self) -> u64 {
        self.ulid.timestamp_ms()
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Batch のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Batch {}

impl IdMarker for Batch {
    fn prefix() -> &'static str {
        "batch-"
    }
}

/// Task のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Task {}

impl IdMarker for Task {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// Identifier of one bulk operation.
pub type BatchId = Id<Batch>;

/// Identifier of one queued unit of work.
pub type TaskId = Id<Task>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_prefix() {
        let batch = BatchId::from_ulid(Ulid::new());
        let task = TaskId::from_ulid(Ulid::new());

        assert!(batch.to_string().starts_with("batch-"));
        assert!(task.to_string().starts_with("task-"));
        // let _: BatchId = task; // <- does not compile
    }

    #[test]
    fn serializes_as_bare_ulid() {
        let ulid = Ulid::new();
        let batch = BatchId::from_ulid(ulid);

        let json = serde_json::to_value(batch).unwrap();
        assert_eq!(json, serde_json::Value::String(ulid.to_string()));

        let back: BatchId = serde_json::from_value(json).unwrap();
        assert_eq!(back, batch);
    }

    #[test]
    fn timestamp_comes_from_ulid() {
        let ulid = Ulid::from_parts(1_700_000_000_000, 42);
        let batch = BatchId::from_ulid(ulid);
        assert_eq!(batch.timestamp_ms(), 1_700_000_000_000);
    }
}
