use std::collections::HashMap;

use tracing::debug;

/// What a tool call looked like when it was requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRecord {
    pub name: String,
    pub query: String,
}

/// Run-scoped mapping from tool call id to the tool name and originating query.
///
/// Requests and their results arrive as separate events; this table is how a result is reunited
/// with the call that produced it. Entries are only ever added or overwritten.
#[derive(Debug, Default)]
pub struct CorrelationTable {
    calls: HashMap<String, CallRecord>,
}

impl CorrelationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a call, replacing any earlier call with the same id.
    pub fn record<I, N, Q>(&mut self, id: I, name: N, query: Q)
    where
        I: Into<String>,
        N: Into<String>,
        Q: Into<String>,
    {
        let id = id.into();
        let record = CallRecord {
            name: name.into(),
            query: query.into(),
        };
        if let Some(previous) = self.calls.insert(id.clone(), record) {
            debug!("Tool call id {} reused, replacing {}", id, previous.name);
        }
    }

    pub fn get(&self, id: &str) -> Option<&CallRecord> {
        self.calls.get(id)
    }

    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_get() {
        let mut table = CorrelationTable::new();
        assert!(table.is_empty());

        table.record("c1", "search_tool", "VOO");
        let record = table.get("c1").unwrap();
        assert_eq!(record.name, "search_tool");
        assert_eq!(record.query, "VOO");
        assert!(table.get("c2").is_none());
    }

    #[test]
    fn test_duplicate_id_overwrites() {
        let mut table = CorrelationTable::new();
        table.record("c1", "search_tool", "VOO");
        table.record("c1", "get_current_date", "");

        assert_eq!(table.len(), 1);
        assert_eq!(table.get("c1").unwrap().name, "get_current_date");
    }
}
