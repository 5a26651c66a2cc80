use std::sync::Arc;

use crate::model::Employee;

/// Handed out when a fetch cycle starts; presented again to [`RecordStore::apply`]
/// or [`RecordStore::abandon`] when the cycle ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ApplyOutcome {
    Applied { generation: u64, count: usize },
    /// A newer fetch had already been applied; the snapshot was dropped.
    Stale { generation: u64, current: u64 },
}

/// The full employee list from the most recent accepted fetch.
///
/// Snapshots are replaced wholesale and never mutated. Every fetch cycle takes
/// a [`FetchTicket`] before it goes out; a result is only applied when no fetch
/// that started later has been applied in the meantime, so overlapping timer
/// and manual refreshes resolve to the newest request.
#[derive(Clone, Debug)]
pub struct RecordStore {
    snapshot: Arc<[Employee]>,
    issued: u64,
    applied: u64,
    in_flight: usize,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            snapshot: Arc::from(Vec::new()),
            issued: 0,
            applied: 0,
            in_flight: 0,
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.in_flight += 1;
        FetchTicket {
            generation: self.issued,
        }
    }

    pub fn apply(&mut self, ticket: FetchTicket, records: Vec<Employee>) -> ApplyOutcome {
        self.settle();
        if ticket.generation <= self.applied {
            return ApplyOutcome::Stale {
                generation: ticket.generation,
                current: self.applied,
            };
        }
        let count = records.len();
        self.snapshot = Arc::from(records);
        self.applied = ticket.generation;
        ApplyOutcome::Applied {
            generation: ticket.generation,
            count,
        }
    }

    /// Ends a fetch cycle that failed. The current snapshot is kept.
    pub fn abandon(&mut self, _ticket: FetchTicket) {
        self.settle();
    }

    /// Ends every outstanding fetch cycle, for callers that cancel their tasks.
    pub fn abandon_all(&mut self) {
        self.in_flight = 0;
    }

    fn settle(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    pub fn records(&self) -> &[Employee] {
        &self.snapshot
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Generation of the snapshot currently held (0 before the first fetch).
    pub fn generation(&self) -> u64 {
        self.applied
    }

    /// Whether any issued ticket has not yet been applied or abandoned.
    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }
}
