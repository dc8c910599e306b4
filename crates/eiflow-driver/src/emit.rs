use crate::event::StreamEvent;
use crate::expand::OutputRow;

/// How a processor's output relates to its input over time.
///
/// Rows are only ever added, never retracted, so the decompress
/// processor always reports `Slide`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProcessingMode {
    Slide,
}

/// The next processor in the pipeline.
///
/// A sink receives whole batches. A batch is never split across calls,
/// so a sink sees every row produced from a chunk or none of them.
pub trait EventSink {
    fn receive(&mut self, batch: Vec<StreamEvent>);
}

impl<F> EventSink for F
where
    F: FnMut(Vec<StreamEvent>),
{
    fn receive(&mut self, batch: Vec<StreamEvent>) {
        self(batch);
    }
}

/// Sink that keeps every batch it receives.
#[derive(Debug, Default)]
pub struct BatchCollector {
    pub batches: Vec<Vec<StreamEvent>>,
}

impl BatchCollector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All received events, batch boundaries dropped.
    pub fn events(&self) -> impl Iterator<Item = &StreamEvent> {
        self.batches.iter().flatten()
    }
}

impl EventSink for BatchCollector {
    fn receive(&mut self, batch: Vec<StreamEvent>) {
        self.batches.push(batch);
    }
}

/// Accumulates output events for one input chunk.
///
/// ```text
///   emit(rows, event) ─┐
///   emit(rows, event) ─┼─▶ pending ──flush──▶ sink.receive(batch)
///   emit(rows, event) ─┘          └─discard──▶ (dropped)
/// ```
#[derive(Debug, Default)]
pub struct FanOut {
    pending: Vec<StreamEvent>,
}

impl FanOut {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one output event per row, each a copy of `original`'s shell
    /// carrying the row's output values.
    pub fn emit(&mut self, rows: Vec<OutputRow>, original: &StreamEvent) {
        self.pending.reserve(rows.len());
        for row in rows {
            self.pending.push(original.with_output(row.into_output()));
        }
    }

    /// Queue one already built output event.
    pub fn push(&mut self, event: StreamEvent) {
        self.pending.push(event);
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Hand the pending batch to `sink` in one call. Returns the number
    /// of events delivered; an empty batch is not delivered.
    pub fn flush(&mut self, sink: &mut dyn EventSink) -> usize {
        let count = self.pending.len();
        if count > 0 {
            sink.receive(std::mem::take(&mut self.pending));
        }
        count
    }

    /// Drop the pending batch.
    pub fn discard(&mut self) {
        self.pending.clear();
    }
}
