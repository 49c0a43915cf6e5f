mod gop;

pub use gop::GopCollector;

/// Whether the drain loop should keep feeding records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Receives every record a parser completes.
pub trait Collector<T> {
    fn offer(&mut self, record: T) -> Flow;
}

impl<T, F> Collector<T> for F
where
    F: FnMut(T) -> Flow,
{
    fn offer(&mut self, record: T) -> Flow {
        self(record)
    }
}

/// Keeps the first `target` records and stops once it has them.
pub struct FixedCount<T> {
    target: usize,
    items: Vec<T>,
}

impl<T> FixedCount<T> {
    pub fn new(target: usize) -> Self {
        Self {
            target,
            items: Vec::with_capacity(target),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.items.len() == self.target
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

impl<T> Collector<T> for FixedCount<T> {
    fn offer(&mut self, record: T) -> Flow {
        if self.is_complete() {
            return Flow::Stop;
        }
        self.items.push(record);
        if self.is_complete() {
            Flow::Stop
        } else {
            Flow::Continue
        }
    }
}
