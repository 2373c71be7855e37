//! Request-generation tracking
//!
//! Every outgoing request gets a ticket carrying a monotonically increasing
//! generation. Only the ticket of the latest issued generation may settle;
//! anything older is stale and its response is dropped. Issuing a new ticket
//! aborts the task of the previous one.

use tokio::task::AbortHandle;

/// Tag carried by one outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    generation: u64,
}

impl RequestTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Default)]
pub struct RequestTracker {
    issued: u64,
    settled: u64,
    in_flight: Option<(u64, AbortHandle)>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding whatever is in flight
    pub fn issue(&mut self) -> RequestTicket {
        self.cancel();
        self.issued += 1;
        RequestTicket { generation: self.issued }
    }

    /// Bind the task running `ticket` so it can be aborted later.
    /// A stale ticket's task is aborted immediately.
    pub fn attach(&mut self, ticket: &RequestTicket, handle: AbortHandle) {
        if self.is_current(ticket) {
            self.in_flight = Some((ticket.generation, handle));
        } else {
            handle.abort();
        }
    }

    /// Is this still the latest unsettled request?
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        ticket.generation == self.issued && ticket.generation > self.settled
    }

    /// Whether a request is outstanding
    pub fn is_pending(&self) -> bool {
        self.issued > self.settled
    }

    /// Accept the response for `ticket`. Returns false when the ticket is
    /// stale, in which case the caller must discard the response.
    pub fn settle(&mut self, ticket: &RequestTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.settled = ticket.generation;
        if matches!(self.in_flight, Some((generation, _)) if generation == ticket.generation) {
            self.in_flight = None;
        }
        true
    }

    /// Abort the in-flight task, if any
    pub fn cancel(&mut self) {
        if let Some((generation, handle)) = self.in_flight.take() {
            log::debug!("Aborting request generation {}", generation);
            handle.abort();
        }
    }

    /// Abort in-flight work and make every outstanding ticket stale
    pub fn invalidate(&mut self) {
        self.cancel();
        self.issued += 1;
        self.settled = self.issued;
    }

    pub fn latest_generation(&self) -> u64 {
        self.issued
    }
}

impl Drop for RequestTracker {
    fn drop(&mut self) {
        self.cancel();
    }
}
