//! Admission control.
//!
//! # Responsibilities
//! - Bound the number of requests in flight (and so upstream fan-out)
//! - Reject, never queue, once the bound is reached
//!
//! # Design Decisions
//! - A fixed-size semaphore; slots are taken with a non-blocking `try_acquire`
//! - The slot lives in an owned permit, released on drop on every exit path,
//!   cancellation included
//! - Body size is bounded separately by the request translator

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use crate::observability::metrics;

/// Fixed-capacity admission gate shared by all request tasks.
#[derive(Debug)]
pub struct AdmissionControl {
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl AdmissionControl {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Take a slot if one is free right now.
    pub fn try_admit(&self) -> Option<AdmissionPermit> {
        match self.slots.clone().try_acquire_owned() {
            Ok(permit) => {
                metrics::set_in_flight(self.in_flight());
                Some(AdmissionPermit {
                    permit: Some(permit),
                    slots: self.slots.clone(),
                    capacity: self.capacity,
                })
            }
            Err(_) => None,
        }
    }

    /// Requests currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.capacity - self.slots.available_permits()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// A held admission slot.
///
/// When dropped, the slot is released back to the gate.
#[derive(Debug)]
pub struct AdmissionPermit {
    permit: Option<OwnedSemaphorePermit>,
    slots: Arc<Semaphore>,
    capacity: usize,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        drop(self.permit.take());
        metrics::set_in_flight(self.capacity - self.slots.available_permits());
    }
}
