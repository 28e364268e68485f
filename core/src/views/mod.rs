//! Per-view state owned by each page.
//!
//! # Design
//! Each page owns one state struct; nothing is shared between pages and
//! every page re-fetches when it is created. Async work is tied to the
//! page's `ViewLifetime`:
//!
//! - `begin_load` hands out a `LoadTicket` with a fresh generation. Only the
//!   newest load may write its result back; older ones are dropped.
//! - Unmounting (through a `ViewHandle`, or by dropping the state) cancels
//!   the lifetime's token. In-flight requests raced through
//!   `LoadTicket::run` resolve to `None` and their results never land.
//!
//! Errors are caught at the view boundary and stored as the message the
//! page renders inline. Nothing is retried.

pub mod dashboard;
pub mod new_task;
pub mod pets;

use std::future::Future;

use tokio_util::sync::CancellationToken;

pub use dashboard::{DashboardState, TodayEntry};
pub use new_task::{NewTaskForm, NewTaskView};
pub use pets::{PetEdit, PetForm, PetsView};

/// Permission to write one async result back into a view.
#[derive(Debug, Clone)]
pub struct LoadTicket {
    generation: u64,
    cancel: CancellationToken,
}

impl LoadTicket {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` unless the view goes away first.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

/// Detached handle the page owner keeps to unmount a view.
#[derive(Debug, Clone)]
pub struct ViewHandle {
    token: CancellationToken,
}

impl ViewHandle {
    pub fn unmount(&self) {
        self.token.cancel();
    }
}

/// Mount state of one view.
#[derive(Debug)]
pub struct ViewLifetime {
    token: CancellationToken,
    generation: u64,
}

impl Default for ViewLifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewLifetime {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            generation: 0,
        }
    }

    pub fn handle(&self) -> ViewHandle {
        ViewHandle {
            token: self.token.clone(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        !self.token.is_cancelled()
    }

    pub fn unmount(&self) {
        self.token.cancel();
    }

    /// Start a load that supersedes every earlier one.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
            cancel: self.token.child_token(),
        }
    }

    /// Ticket for a mutation. It does not supersede loads in flight.
    pub fn mutation(&self) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            cancel: self.token.child_token(),
        }
    }

    /// Whether a load's result may still be written.
    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.is_mounted() && !ticket.is_cancelled() && ticket.generation == self.generation
    }
}

impl Drop for ViewLifetime {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
