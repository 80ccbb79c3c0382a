//! Session shared between concurrent operators.

use std::sync::Arc;

use abpanel_model::{EntryId, PanelError, Result};
use parking_lot::{Mutex, MutexGuard};
use tracing::info;

use crate::composer::PanelComposer;
use crate::engine::{Confirm, ExecutionOutcome};
use crate::history::UndoReport;
use crate::session::Session;

/// A [`Session`] behind a mutex.
///
/// Execution holds the lock while validating and again while committing, but
/// not while waiting for confirmation. The commit re-validates the plan
/// against the stock it finds, so two operators drawing on the same reagent
/// cannot both pass on one snapshot. A losing execution gets a fresh
/// `InsufficientStock`; it is never retried.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<Mutex<Session>>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.inner.lock()
    }

    /// Executes an operator's own selection against the shared inventory.
    ///
    /// `user` must not be blank. `composer` is cleared on commit.
    pub fn execute_with(
        &self,
        composer: &mut PanelComposer,
        user: &str,
        confirm: &dyn Confirm,
    ) -> Result<ExecutionOutcome> {
        let user = user.trim();
        if user.is_empty() {
            return Err(PanelError::validation("user", "user name is required"));
        }
        let plan = {
            let mut guard = self.inner.lock();
            let session = &mut *guard;
            session
                .engine
                .prepare(composer, &session.ledger, &session.history)?
        };

        if !confirm.confirm(&plan) {
            info!(panel = %plan.panel_name, user, "execution cancelled");
            return Ok(ExecutionOutcome::Cancelled);
        }

        let entry = {
            let mut guard = self.inner.lock();
            let session = &mut *guard;
            session
                .engine
                .commit(plan, &mut session.ledger, &mut session.history, user)?
        };
        composer.clear();
        Ok(ExecutionOutcome::Committed(entry))
    }

    pub fn undo(&self, id: EntryId) -> Result<UndoReport> {
        self.inner.lock().undo(id)
    }
}
