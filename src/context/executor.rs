use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

pub type Task = Box<dyn FnOnce() + Send>;

/// Serial task queue drained by the host loop on the main thread.
///
/// Posting never runs the task in-line, so callbacks queued during a stack
/// operation cannot re-enter the stack while it is being mutated.
#[derive(Clone, Default)]
pub struct MainExecutor {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl MainExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(Box::new(task));
    }

    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Run queued tasks in FIFO order, including tasks posted while draining.
    pub(crate) fn drain(&self) -> usize {
        let mut ran = 0;
        loop {
            let next = self
                .queue
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }
}
