//! Task Queue - Deferred work on the UI thread
//!
//! Two kinds of deferred work:
//! - **next tick** (`defer`): runs once the current dispatch has finished,
//!   when the host calls `run_until_idle`
//! - **delayed** (`defer_after`): runs once its deadline has passed, when the
//!   host calls `run_due` / `run_due_at`
//!
//! Nothing is cancellable. A task that finds its target gone must do nothing;
//! capture `Weak` handles and tokens, not strong references.
//!
//! The queue is a cheap `Rc` handle; clone it into whatever needs to schedule.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::warn;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce()>;

struct Timer {
    deadline: Instant,
    seq: u64,
    task: Task,
}

#[derive(Default)]
struct Queue {
    next_tick: VecDeque<Task>,
    timers: Vec<Timer>,
    next_seq: u64,
}

/// Single-threaded task queue shared by a window and its controls.
#[derive(Clone, Default)]
pub struct TaskQueue {
    inner: Rc<RefCell<Queue>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `task` after the current dispatch pass.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.inner.borrow_mut().next_tick.push_back(Box::new(task));
    }

    /// Run `task` once `delay` has elapsed. A delay past the end of the
    /// clock's range can never come due; the task is dropped.
    pub fn defer_after(&self, delay: Duration, task: impl FnOnce() + 'static) {
        match Instant::now().checked_add(delay) {
            Some(deadline) => self.defer_until(deadline, task),
            None => warn!(?delay, "Delay out of range, dropping task"),
        }
    }

    /// Run `task` once `deadline` has passed.
    pub fn defer_until(&self, deadline: Instant, task: impl FnOnce() + 'static) {
        let mut queue = self.inner.borrow_mut();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.timers.push(Timer {
            deadline,
            seq,
            task: Box::new(task),
        });
    }

    /// Number of next-tick tasks waiting.
    pub fn pending(&self) -> usize {
        self.inner.borrow().next_tick.len()
    }

    /// Number of delayed tasks waiting.
    pub fn pending_timers(&self) -> usize {
        self.inner.borrow().timers.len()
    }

    pub fn is_idle(&self) -> bool {
        let queue = self.inner.borrow();
        queue.next_tick.is_empty() && queue.timers.is_empty()
    }

    /// Earliest delayed-task deadline, for sizing a poll timeout.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.borrow().timers.iter().map(|t| t.deadline).min()
    }

    /// Drain next-tick tasks, including ones queued while draining.
    /// Returns how many ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        // The borrow ends before the task runs so tasks can schedule more work.
        while let Some(task) = self.pop_next_tick() {
            task();
            ran += 1;
        }
        ran
    }

    /// Run delayed tasks that are due now, then drain next-tick tasks.
    pub fn run_due(&self) -> usize {
        self.run_due_at(Instant::now())
    }

    /// Run delayed tasks whose deadline is at or before `now` (earliest first,
    /// ties in scheduling order), then drain next-tick tasks.
    pub fn run_due_at(&self, now: Instant) -> usize {
        let mut ran = self.run_until_idle();
        while let Some(task) = self.pop_due_timer(now) {
            task();
            ran += 1;
            ran += self.run_until_idle();
        }
        ran
    }

    fn pop_next_tick(&self) -> Option<Task> {
        self.inner.borrow_mut().next_tick.pop_front()
    }

    fn pop_due_timer(&self, now: Instant) -> Option<Task> {
        let mut queue = self.inner.borrow_mut();
        let index = queue
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline <= now)
            .min_by_key(|(_, t)| (t.deadline, t.seq))
            .map(|(i, _)| i)?;
        Some(queue.timers.swap_remove(index).task)
    }
}

impl std::fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .field("pending_timers", &self.pending_timers())
            .finish()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_defer_runs_only_when_drained() {
        let queue = TaskQueue::new();
        let hits = Rc::new(Cell::new(0));

        let h = hits.clone();
        queue.defer(move || h.set(h.get() + 1));
        assert_eq!(hits.get(), 0);
        assert_eq!(queue.pending(), 1);

        assert_eq!(queue.run_until_idle(), 1);
        assert_eq!(hits.get(), 1);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_tasks_run_in_order_and_may_reschedule() {
        let queue = TaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let (l, q) = (log.clone(), queue.clone());
        queue.defer(move || {
            l.borrow_mut().push(1);
            let l2 = l.clone();
            q.defer(move || l2.borrow_mut().push(3));
        });
        let l = log.clone();
        queue.defer(move || l.borrow_mut().push(2));

        assert_eq!(queue.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec![1, 2, 3]);
    }

    #[test]
    fn test_out_of_range_delay_does_not_panic() {
        let queue = TaskQueue::new();
        queue.defer_after(Duration::MAX, || panic!("never due"));
        assert_eq!(queue.pending_timers(), 0);
        assert_eq!(queue.run_due(), 0);
    }

    #[test]
    fn test_delayed_task_waits_for_deadline() {
        let queue = TaskQueue::new();
        let fired = Rc::new(Cell::new(false));
        let start = Instant::now();

        let f = fired.clone();
        queue.defer_until(start + Duration::from_millis(100), move || f.set(true));

        queue.run_until_idle();
        assert!(!fired.get());

        queue.run_due_at(start + Duration::from_millis(50));
        assert!(!fired.get());

        queue.run_due_at(start + Duration::from_millis(100));
        assert!(fired.get());
        assert_eq!(queue.pending_timers(), 0);
    }

    #[test]
    fn test_due_timers_run_earliest_first() {
        let queue = TaskQueue::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let start = Instant::now();

        for (label, ms) in [("late", 30), ("early", 10), ("tie", 10)] {
            let l = log.clone();
            queue.defer_until(start + Duration::from_millis(ms), move || {
                l.borrow_mut().push(label)
            });
        }

        assert_eq!(queue.next_deadline(), Some(start + Duration::from_millis(10)));
        queue.run_due_at(start + Duration::from_secs(1));
        assert_eq!(*log.borrow(), vec!["early", "tie", "late"]);
    }
}
