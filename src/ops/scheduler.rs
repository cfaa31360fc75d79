//! Virtual-time timer queue
//!
//! Timers do not run code; they yield the event they were armed with and
//! the owner dispatches it. Every timer belongs to a [`TimerScope`];
//! dropping the scope cancels whatever it still has pending.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

pub type TimerId = u64;
type ScopeId = u64;

#[derive(Debug)]
struct Timer<E> {
    id: TimerId,
    scope: ScopeId,
    due_ms: u64,
    period_ms: Option<u64>,
    event: E,
}

#[derive(Debug)]
struct TimerQueue<E> {
    now_ms: u64,
    next_timer: TimerId,
    next_scope: ScopeId,
    timers: Vec<Timer<E>>,
}

impl<E> TimerQueue<E> {
    fn arm(&mut self, scope: ScopeId, delay_ms: u64, period_ms: Option<u64>, event: E) -> TimerId {
        self.next_timer += 1;
        let id = self.next_timer;
        self.timers.push(Timer {
            id,
            scope,
            due_ms: self.now_ms + delay_ms,
            period_ms,
            event,
        });
        id
    }
}

/// Handle to the shared timer queue
#[derive(Debug)]
pub struct Scheduler<E> {
    queue: Rc<RefCell<TimerQueue<E>>>,
}

impl<E> Clone for Scheduler<E> {
    fn clone(&self) -> Self {
        Self {
            queue: Rc::clone(&self.queue),
        }
    }
}

impl<E: Clone> Default for Scheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Clone> Scheduler<E> {
    pub fn new() -> Self {
        Self {
            queue: Rc::new(RefCell::new(TimerQueue {
                now_ms: 0,
                next_timer: 0,
                next_scope: 0,
                timers: Vec::new(),
            })),
        }
    }

    /// Virtual time elapsed since the scheduler was created
    pub fn now(&self) -> Duration {
        Duration::from_millis(self.queue.borrow().now_ms)
    }

    /// Open a new scope that timers can be armed in
    pub fn scope(&self) -> TimerScope<E> {
        let mut queue = self.queue.borrow_mut();
        queue.next_scope += 1;
        TimerScope {
            id: queue.next_scope,
            queue: Rc::downgrade(&self.queue),
        }
    }

    /// Number of armed timers across all scopes
    pub fn pending(&self) -> usize {
        self.queue.borrow().timers.len()
    }

    /// Pop the earliest timer due at or before `deadline`.
    ///
    /// The clock moves to the timer's due time before the event is
    /// returned, so anything the caller arms while handling it is
    /// scheduled relative to the firing time. Interval timers are re-armed;
    /// one-shots are removed. Ties fire in arming order.
    pub fn pop_due(&self, deadline: Duration) -> Option<E> {
        let deadline_ms = deadline.as_millis() as u64;
        let mut queue = self.queue.borrow_mut();

        let idx = queue
            .timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due_ms <= deadline_ms)
            .min_by_key(|(_, t)| (t.due_ms, t.id))
            .map(|(i, _)| i)?;

        let due = queue.timers[idx].due_ms;
        queue.now_ms = queue.now_ms.max(due);

        let period = queue.timers[idx].period_ms;
        match period {
            Some(period) => {
                let timer = &mut queue.timers[idx];
                timer.due_ms += period;
                Some(timer.event.clone())
            }
            None => Some(queue.timers.swap_remove(idx).event),
        }
    }

    /// Move the clock forward to `deadline` without firing anything.
    /// Call after draining [`Scheduler::pop_due`].
    pub fn settle(&self, deadline: Duration) {
        let mut queue = self.queue.borrow_mut();
        queue.now_ms = queue.now_ms.max(deadline.as_millis() as u64);
    }
}

/// Owner of a group of timers. Dropping it cancels them.
#[derive(Debug)]
pub struct TimerScope<E> {
    id: ScopeId,
    queue: Weak<RefCell<TimerQueue<E>>>,
}

impl<E> TimerScope<E> {
    /// Arm a one-shot timer
    pub fn after(&self, delay: Duration, event: E) -> Option<TimerId> {
        let queue = self.queue.upgrade()?;
        let id = queue
            .borrow_mut()
            .arm(self.id, delay.as_millis() as u64, None, event);
        Some(id)
    }

    /// Arm an interval timer; the first firing is one period from now
    pub fn every(&self, period: Duration, event: E) -> Option<TimerId> {
        let queue = self.queue.upgrade()?;
        let period_ms = (period.as_millis() as u64).max(1);
        let id = queue
            .borrow_mut()
            .arm(self.id, period_ms, Some(period_ms), event);
        Some(id)
    }

    pub fn cancel(&self, timer: TimerId) {
        if let Some(queue) = self.queue.upgrade() {
            queue
                .borrow_mut()
                .timers
                .retain(|t| !(t.scope == self.id && t.id == timer));
        }
    }

    pub fn cancel_all(&self) {
        if let Some(queue) = self.queue.upgrade() {
            queue.borrow_mut().timers.retain(|t| t.scope != self.id);
        }
    }

    /// Timers this scope still has armed
    pub fn pending(&self) -> usize {
        self.queue
            .upgrade()
            .map(|q| q.borrow().timers.iter().filter(|t| t.scope == self.id).count())
            .unwrap_or(0)
    }
}

impl<E> Drop for TimerScope<E> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(s: &Scheduler<&'static str>, until: Duration) -> Vec<(u64, &'static str)> {
        let mut fired = Vec::new();
        while let Some(e) = s.pop_due(until) {
            fired.push((s.now().as_millis() as u64, e));
        }
        s.settle(until);
        fired
    }

    #[test]
    fn one_shots_fire_in_due_order() {
        let s = Scheduler::new();
        let scope = s.scope();
        scope.after(Duration::from_millis(300), "late");
        scope.after(Duration::from_millis(100), "early");
        scope.after(Duration::from_millis(100), "early-second");

        let fired = drain(&s, Duration::from_secs(1));
        assert_eq!(
            fired,
            vec![(100, "early"), (100, "early-second"), (300, "late")]
        );
        assert_eq!(s.pending(), 0);
        assert_eq!(s.now(), Duration::from_secs(1));
    }

    #[test]
    fn intervals_rearm() {
        let s = Scheduler::new();
        let scope = s.scope();
        scope.every(Duration::from_millis(250), "tick");

        let fired = drain(&s, Duration::from_millis(1000));
        assert_eq!(fired.len(), 4);
        assert_eq!(fired.last(), Some(&(1000, "tick")));
        assert_eq!(scope.pending(), 1);
    }

    #[test]
    fn timers_armed_while_draining_are_relative_to_fire_time() {
        let s = Scheduler::new();
        let scope = s.scope();
        scope.after(Duration::from_millis(100), "first");

        let deadline = Duration::from_millis(500);
        let mut fired = Vec::new();
        while let Some(e) = s.pop_due(deadline) {
            fired.push((s.now().as_millis(), e));
            if e == "first" {
                scope.after(Duration::from_millis(150), "second");
            }
        }
        assert_eq!(fired, vec![(100, "first"), (250, "second")]);
    }

    #[test]
    fn dropping_scope_cancels_its_timers_only() {
        let s = Scheduler::new();
        let keep = s.scope();
        keep.every(Duration::from_secs(10), "keep");
        {
            let view = s.scope();
            view.after(Duration::from_secs(1), "gone");
            view.every(Duration::from_secs(2), "gone-too");
            assert_eq!(s.pending(), 3);
        }
        assert_eq!(s.pending(), 1);
        assert_eq!(drain(&s, Duration::from_secs(10)), vec![(10_000, "keep")]);
    }

    #[test]
    fn cancel_single_timer() {
        let s = Scheduler::new();
        let scope = s.scope();
        let id = scope.after(Duration::from_secs(1), "a");
        scope.after(Duration::from_secs(1), "b");
        if let Some(id) = id {
            scope.cancel(id);
        }
        assert_eq!(drain(&s, Duration::from_secs(2)), vec![(1000, "b")]);
    }

    #[test]
    fn scope_outliving_scheduler_is_inert() {
        let scope = {
            let s: Scheduler<&'static str> = Scheduler::new();
            s.scope()
        };
        assert!(scope.after(Duration::from_secs(1), "x").is_none());
        assert_eq!(scope.pending(), 0);
    }
}
