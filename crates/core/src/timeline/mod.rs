use std::collections::VecDeque;
use std::time::Duration;

/// Virtual time since the engine started. Never runs backwards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    now: Duration,
}

impl Clock {
    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn reset(&mut self) {
        self.now = Duration::ZERO;
    }

    /// Moves the clock forward to `time`. Earlier times are ignored.
    pub fn advance_to(&mut self, time: Duration) {
        self.now = self.now.max(time);
    }
}

/// Handle for a pending action, usable to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

#[derive(Debug, Clone)]
pub struct ScheduledEvent<T> {
    pub id: EventId,
    pub due: Duration,
    pub payload: T,
}

/// Single-threaded delayed-action queue.
///
/// Events fire in deadline order. Events sharing a deadline fire in the order
/// they were scheduled. While an event is being dispatched the clock reads its
/// deadline, so follow-up actions scheduled from it are timed from when it was
/// due rather than from when the host happened to tick.
#[derive(Debug)]
pub struct Scheduler<T> {
    clock: Clock,
    events: VecDeque<ScheduledEvent<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            clock: Clock::default(),
            events: VecDeque::new(),
            next_id: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.clock.now()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.events.front().map(|event| event.due)
    }

    pub fn is_pending(&self, id: EventId) -> bool {
        self.deadline_of(id).is_some()
    }

    pub fn deadline_of(&self, id: EventId) -> Option<Duration> {
        self.events
            .iter()
            .find(|event| event.id == id)
            .map(|event| event.due)
    }

    /// Queues `payload` to fire `delay` after the current time.
    pub fn schedule(&mut self, delay: Duration, payload: T) -> EventId {
        let id = EventId(self.next_id);
        self.next_id += 1;
        let due = self.clock.now() + delay;
        let index = self.events.partition_point(|event| event.due <= due);
        self.events.insert(index, ScheduledEvent { id, due, payload });
        id
    }

    /// Removes a pending event. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: EventId) -> bool {
        match self.events.iter().position(|event| event.id == id) {
            Some(index) => {
                self.events.remove(index);
                true
            }
            None => false,
        }
    }

    /// Pops the earliest event due at or before `now`, moving the clock to its
    /// deadline.
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledEvent<T>> {
        if self.events.front()?.due > now {
            return None;
        }
        let event = self.events.pop_front()?;
        self.clock.advance_to(event.due);
        Some(event)
    }

    /// Moves the clock to `now` once all due events have been dispatched.
    pub fn advance_to(&mut self, now: Duration) {
        self.clock.advance_to(now);
    }

    /// Drops every pending event and rewinds the clock.
    pub fn reset(&mut self) {
        self.events.clear();
        self.clock.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn drain(scheduler: &mut Scheduler<&'static str>, now: Duration) -> Vec<&'static str> {
        let mut fired = Vec::new();
        while let Some(event) = scheduler.pop_due(now) {
            fired.push(event.payload);
        }
        scheduler.advance_to(now);
        fired
    }

    #[test]
    fn clock_never_runs_backwards() {
        let mut clock = Clock::default();
        clock.advance_to(ms(10));
        clock.advance_to(ms(5));
        assert_eq!(clock.now(), ms(10));
        clock.reset();
        assert_eq!(clock.now(), Duration::ZERO);
    }

    #[test]
    fn fires_in_deadline_order_not_call_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(2000), "reset");
        scheduler.schedule(ms(500), "advance");
        scheduler.schedule(ms(50), "flash");

        assert_eq!(drain(&mut scheduler, ms(3000)), vec!["flash", "advance", "reset"]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn ties_fire_in_schedule_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(100), "first");
        scheduler.schedule(ms(100), "second");
        scheduler.schedule(ms(100), "third");
        assert_eq!(drain(&mut scheduler, ms(100)), vec!["first", "second", "third"]);
    }

    #[test]
    fn holds_events_until_due() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(500), "advance");
        assert!(drain(&mut scheduler, ms(499)).is_empty());
        assert_eq!(scheduler.next_deadline(), Some(ms(500)));
        assert_eq!(drain(&mut scheduler, ms(500)), vec!["advance"]);
    }

    #[test]
    fn delays_are_relative_to_current_time() {
        let mut scheduler = Scheduler::new();
        scheduler.advance_to(ms(1000));
        scheduler.schedule(ms(200), "later");
        assert_eq!(scheduler.next_deadline(), Some(ms(1200)));
    }

    #[test]
    fn clock_reads_deadline_during_dispatch() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(50), "step");
        let event = scheduler.pop_due(ms(500)).unwrap();
        assert_eq!(event.due, ms(50));
        assert_eq!(scheduler.now(), ms(50));
        scheduler.schedule(ms(50), "next");
        assert_eq!(scheduler.next_deadline(), Some(ms(100)));
    }

    #[test]
    fn cancelled_events_never_fire() {
        let mut scheduler = Scheduler::new();
        let keep = scheduler.schedule(ms(10), "keep");
        let drop = scheduler.schedule(ms(20), "drop");

        assert!(scheduler.cancel(drop));
        assert!(!scheduler.cancel(drop));
        assert!(scheduler.is_pending(keep));
        assert_eq!(drain(&mut scheduler, ms(100)), vec!["keep"]);
        assert!(!scheduler.is_pending(keep));
    }

    #[test]
    fn reset_clears_queue() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(ms(10), "pending");
        scheduler.advance_to(ms(5));
        scheduler.reset();
        assert!(scheduler.is_empty());
        assert_eq!(scheduler.now(), Duration::ZERO);
    }
}
