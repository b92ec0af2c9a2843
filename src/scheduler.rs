use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerHandle(usize);

#[derive(Debug)]
struct Interval {
    period: Duration,
    next_due: Duration,
    cancelled: bool,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    intervals: Vec<Interval>,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    pub fn every(&mut self, period: Duration, now: Duration) -> TimerHandle {
        self.intervals.push(Interval {
            period,
            next_due: now + period,
            cancelled: false,
        });
        TimerHandle(self.intervals.len() - 1)
    }

    /// Number of periods that came due up to `now`, consuming them.
    /// Always zero for cancelled handles.
    pub fn fires(&mut self, handle: TimerHandle, now: Duration) -> u32 {
        let Some(interval) = self.intervals.get_mut(handle.0) else {
            return 0;
        };
        if interval.cancelled || interval.period.is_zero() {
            return 0;
        }
        let mut count = 0;
        while interval.next_due <= now {
            interval.next_due += interval.period;
            count += 1;
        }
        count
    }

    pub fn cancel_all(&mut self) {
        for interval in &mut self.intervals {
            interval.cancelled = true;
        }
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }
}
