/// Fixed timestep accumulator.
/// Game logic and physics advance in whole steps of `dt` regardless of frame time.
pub struct FixedTimestep {
    dt: f32,
    accumulator: f32,
    /// Cap on steps per frame, prevents the spiral of death after a stall.
    max_steps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_steps: 10,
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() || frame_dt <= 0.0 {
            return 0;
        }
        self.accumulator = (self.accumulator + frame_dt).min(self.dt * self.max_steps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }
}

/// Handle to a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct Timer<K> {
    id: TimerId,
    remaining: f32,
    key: K,
}

/// One-shot timers owned by the game and advanced by the fixed step.
///
/// Each timer carries an owner key `K` (usually an `EntityId`); firing yields
/// the key back to the caller instead of running a callback, so the owner is
/// looked up again at fire time and a despawned owner is simply skipped.
/// Timers fire in deadline order; ties fire in scheduling order.
pub struct TimerQueue<K> {
    timers: Vec<Timer<K>>,
    next_id: u64,
}

impl<K: Clone + PartialEq> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedule `key` to fire after `delay` seconds.
    pub fn schedule(&mut self, delay: f32, key: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            remaining: delay.max(0.0),
            key,
        });
        id
    }

    /// Cancel a single timer. Returns whether it was still pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    /// Cancel every pending timer owned by `key`. Returns how many were dropped.
    pub fn cancel_owner(&mut self, key: &K) -> usize {
        let before = self.timers.len();
        self.timers.retain(|t| &t.key != key);
        before - self.timers.len()
    }

    /// Advance all timers by `dt` seconds and return the keys that fired.
    pub fn advance(&mut self, dt: f32) -> Vec<K> {
        let mut fired: Vec<(f32, u64, K)> = Vec::new();
        self.timers.retain_mut(|t| {
            t.remaining -= dt;
            if t.remaining <= 0.0 {
                fired.push((t.remaining, t.id.0, t.key.clone()));
                false
            } else {
                true
            }
        });
        fired.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        fired.into_iter().map(|(_, _, key)| key).collect()
    }

    /// Number of pending timers.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}

impl<K: Clone + PartialEq> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_step_exact() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn accumulates_partial() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(0.008), 0);
        assert_eq!(ts.accumulate(0.010), 1);
    }

    #[test]
    fn caps_steps_per_frame() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(1.0), 10);
        assert_eq!(ts.accumulate(0.001), 0);
    }

    #[test]
    fn ignores_negative_and_nan_frames() {
        let mut ts = FixedTimestep::new(1.0 / 60.0);
        assert_eq!(ts.accumulate(-1.0), 0);
        assert_eq!(ts.accumulate(f32::NAN), 0);
        assert_eq!(ts.accumulate(1.0 / 60.0), 1);
    }

    #[test]
    fn timer_fires_once_after_delay() {
        let mut q = TimerQueue::new();
        q.schedule(0.65, 7u32);
        let mut fired = Vec::new();
        for _ in 0..38 {
            fired.extend(q.advance(1.0 / 60.0));
        }
        assert!(fired.is_empty(), "fired early after 38 steps");
        for _ in 0..10 {
            fired.extend(q.advance(1.0 / 60.0));
        }
        assert_eq!(fired, vec![7]);
        assert_eq!(q.pending(), 0);
    }

    #[test]
    fn timers_fire_in_deadline_order() {
        let mut q = TimerQueue::new();
        q.schedule(0.3, "late");
        q.schedule(0.1, "early");
        q.schedule(0.1, "early-second");
        assert_eq!(q.advance(1.0), vec!["early", "early-second", "late"]);
    }

    #[test]
    fn cancel_and_cancel_owner() {
        let mut q = TimerQueue::new();
        let a = q.schedule(1.0, 1u32);
        q.schedule(1.0, 2u32);
        q.schedule(2.0, 2u32);
        assert!(q.cancel(a));
        assert!(!q.cancel(a));
        assert_eq!(q.pending(), 2);
        assert_eq!(q.cancel_owner(&2), 2);
        assert_eq!(q.pending(), 0);
        assert!(q.advance(5.0).is_empty());
    }
}
