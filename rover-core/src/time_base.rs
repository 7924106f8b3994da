//! Time base
//!
//! A fixed 10 ms tick advances every elapsed-time counter, raises the display
//! refresh flag, runs the course clock and counts down the switch debounce
//! timers. [`TimeBase::tick`] is the only writer of the counters apart from
//! resets issued by the control loop; every counter is a single atomic word,
//! so readers never observe a half written value.

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::config::{DEBOUNCE_TICKS, TICKS_PER_SECOND};

/// Elapsed-time counters owned by the time base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timer {
    /// Since power-on, gates the boot handshake
    Boot,
    /// Duration of the current timed motion command
    Motion,
    /// Line-follow phase timer
    Phase,
    /// Line-follow maneuver timer, reset independently of the phase timer
    Wait,
}

impl Timer {
    const COUNT: usize = 4;

    const fn index(self) -> usize {
        match self {
            Self::Boot => 0,
            Self::Motion => 1,
            Self::Phase => 2,
            Self::Wait => 3,
        }
    }
}

/// Debounced mechanical switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Switch {
    /// SW1, emergency stop
    Stop,
    /// SW2, identification screen
    Identify,
}

impl Switch {
    pub const ALL: [Switch; 2] = [Switch::Stop, Switch::Identify];

    const fn index(self) -> usize {
        match self {
            Self::Stop => 0,
            Self::Identify => 1,
        }
    }
}

/// Switches whose debounce countdown ran out on a tick
///
/// The owner of each listed switch re-enables its edge detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Expired([bool; 2]);

impl Expired {
    pub fn contains(&self, switch: Switch) -> bool {
        self.0[switch.index()]
    }

    pub fn iter(self) -> impl Iterator<Item = Switch> {
        Switch::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

/// One-shot countdown of a switch plus its latched press
struct Debounce {
    remaining: AtomicU32,
    pressed: AtomicBool,
}

impl Debounce {
    const fn new() -> Self {
        Self {
            remaining: AtomicU32::new(0),
            pressed: AtomicBool::new(false),
        }
    }
}

/// Seconds counter driven by the tick while running
struct CourseClock {
    running: AtomicBool,
    subticks: AtomicU32,
    seconds: AtomicU32,
}

pub struct TimeBase {
    counters: [AtomicU32; Timer::COUNT],
    refresh: AtomicBool,
    course: CourseClock,
    switches: [Debounce; 2],
}

impl Default for TimeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeBase {
    pub const fn new() -> Self {
        Self {
            counters: [
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
                AtomicU32::new(0),
            ],
            refresh: AtomicBool::new(false),
            course: CourseClock {
                running: AtomicBool::new(false),
                subticks: AtomicU32::new(0),
                seconds: AtomicU32::new(0),
            },
            switches: [Debounce::new(), Debounce::new()],
        }
    }

    /// Advances everything by one tick. Bounded, never waits.
    pub fn tick(&self) -> Expired {
        for counter in &self.counters {
            counter.fetch_add(1, Ordering::Relaxed);
        }

        if self.course.running.load(Ordering::Relaxed) {
            let subticks = self.course.subticks.load(Ordering::Relaxed) + 1;
            if subticks >= TICKS_PER_SECOND {
                self.course.subticks.store(0, Ordering::Relaxed);
                self.course.seconds.fetch_add(1, Ordering::Relaxed);
            } else {
                self.course.subticks.store(subticks, Ordering::Relaxed);
            }
        }

        let mut expired = Expired::default();
        for switch in Switch::ALL {
            let remaining = &self.switches[switch.index()].remaining;
            let left = remaining.load(Ordering::Relaxed);
            if left > 0 {
                remaining.store(left - 1, Ordering::Relaxed);
                expired.0[switch.index()] = left == 1;
            }
        }

        self.refresh.store(true, Ordering::Release);
        expired
    }

    pub fn elapsed(&self, timer: Timer) -> u32 {
        self.counters[timer.index()].load(Ordering::Relaxed)
    }

    pub fn reset(&self, timer: Timer) {
        self.counters[timer.index()].store(0, Ordering::Relaxed);
    }

    /// Consumes the "display needs refresh" flag
    pub fn take_refresh(&self) -> bool {
        self.refresh.swap(false, Ordering::Acquire)
    }

    pub fn start_course(&self) {
        self.course.subticks.store(0, Ordering::Relaxed);
        self.course.seconds.store(0, Ordering::Relaxed);
        self.course.running.store(true, Ordering::Release);
    }

    pub fn stop_course(&self) {
        self.course.running.store(false, Ordering::Release);
    }

    pub fn course_running(&self) -> bool {
        self.course.running.load(Ordering::Acquire)
    }

    pub fn course_seconds(&self) -> u32 {
        self.course.seconds.load(Ordering::Relaxed)
    }

    /// Called from the switch edge context: latches the press and arms the
    /// countdown. The caller keeps the edge source disabled until the switch
    /// shows up in an [`Expired`] set.
    pub fn press(&self, switch: Switch) {
        let debounce = &self.switches[switch.index()];
        debounce.pressed.store(true, Ordering::Release);
        debounce.remaining.store(DEBOUNCE_TICKS, Ordering::Relaxed);
    }

    /// Consumes a latched press
    pub fn take_press(&self, switch: Switch) -> bool {
        self.switches[switch.index()].pressed.swap(false, Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_advances_every_counter() {
        let time = TimeBase::new();
        for _ in 0..7 {
            time.tick();
        }
        assert_eq!(time.elapsed(Timer::Boot), 7);
        assert_eq!(time.elapsed(Timer::Motion), 7);
        assert_eq!(time.elapsed(Timer::Phase), 7);
        assert_eq!(time.elapsed(Timer::Wait), 7);
    }

    #[test]
    fn test_reset_only_touches_one_counter() {
        let time = TimeBase::new();
        time.tick();
        time.tick();
        time.reset(Timer::Motion);
        time.tick();
        assert_eq!(time.elapsed(Timer::Motion), 1);
        assert_eq!(time.elapsed(Timer::Boot), 3);
    }

    #[test]
    fn test_refresh_flag_is_consumed_once() {
        let time = TimeBase::new();
        assert!(!time.take_refresh());
        time.tick();
        assert!(time.take_refresh());
        assert!(!time.take_refresh());
    }

    #[test]
    fn test_course_clock_counts_seconds_only_while_running() {
        let time = TimeBase::new();
        for _ in 0..250 {
            time.tick();
        }
        assert_eq!(time.course_seconds(), 0);

        time.start_course();
        for _ in 0..250 {
            time.tick();
        }
        assert_eq!(time.course_seconds(), 2);

        time.stop_course();
        for _ in 0..500 {
            time.tick();
        }
        assert_eq!(time.course_seconds(), 2);
    }

    #[test]
    fn test_debounce_expires_after_countdown() {
        let time = TimeBase::new();
        time.press(Switch::Identify);
        assert!(time.take_press(Switch::Identify));
        assert!(!time.take_press(Switch::Identify));

        for _ in 0..DEBOUNCE_TICKS - 1 {
            assert_eq!(time.tick(), Expired::default());
        }
        let expired = time.tick();
        assert!(expired.contains(Switch::Identify));
        assert!(!expired.contains(Switch::Stop));

        // one-shot
        assert_eq!(time.tick(), Expired::default());
    }
}
