use chrono::{DateTime, Duration, Local};

/// A logical simulation clock that yields evenly spaced timestamps.
///
/// The `Clock` stands in for a wall-clock timer in batch runs and tests:
/// each tick yields the step index and the simulated local time
/// `start + step * step`. A clock whose horizon leaves chrono's date range
/// ends at the last representable step.
///
/// # Examples
///
/// ```
/// use chrono::{Duration, Local, TimeZone, Timelike};
/// use microgrid_sim::sim::clock::Clock;
///
/// let start = Local.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
/// let mut clock = Clock::new(start, Duration::hours(1), 3);
/// let mut hours = Vec::new();
///
/// clock.run(|_, at| hours.push(at.hour()));
/// assert_eq!(hours, vec![0, 1, 2]);
/// ```
pub struct Clock {
    /// Current step of the simulation
    current: usize,
    /// Total steps to run in the simulation
    total: usize,
    /// Simulated time of step 0
    start: DateTime<Local>,
    /// Simulated time between steps
    step: Duration,
}

impl Clock {
    /// Creates a new clock.
    ///
    /// # Arguments
    ///
    /// * `start` - Simulated time of the first step
    /// * `step` - Simulated time between consecutive steps
    /// * `total` - The total number of steps the clock will run
    pub fn new(start: DateTime<Local>, step: Duration, total: usize) -> Self {
        Self {
            current: 0,
            total,
            start,
            step,
        }
    }

    /// Simulated duration of one step in hours.
    pub fn step_hours(&self) -> f64 {
        self.step.num_milliseconds() as f64 / 3_600_000.0
    }

    /// Timestamp of an arbitrary step index, or `None` past the date range.
    pub fn time_of(&self, step: usize) -> Option<DateTime<Local>> {
        let n = i32::try_from(step).ok()?;
        let offset = self.step.checked_mul(n)?;
        self.start.checked_add_signed(offset)
    }

    /// Returns `true` once every step has been yielded.
    pub fn is_done(&self) -> bool {
        self.current >= self.total
    }

    /// Advances the clock by one step.
    ///
    /// # Returns
    ///
    /// * `Some((step, time))` - The step number (starting from 0) and its simulated time
    /// * `None` - If the clock has reached its total steps, or the next
    ///   timestamp is out of range (the clock is then done)
    pub fn tick(&mut self) -> Option<(usize, DateTime<Local>)> {
        if self.current >= self.total {
            return None;
        }
        let step = self.current;
        match self.time_of(step) {
            Some(at) => {
                self.current += 1;
                Some((step, at))
            }
            None => {
                self.current = self.total;
                None
            }
        }
    }

    /// Runs a function for each remaining step in the clock.
    ///
    /// # Arguments
    ///
    /// * `f` - A function taking the step number and its simulated time
    pub fn run(&mut self, mut f: impl FnMut(usize, DateTime<Local>)) {
        while let Some((step, at)) = self.tick() {
            f(step, at);
        }
    }
}
