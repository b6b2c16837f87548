//! Study stopwatch driven by one-second ticks.
//!
//! The timer only counts; recording happens when the caller hands the
//! `TimerStop` to `SessionStore::record_stop`.

/// Completed interval produced by stopping a running timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerStop {
    pub duration_secs: u64,
    pub course: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudyTimer {
    running: bool,
    elapsed_secs: u64,
    course: Option<String>,
}

impl StudyTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Course attributed to the next recorded interval.
    pub fn select_course(&mut self, course: impl Into<String>) {
        self.course = Some(course.into());
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Advances the counter by one second while running.
    pub fn tick(&mut self) {
        if self.running {
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
        }
    }

    /// Stops a running timer and resets the counter.
    ///
    /// Returns `None` when the timer was idle.
    pub fn stop(&mut self) -> Option<TimerStop> {
        if !self.running {
            return None;
        }
        self.running = false;
        let duration_secs = std::mem::take(&mut self.elapsed_secs);
        Some(TimerStop {
            duration_secs,
            course: self.course.clone(),
        })
    }

    /// Play/stop button behaviour.
    pub fn toggle(&mut self) -> Option<TimerStop> {
        if self.running {
            self.stop()
        } else {
            self.start();
            None
        }
    }

    /// Elapsed time as `HH:MM:SS`.
    pub fn display(&self) -> String {
        let secs = self.elapsed_secs;
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::StudyTimer;

    #[test]
    fn ticks_only_count_while_running() {
        let mut timer = StudyTimer::new();
        timer.tick();
        assert_eq!(timer.elapsed_secs(), 0);

        assert!(timer.toggle().is_none());
        for _ in 0..3725 {
            timer.tick();
        }
        assert_eq!(timer.display(), "01:02:05");
    }

    #[test]
    fn stopping_yields_interval_and_resets() {
        let mut timer = StudyTimer::new();
        timer.select_course("History");
        timer.start();
        timer.tick();
        timer.tick();

        let stop = timer.toggle().expect("running timer should stop");
        assert_eq!(stop.duration_secs, 2);
        assert_eq!(stop.course.as_deref(), Some("History"));
        assert_eq!(timer.elapsed_secs(), 0);
        assert!(!timer.is_running());
        assert!(timer.stop().is_none());
    }
}
