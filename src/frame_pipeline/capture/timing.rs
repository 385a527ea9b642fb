use std::time::{Duration, Instant};
use std::collections::HashMap;
use tracing::info;

#[derive(Debug, Clone)]
pub struct StepTiming {
    pub name: String,
    pub duration: Duration,
}

/// Named step durations for one processing tick, or accumulated over many.
#[derive(Debug, Default, Clone)]
pub struct TickTimings {
    steps: Vec<StepTiming>,
    step_map: HashMap<String, Duration>,
}

impl TickTimings {
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            step_map: HashMap::new(),
        }
    }

    pub fn add_step(&mut self, name: impl Into<String>, duration: Duration) {
        let name = name.into();
        self.steps.push(StepTiming {
            name: name.clone(),
            duration,
        });
        *self.step_map.entry(name).or_insert(Duration::ZERO) += duration;
    }

    /// Folds another tick's steps into this one.
    pub fn absorb(&mut self, other: &TickTimings) {
        for step in &other.steps {
            self.add_step(step.name.clone(), step.duration);
        }
    }

    pub fn total_duration(&self) -> Duration {
        self.steps.iter().map(|s| s.duration).sum()
    }

    /// Summed duration of every step recorded under `name`
    pub fn get_step(&self, name: &str) -> Option<Duration> {
        self.step_map.get(name).copied()
    }

    pub fn steps(&self) -> &[StepTiming] {
        &self.steps
    }

    /// Logs the per-step totals, largest first.
    pub fn log_summary(&self) {
        let total = self.total_duration();
        let mut totals: Vec<(&String, &Duration)> = self.step_map.iter().collect();
        totals.sort_by(|a, b| b.1.cmp(a.1));

        for (name, duration) in totals {
            let percentage = if total.as_secs_f64() > 0.0 {
                (duration.as_secs_f64() / total.as_secs_f64()) * 100.0
            } else {
                0.0
            };
            info!(
                step = %name,
                "{:>12.3}ms ({:>5.1}%)",
                duration.as_secs_f64() * 1000.0,
                percentage
            );
        }
        info!("Total {:.3}ms", total.as_secs_f64() * 1000.0);
    }
}

pub struct Timer {
    start: Instant,
    name: &'static str,
}

impl Timer {
    pub fn start(name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            name,
        }
    }

    pub fn stop(self) -> (&'static str, Duration) {
        (self.name, self.start.elapsed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_accumulates_by_name() {
        let mut tick = TickTimings::new();
        tick.add_step("downsample_depth", Duration::from_millis(2));
        tick.add_step("persist_depth", Duration::from_millis(3));

        let mut batch = TickTimings::new();
        batch.absorb(&tick);
        batch.absorb(&tick);

        assert_eq!(batch.steps().len(), 4);
        assert_eq!(batch.get_step("persist_depth"), Some(Duration::from_millis(6)));
        assert_eq!(batch.total_duration(), Duration::from_millis(10));
        assert_eq!(batch.get_step("missing"), None);
    }
}
