/// Exponential cooling from `max_temperature` towards `min_temperature`.
///
/// Step `i` of `steps` runs at `max * (min / max)^(i / steps)`, so the first
/// step is at `max` and the last one just above `min`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoolingSchedule {
    /// Temperature of the first step.
    pub max_temperature: f64,
    /// Temperature the schedule decays towards.
    pub min_temperature: f64,
    /// Number of steps.
    pub steps: usize,
}

impl CoolingSchedule {
    /// Creates a new schedule.
    #[must_use]
    pub fn new(max_temperature: f64, min_temperature: f64, steps: usize) -> Self {
        Self {
            max_temperature,
            min_temperature,
            steps,
        }
    }

    /// Returns the completed fraction of the run at `step`, in `[0, 1)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, step: usize) -> f64 {
        if self.steps == 0 {
            return 0.0;
        }
        step as f64 / self.steps as f64
    }

    /// Returns the temperature at `step`.
    #[must_use]
    pub fn temperature(&self, step: usize) -> f64 {
        let ratio = self.min_temperature / self.max_temperature;
        self.max_temperature * ratio.powf(self.progress(step))
    }

    /// Iterates over the temperature of every step.
    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.steps).map(|step| self.temperature(step))
    }
}
