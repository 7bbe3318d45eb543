mod schedule;

pub use schedule::CoolingSchedule;

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::error::{AnnealError, Result};

/// A search state that can be scored, perturbed and restored.
///
/// `Clone` is the snapshot operation: the driver clones the state whenever it
/// records a new best.
pub trait AnnealState: Clone {
    /// Token recording what a move changed.
    type Undo;

    /// Returns the score to minimize.
    fn energy(&self) -> f64;

    /// Perturbs the state in place and returns the token to revert it.
    fn do_move<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Self::Undo;

    /// Reverts the move that produced `undo`.
    fn undo_move(&mut self, undo: Self::Undo);

    /// Called before every move with the completed fraction of the run, in
    /// `[0, 1)`. States use it to shrink their move size; the default does
    /// nothing.
    fn cool(&mut self, _progress: f64) {}
}

/// Simulated annealing with exponential cooling and the Metropolis rule.
#[derive(Debug, Clone)]
pub struct Anneal {
    schedule: CoolingSchedule,
    seed: u64,
    progress_interval: Option<usize>,
}

impl Anneal {
    /// Creates a new `Anneal` run.
    ///
    /// * `max_temperature` - Temperature of the first step.
    /// * `min_temperature` - Temperature the schedule decays towards.
    /// * `steps` - Number of proposed moves.
    #[must_use]
    pub fn new(max_temperature: f64, min_temperature: f64, steps: usize) -> Self {
        Self {
            schedule: CoolingSchedule::new(max_temperature, min_temperature, steps),
            seed: 0,
            progress_interval: None,
        }
    }

    /// Sets the seed of the random source driving moves and acceptance.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Logs progress every `interval` steps; zero disables progress logging.
    ///
    /// Defaults to a thousandth of the run.
    #[must_use]
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = Some(interval);
        self
    }

    /// Returns the cooling schedule.
    #[must_use]
    pub fn schedule(&self) -> &CoolingSchedule {
        &self.schedule
    }

    /// Runs the search and returns the lowest-energy state seen.
    ///
    /// # Errors
    ///
    /// Returns [`AnnealError::InvalidTemperature`] if either temperature is not
    /// finite and positive.
    pub fn execute<S: AnnealState>(&self, initial: S) -> Result<S> {
        self.execute_with(initial, |_, _| {})
    }

    /// Like [`execute`](Self::execute), calling `on_best` with the initial
    /// state and with every new best state and its energy.
    ///
    /// # Errors
    ///
    /// Returns [`AnnealError::InvalidTemperature`] if either temperature is not
    /// finite and positive.
    pub fn execute_with<S, F>(&self, initial: S, mut on_best: F) -> Result<S>
    where
        S: AnnealState,
        F: FnMut(&S, f64),
    {
        self.validate()?;

        let schedule = &self.schedule;
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut current = initial;
        let mut current_energy = current.energy();
        let mut best = current.clone();
        let mut best_energy = current_energy;
        on_best(&best, best_energy);

        info!(
            steps = schedule.steps,
            max_temperature = schedule.max_temperature,
            min_temperature = schedule.min_temperature,
            energy = current_energy,
            "annealing started"
        );

        let interval = self
            .progress_interval
            .unwrap_or_else(|| (schedule.steps / 1000).max(1));
        let start = Instant::now();
        let mut accepted = 0usize;

        for (step, temperature) in schedule.iter().enumerate() {
            if interval > 0 && step % interval == 0 {
                debug!(
                    step,
                    temperature,
                    best_energy,
                    elapsed = start.elapsed().as_secs_f64(),
                    "annealing progress"
                );
            }

            current.cool(schedule.progress(step));
            let undo = current.do_move(&mut rng);
            let energy = current.energy();
            let delta = energy - current_energy;

            if delta <= 0.0 || rng.gen::<f64>() < (-delta / temperature).exp() {
                accepted += 1;
                current_energy = energy;
                if energy < best_energy {
                    best_energy = energy;
                    best = current.clone();
                    on_best(&best, best_energy);
                }
            } else {
                current.undo_move(undo);
            }
        }

        info!(
            accepted,
            best_energy,
            elapsed = start.elapsed().as_secs_f64(),
            "annealing finished"
        );
        Ok(best)
    }

    fn validate(&self) -> std::result::Result<(), AnnealError> {
        for (parameter, value) in [
            ("max_temperature", self.schedule.max_temperature),
            ("min_temperature", self.schedule.min_temperature),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(AnnealError::InvalidTemperature { parameter, value });
            }
        }
        Ok(())
    }
}
