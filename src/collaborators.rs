//! External collaborators
//!
//! The engine reports final scores and keeps a best score through these two
//! seams. Network submission and real storage live outside the engine.

use crate::error::{StoreError, SubmitError};

/// Receives the final score of a run, once, on game over
pub trait ScoreSubmitter {
    fn submit_score(&mut self, game_type: &str, final_score: u64) -> Result<(), SubmitError>;
}

impl<F> ScoreSubmitter for F
where
    F: FnMut(&str, u64) -> Result<(), SubmitError>,
{
    fn submit_score(&mut self, game_type: &str, final_score: u64) -> Result<(), SubmitError> {
        self(game_type, final_score)
    }
}

/// Persists the best score across sessions
pub trait BestScoreStore {
    /// Read once when the engine is created
    fn load_best_score(&mut self) -> Result<u64, StoreError>;
    /// Written at game over, only when the best score improved
    fn save_best_score(&mut self, score: u64) -> Result<(), StoreError>;
}

/// Submitter that only logs (offline play, demo mode)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSubmitter;

impl ScoreSubmitter for NullSubmitter {
    fn submit_score(&mut self, game_type: &str, final_score: u64) -> Result<(), SubmitError> {
        log::info!("Score {} for {} not submitted (offline)", final_score, game_type);
        Ok(())
    }
}

/// Best score kept in memory for the lifetime of the process
#[derive(Debug, Default, Clone)]
pub struct MemoryBestScoreStore {
    pub best: u64,
}

impl MemoryBestScoreStore {
    pub fn new(best: u64) -> Self {
        Self { best }
    }
}

impl BestScoreStore for MemoryBestScoreStore {
    fn load_best_score(&mut self) -> Result<u64, StoreError> {
        Ok(self.best)
    }

    fn save_best_score(&mut self, score: u64) -> Result<(), StoreError> {
        self.best = score;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_submitter() {
        let mut seen = Vec::new();
        {
            let mut submit = |game: &str, score: u64| -> Result<(), SubmitError> {
                seen.push((game.to_string(), score));
                Ok(())
            };
            submit.submit_score("fish_flap", 7).unwrap();
        }
        assert_eq!(seen, vec![("fish_flap".to_string(), 7)]);
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryBestScoreStore::new(5);
        assert_eq!(store.load_best_score().unwrap(), 5);
        store.save_best_score(9).unwrap();
        assert_eq!(store.load_best_score().unwrap(), 9);
    }
}
