use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::HarnessError;
use crate::rules::{PositionStatus, RulesAuthority};

const MAX_WALK_ATTEMPTS: usize = 100;

/// Produces reproducible starting positions by playing uniformly random legal
/// moves from the initial position.
pub struct PositionSampler {
    rng: StdRng,
    walk_plies: usize,
}

impl PositionSampler {
    pub fn new(seed: u64, walk_plies: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            walk_plies,
        }
    }

    /// Next position in which the side to move still has a legal move.
    ///
    /// A walk that runs into a finished game is thrown away and started over.
    pub fn sample<R: RulesAuthority>(&mut self, rules: &R) -> Result<R::Position, HarnessError> {
        for attempt in 1..=MAX_WALK_ATTEMPTS {
            if let Some(position) = self.walk(rules)? {
                return Ok(position);
            }
            debug!("Random walk {} ended the game early, retrying", attempt);
        }

        Err(HarnessError::Config(format!(
            "no playable position after {} random walks of {} plies",
            MAX_WALK_ATTEMPTS, self.walk_plies
        )))
    }

    fn walk<R: RulesAuthority>(&mut self, rules: &R) -> Result<Option<R::Position>, HarnessError> {
        let mut position = rules.initial_position();

        for _ in 0..self.walk_plies {
            let moves = rules.legal_moves(&position);
            if moves.is_empty() {
                return Ok(None);
            }
            let index = self.rng.gen_range(0..moves.len());
            position = rules.apply(&position, &moves[index])?;
        }

        Ok((rules.status(&position) == PositionStatus::Ongoing).then_some(position))
    }
}
