//! Asynchronous seams for dice and operator input.
//!
//! Runtime users plug in [`DiceRoller`] and [`Prompter`] implementations so
//! the executor can run with seeded dice, scripted fixtures, or a remote
//! participant whose roll arrives over the network.
use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tactics_core::{ActorId, DicePool, POOL_SIZE, PcgRng, RngOracle, compute_seed};

/// Everything a roller needs to produce the faces of one pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollRequest {
    pub actor: ActorId,
    pub nonce: u64,
    /// Index of this pool within the invocation.
    pub sequence: u32,
    pub pool: DicePool,
}

/// Source of die faces.
///
/// The executor validates whatever comes back against the pool, so a
/// misbehaving remote roller cannot smuggle in impossible faces.
#[async_trait]
pub trait DiceRoller: Send + Sync {
    async fn roll(&self, request: &RollRequest) -> Result<[u8; POOL_SIZE], String>;
}

/// Deterministic roller derived from a table seed.
#[derive(Clone, Copy, Debug)]
pub struct SeededRoller {
    seed: u64,
    rng: PcgRng,
}

impl SeededRoller {
    pub fn new(seed: u64) -> Self {
        Self { seed, rng: PcgRng }
    }
}

#[async_trait]
impl DiceRoller for SeededRoller {
    async fn roll(&self, request: &RollRequest) -> Result<[u8; POOL_SIZE], String> {
        let mut faces = [0u8; POOL_SIZE];
        for (index, (face, size)) in faces.iter_mut().zip(request.pool.faces()).enumerate() {
            let die = request.sequence * POOL_SIZE as u32 + index as u32;
            let seed = compute_seed(self.seed, request.nonce, request.actor.0, die);
            let rolled = self.rng.roll_die(seed, u32::from(size));
            *face = u8::try_from(rolled).map_err(|e| e.to_string())?;
        }
        Ok(faces)
    }
}

/// Replays pre-recorded faces in order. Fails once the script runs out.
#[derive(Debug, Default)]
pub struct ScriptedRoller {
    script: Mutex<VecDeque<[u8; POOL_SIZE]>>,
}

impl ScriptedRoller {
    pub fn new(script: impl IntoIterator<Item = [u8; POOL_SIZE]>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|script| script.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DiceRoller for ScriptedRoller {
    async fn roll(&self, _request: &RollRequest) -> Result<[u8; POOL_SIZE], String> {
        let mut script = self
            .script
            .lock()
            .map_err(|_| "scripted roller lock poisoned".to_owned())?;
        script
            .pop_front()
            .ok_or_else(|| "scripted roller exhausted".to_owned())
    }
}

/// A choice put to the operator, e.g. which ammunition stack to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptRequest {
    pub actor: ActorId,
    pub title: String,
    pub options: Vec<String>,
}

/// Operator input. `Ok(None)` means the operator cancelled.
#[async_trait]
pub trait Prompter: Send + Sync {
    async fn choose(&self, request: &PromptRequest) -> Result<Option<usize>, String>;
}

/// Always picks the first option. Useful for headless runs and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstChoicePrompter;

#[async_trait]
impl Prompter for FirstChoicePrompter {
    async fn choose(&self, request: &PromptRequest) -> Result<Option<usize>, String> {
        Ok((!request.options.is_empty()).then_some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::RulesConfig;

    fn request(sequence: u32, boons: u8) -> RollRequest {
        RollRequest {
            actor: ActorId(3),
            nonce: 11,
            sequence,
            pool: DicePool::new(boons, 0, &RulesConfig::default()),
        }
    }

    #[tokio::test]
    async fn seeded_rolls_are_reproducible_and_fit_the_pool() {
        let roller = SeededRoller::new(42);
        for boons in 0..=6 {
            let req = request(0, boons);
            let first = roller.roll(&req).await.unwrap();
            assert_eq!(first, roller.roll(&req).await.unwrap());
            assert!(req.pool.accepts(&first));
        }
    }

    #[tokio::test]
    async fn scripted_roller_runs_out() {
        let roller = ScriptedRoller::new([[8, 8, 8]]);
        assert_eq!(roller.roll(&request(0, 0)).await.unwrap(), [8, 8, 8]);
        assert!(roller.roll(&request(1, 0)).await.is_err());
        assert_eq!(roller.remaining(), 0);
    }
}
