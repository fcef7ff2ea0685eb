use super::*;
use crate::*;
use tracing::{debug, info, warn};

/// Generate a run from `seed`, or from a fresh seed when none is given.
/// The seed actually used is recorded on the returned run.
pub fn generate_run(seed: Option<u64>, config: &GeneratorConfig) -> Result<Run, RunError> {
    let generator = RunGenerator::new(config)?;
    let mut rng = match seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    let run = generator.generate(&mut rng)?;
    Ok(Run::new(Some(rng.seed()), run.steps, run.truncated))
}

pub struct RunGenerator<'a> {
    config: &'a GeneratorConfig,
}

#[derive(Debug)]
struct Counters {
    ante: u8,
    round: u32,
    packs: u32,
}

impl<'a> RunGenerator<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn generate(&self, source: &mut impl WeightedSource) -> Result<Run, RunError> {
        let mut steps = Vec::new();
        let mut counters = Counters {
            ante: 1,
            round: 1,
            packs: 0,
        };
        let mut current = Some(RunState::initial());

        while let Some(state) = current {
            if steps.len() >= self.config.max_steps {
                warn!(
                    steps = steps.len(),
                    ante = counters.ante,
                    "run hit the step cap before a loss was drawn"
                );
                return Ok(Run::new(None, steps, true));
            }
            let (step, next) = self.advance(state, &mut counters, source)?;
            debug!(
                kind = step.state.kind().name(),
                blind = ?step.state.blind(),
                ante = step.state.ante(),
                round = step.state.round(),
                duration_ms = step.duration_ms,
                "run step"
            );
            steps.push(step);
            current = next;
        }

        if let Some(last) = steps.last() {
            info!(
                steps = steps.len(),
                ante = last.state.ante(),
                round = last.state.round(),
                "run finished"
            );
        }
        Ok(Run::new(None, steps, false))
    }

    fn advance(
        &self,
        state: RunState,
        counters: &mut Counters,
        source: &mut impl WeightedSource,
    ) -> Result<(RunStep, Option<RunState>), RunError> {
        let durations = &self.config.durations;
        let mut state = state;
        let is_boss = state.blind() == BlindKind::Boss;

        if state.kind() == StateKind::Round {
            counters.round += 1;
        }

        let range = durations
            .range_for(state.kind())
            .ok_or(ConfigError::MissingDuration(state.kind()))?;
        let mut duration_ms = range.sample(source);
        if counters.ante == 1 && state.kind() == StateKind::Round {
            duration_ms += durations.ante_one_round_bonus.sample(source);
        }

        if state.kind().is_pack() {
            counters.packs += 1;
        }
        if state.kind() == StateKind::Shop && counters.packs >= 2 {
            state = RunState::new(
                StateKind::ShopEmpty,
                state.blind(),
                counters.ante,
                counters.round,
            );
            counters.packs = 0;
        }

        let next = transition_weights(&state, counters.ante, self.config);
        let weights: Vec<f64> = next.iter().map(|edge| edge.weight).collect();
        let picked = source
            .choose_weighted(&weights)
            .and_then(|idx| next.get(idx))
            .map(|edge| edge.to)
            .ok_or(RunError::NoTransition(state.kind()))?;

        match picked {
            Transition::Loss => {
                duration_ms += durations.loss_pause.sample(source);
                Ok((RunStep { state, duration_ms }, None))
            }
            Transition::To(next_kind) => {
                if state.kind() == StateKind::Round && is_boss {
                    counters.ante = counters.ante.saturating_add(1);
                }
                let next_blind = if state.kind() == StateKind::Pick {
                    state.blind().next()
                } else {
                    state.blind()
                };
                let next_state =
                    RunState::new(next_kind, next_blind, counters.ante, counters.round);
                Ok((RunStep { state, duration_ms }, Some(next_state)))
            }
        }
    }
}
