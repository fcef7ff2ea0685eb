use crate::*;

/// Transition weights for leaving `state` at the given ante, after the
/// Round difficulty scaling and the Boss lock are applied.
pub fn transition_weights(
    state: &RunState,
    ante: u8,
    config: &GeneratorConfig,
) -> Vec<WeightedTransition> {
    let mut next: Vec<WeightedTransition> = config
        .transitions
        .for_kind(state.kind())
        .map(|edges| edges.to_vec())
        .unwrap_or_default();

    match state.kind() {
        StateKind::Round => scale_round(&mut next, ante, state.blind(), &config.difficulty),
        StateKind::Pick if state.blind() == BlindKind::Big => lock_boss(&mut next),
        _ => {}
    }
    next
}

fn scale_round(next: &mut [WeightedTransition], ante: u8, blind: BlindKind, difficulty: &Difficulty) {
    let lose_step = if blind == BlindKind::Boss {
        difficulty.boss_lose_step
    } else {
        difficulty.blind_lose_step
    };
    let shift = lose_step * ante.saturating_sub(1) as f64;
    let mut scaled_win = false;
    for edge in next.iter_mut() {
        if edge.to == Transition::Loss {
            edge.weight += shift;
        } else if !scaled_win {
            edge.weight = (edge.weight - shift).max(0.0);
            scaled_win = true;
        }
    }
}

// The Boss blind can never be rerolled away.
fn lock_boss(next: &mut [WeightedTransition]) {
    for edge in next.iter_mut() {
        edge.weight = if edge.to == Transition::To(StateKind::Round) {
            1.0
        } else {
            0.0
        };
    }
}
