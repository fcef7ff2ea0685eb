use crate::{Run, StateKind, Theme};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_FADE_MS: u32 = 50;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackError {
    #[error("base track length must be positive")]
    ZeroBaseLength,
    #[error("run has no steps")]
    EmptyRun,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackSettings {
    pub base_length_ms: u64,
    #[serde(default = "default_fade_ms")]
    pub fade_ms: u32,
}

fn default_fade_ms() -> u32 {
    DEFAULT_FADE_MS
}

impl TrackSettings {
    pub fn new(base_length_ms: u64) -> Self {
        Self {
            base_length_ms,
            fade_ms: DEFAULT_FADE_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Segment {
    pub theme: Theme,
    pub kind: StateKind,
    pub timeline_ms: u64,
    pub duration_ms: u32,
    // Wrapped windows are [start_ms, base) then [0, end_ms).
    pub start_ms: u64,
    pub end_ms: u64,
    pub wraps: bool,
    pub crossfade: bool,
    pub pack_sfx: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrackPlan {
    pub settings: TrackSettings,
    pub segments: Vec<Segment>,
}

impl TrackPlan {
    pub fn from_run(run: &Run, settings: &TrackSettings) -> Result<Self, TrackError> {
        let base = settings.base_length_ms;
        if base == 0 {
            return Err(TrackError::ZeroBaseLength);
        }
        if run.is_empty() {
            return Err(TrackError::EmptyRun);
        }

        let mut segments = Vec::with_capacity(run.len());
        let mut timestamp = 0u64;
        let mut prev_theme = Theme::Main;
        let mut prev_kind: Option<StateKind> = None;
        for step in run {
            let theme = step.state.theme();
            let kind = step.state.kind();
            let start_ms = timestamp % base;
            let end_ms = (timestamp + step.duration_ms as u64) % base;
            segments.push(Segment {
                theme,
                kind,
                timeline_ms: timestamp,
                duration_ms: step.duration_ms,
                start_ms,
                end_ms,
                wraps: start_ms >= end_ms,
                crossfade: theme != prev_theme,
                pack_sfx: kind.is_pack() && prev_kind.is_some_and(|prev| !prev.is_pack()),
            });
            timestamp += step.duration_ms as u64;
            prev_theme = theme;
            prev_kind = Some(kind);
        }

        Ok(Self {
            settings: *settings,
            segments,
        })
    }

    pub fn total_ms(&self) -> u64 {
        self.segments
            .iter()
            .map(|segment| segment.duration_ms as u64)
            .sum()
    }

    pub fn crossfade_count(&self) -> usize {
        self.segments.iter().filter(|s| s.crossfade).count()
    }

    pub fn sfx_count(&self) -> usize {
        self.segments.iter().filter(|s| s.pack_sfx).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BlindKind, RunState, RunStep};

    fn step(kind: StateKind, blind: BlindKind, duration_ms: u32) -> RunStep {
        RunStep {
            state: RunState::new(kind, blind, 1, 1),
            duration_ms,
        }
    }

    fn sample_run() -> Run {
        Run::new(
            Some(1),
            vec![
                step(StateKind::Pick, BlindKind::Boss, 4_000),
                step(StateKind::Round, BlindKind::Small, 30_000),
                step(StateKind::Shop, BlindKind::Small, 5_000),
                step(StateKind::JokerPack, BlindKind::Small, 6_000),
                step(StateKind::Shop, BlindKind::Small, 4_000),
                step(StateKind::PlanetPack, BlindKind::Small, 5_000),
                step(StateKind::TarotPack, BlindKind::Small, 9_000),
            ],
            false,
        )
    }

    #[test]
    fn windows_wrap_around_the_base_length() {
        let plan = TrackPlan::from_run(&sample_run(), &TrackSettings::new(40_000)).expect("plan");
        let round = plan.segments[1];
        assert_eq!((round.start_ms, round.end_ms, round.wraps), (4_000, 34_000, false));
        let shop = plan.segments[2];
        assert_eq!((shop.start_ms, shop.end_ms, shop.wraps), (34_000, 39_000, false));
        let joker = plan.segments[3];
        assert_eq!(joker.timeline_ms, 39_000);
        assert_eq!((joker.start_ms, joker.end_ms, joker.wraps), (39_000, 5_000, true));
        assert_eq!(plan.total_ms(), 63_000);
    }

    #[test]
    fn crossfade_only_on_theme_change() {
        let plan = TrackPlan::from_run(&sample_run(), &TrackSettings::new(60_000)).expect("plan");
        let fades: Vec<bool> = plan.segments.iter().map(|s| s.crossfade).collect();
        assert_eq!(fades, vec![false, false, true, true, true, true, true]);
        assert_eq!(plan.crossfade_count(), 5);
    }

    #[test]
    fn pack_sfx_only_when_entering_from_non_pack() {
        let plan = TrackPlan::from_run(&sample_run(), &TrackSettings::new(60_000)).expect("plan");
        let sfx: Vec<bool> = plan.segments.iter().map(|s| s.pack_sfx).collect();
        assert_eq!(sfx, vec![false, false, false, true, false, true, false]);
        assert_eq!(plan.sfx_count(), 2);
    }

    #[test]
    fn zero_base_length_is_rejected() {
        assert_eq!(
            TrackPlan::from_run(&sample_run(), &TrackSettings::new(0)),
            Err(TrackError::ZeroBaseLength)
        );
    }

    #[test]
    fn exact_multiple_of_base_counts_as_wrap() {
        let run = Run::new(None, vec![step(StateKind::Round, BlindKind::Big, 40_000)], false);
        let plan = TrackPlan::from_run(&run, &TrackSettings::new(40_000)).expect("plan");
        assert_eq!((plan.segments[0].start_ms, plan.segments[0].end_ms), (0, 0));
        assert!(plan.segments[0].wraps);
    }
}
