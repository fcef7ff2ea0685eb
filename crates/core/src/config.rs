use crate::{StateKind, Transition, WeightedSource};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing duration range for {0:?}")]
    MissingDuration(StateKind),
    #[error("invalid duration range for {label}: [{lo}, {hi}) step {step}")]
    InvalidDuration {
        label: String,
        lo: u32,
        hi: u32,
        step: u32,
    },
    #[error("missing transitions for {0:?}")]
    MissingTransitions(StateKind),
    #[error("invalid weight {weight} in transitions for {kind:?}")]
    InvalidWeight { kind: StateKind, weight: f64 },
    #[error("transitions for {0:?} have zero total weight")]
    ZeroTotalWeight(StateKind),
    #[error("only Round may lose the run, found loss edge on {0:?}")]
    UnexpectedLoss(StateKind),
    #[error("Round transitions need one loss edge and one continue edge")]
    RoundShape,
    #[error("Pick transitions need a Round edge")]
    PickWithoutRound,
    #[error("max_ante must be at least 1")]
    InvalidMaxAnte,
    #[error("max_steps must be at least 1")]
    InvalidMaxSteps,
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DurationRange {
    pub lo: u32,
    pub hi: u32,
    pub step: u32,
}

impl DurationRange {
    pub const fn new(lo: u32, hi: u32, step: u32) -> Self {
        Self { lo, hi, step }
    }

    pub fn len(&self) -> usize {
        if self.step == 0 || self.hi <= self.lo {
            return 0;
        }
        ((self.hi - self.lo - 1) / self.step + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.lo && value < self.hi && self.step > 0 && (value - self.lo) % self.step == 0
    }

    pub fn sample(&self, source: &mut impl WeightedSource) -> u32 {
        let count = self.len();
        if count == 0 {
            return self.lo;
        }
        let idx = source.choose_index(count).min(count - 1);
        self.lo + self.step * idx as u32
    }

    fn validate(&self, label: impl Into<String>) -> Result<(), ConfigError> {
        if self.is_empty() {
            return Err(ConfigError::InvalidDuration {
                label: label.into(),
                lo: self.lo,
                hi: self.hi,
                step: self.step,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindDuration {
    pub kind: StateKind,
    pub range: DurationRange,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DurationTable {
    pub states: Vec<KindDuration>,
    pub ante_one_round_bonus: DurationRange,
    pub loss_pause: DurationRange,
}

impl DurationTable {
    pub fn range_for(&self, kind: StateKind) -> Option<DurationRange> {
        self.states
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.range)
    }
}

impl Default for DurationTable {
    fn default() -> Self {
        let states = [
            (StateKind::Pick, 3_000, 5_000),
            (StateKind::Round, 10_000, 40_000),
            (StateKind::Shop, 4_000, 7_000),
            (StateKind::ShopEmpty, 2_000, 3_000),
            (StateKind::CardPack, 5_000, 6_000),
            (StateKind::JokerPack, 5_000, 12_000),
            (StateKind::TarotPack, 8_000, 16_000),
            (StateKind::PlanetPack, 5_000, 8_000),
        ]
        .into_iter()
        .map(|(kind, lo, hi)| KindDuration {
            kind,
            range: DurationRange::new(lo, hi, 500),
        })
        .collect();
        Self {
            states,
            ante_one_round_bonus: DurationRange::new(5_000, 10_000, 1_000),
            loss_pause: DurationRange::new(20_000, 30_000, 5_000),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightedTransition {
    pub to: Transition,
    pub weight: f64,
}

impl WeightedTransition {
    pub const fn new(to: Transition, weight: f64) -> Self {
        Self { to, weight }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KindTransitions {
    pub kind: StateKind,
    pub next: Vec<WeightedTransition>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransitionTable {
    pub states: Vec<KindTransitions>,
}

impl TransitionTable {
    pub fn for_kind(&self, kind: StateKind) -> Option<&[WeightedTransition]> {
        self.states
            .iter()
            .find(|entry| entry.kind == kind)
            .map(|entry| entry.next.as_slice())
    }

    fn with_shop(shop: [(StateKind, f64); 5]) -> Self {
        use StateKind::*;
        let to = |kind, weight| WeightedTransition::new(Transition::To(kind), weight);
        let mut states = vec![
            KindTransitions {
                kind: Pick,
                next: vec![to(Round, 0.95), to(Pick, 0.05)],
            },
            KindTransitions {
                kind: Round,
                next: vec![
                    to(Shop, 0.95),
                    WeightedTransition::new(Transition::Loss, 0.05),
                ],
            },
            KindTransitions {
                kind: Shop,
                next: shop.iter().map(|(kind, weight)| to(*kind, *weight)).collect(),
            },
            KindTransitions {
                kind: ShopEmpty,
                next: vec![to(Pick, 1.0)],
            },
        ];
        for pack in [CardPack, JokerPack, TarotPack, PlanetPack] {
            states.push(KindTransitions {
                kind: pack,
                next: vec![to(Shop, 1.0)],
            });
        }
        Self { states }
    }

    pub fn classic() -> Self {
        use StateKind::*;
        Self::with_shop([
            (JokerPack, 0.35),
            (TarotPack, 0.1),
            (CardPack, 0.1),
            (PlanetPack, 0.1),
            (Pick, 0.35),
        ])
    }

    pub fn flat() -> Self {
        use StateKind::*;
        Self::with_shop([
            (JokerPack, 0.175),
            (TarotPack, 0.175),
            (CardPack, 0.175),
            (PlanetPack, 0.175),
            (Pick, 0.3),
        ])
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Difficulty {
    pub boss_lose_step: f64,
    pub blind_lose_step: f64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            boss_lose_step: 0.05,
            blind_lose_step: 0.025,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Classic,
    Flat,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::Classic, Preset::Flat];

    pub fn name(self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::Flat => "flat",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::Classic),
            "flat" => Ok(Self::Flat),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }
}

pub const DEFAULT_MAX_ANTE: u8 = 8;
pub const DEFAULT_MAX_STEPS: usize = 100_000;

fn default_max_ante() -> u8 {
    DEFAULT_MAX_ANTE
}

fn default_max_steps() -> usize {
    DEFAULT_MAX_STEPS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorConfig {
    pub durations: DurationTable,
    pub transitions: TransitionTable,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_max_ante")]
    pub max_ante: u8,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::classic()
    }
}

impl GeneratorConfig {
    pub fn classic() -> Self {
        Self::with_transitions(TransitionTable::classic())
    }

    pub fn flat() -> Self {
        Self::with_transitions(TransitionTable::flat())
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Classic => Self::classic(),
            Preset::Flat => Self::flat(),
        }
    }

    pub fn with_transitions(transitions: TransitionTable) -> Self {
        Self {
            durations: DurationTable::default(),
            transitions,
            difficulty: Difficulty::default(),
            max_ante: DEFAULT_MAX_ANTE,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ante == 0 {
            return Err(ConfigError::InvalidMaxAnte);
        }
        if self.max_steps == 0 {
            return Err(ConfigError::InvalidMaxSteps);
        }
        self.durations
            .ante_one_round_bonus
            .validate("ante_one_round_bonus")?;
        self.durations.loss_pause.validate("loss_pause")?;
        for kind in StateKind::ALL {
            let range = self
                .durations
                .range_for(kind)
                .ok_or(ConfigError::MissingDuration(kind))?;
            range.validate(kind.name())?;

            let next = self
                .transitions
                .for_kind(kind)
                .filter(|next| !next.is_empty())
                .ok_or(ConfigError::MissingTransitions(kind))?;
            let mut total = 0.0;
            for edge in next {
                if !edge.weight.is_finite() || edge.weight < 0.0 {
                    return Err(ConfigError::InvalidWeight {
                        kind,
                        weight: edge.weight,
                    });
                }
                if edge.to == Transition::Loss && kind != StateKind::Round {
                    return Err(ConfigError::UnexpectedLoss(kind));
                }
                total += edge.weight;
            }
            if total <= 0.0 {
                return Err(ConfigError::ZeroTotalWeight(kind));
            }
            if kind == StateKind::Round {
                let losses = next.iter().filter(|e| e.to == Transition::Loss).count();
                if losses != 1 || next.len() < 2 {
                    return Err(ConfigError::RoundShape);
                }
            }
            // The Big blind lock forces the Round edge.
            if kind == StateKind::Pick
                && !next.iter().any(|e| e.to == Transition::To(StateKind::Round))
            {
                return Err(ConfigError::PickWithoutRound);
            }
        }
        let lose_steps = [
            self.difficulty.boss_lose_step,
            self.difficulty.blind_lose_step,
        ];
        if lose_steps.iter().any(|step| !step.is_finite() || *step < 0.0) {
            return Err(ConfigError::InvalidWeight {
                kind: StateKind::Round,
                weight: lose_steps[0].min(lose_steps[1]),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_validate() {
        for preset in Preset::ALL {
            GeneratorConfig::preset(preset)
                .validate()
                .expect("preset should validate");
        }
    }

    #[test]
    fn duration_range_counts_exclusive_end() {
        assert_eq!(DurationRange::new(3_000, 5_000, 500).len(), 4);
        assert_eq!(DurationRange::new(2_000, 3_000, 500).len(), 2);
        assert_eq!(DurationRange::new(20_000, 30_000, 5_000).len(), 2);
        assert_eq!(DurationRange::new(5_000, 10_000, 1_000).len(), 5);
        assert_eq!(DurationRange::new(0, 7, 3).len(), 3);
        assert!(DurationRange::new(5, 5, 1).is_empty());
        assert!(DurationRange::new(0, 10, 0).is_empty());
    }

    #[test]
    fn duration_range_membership() {
        let range = DurationRange::new(4_000, 7_000, 500);
        assert!(range.contains(4_000));
        assert!(range.contains(6_500));
        assert!(!range.contains(7_000));
        assert!(!range.contains(4_250));
    }

    #[test]
    fn flat_preset_only_changes_shop() {
        let classic = TransitionTable::classic();
        let flat = TransitionTable::flat();
        for kind in StateKind::ALL {
            if kind == StateKind::Shop {
                continue;
            }
            assert_eq!(classic.for_kind(kind), flat.for_kind(kind));
        }
        let shop: Vec<f64> = flat
            .for_kind(StateKind::Shop)
            .expect("shop")
            .iter()
            .map(|edge| edge.weight)
            .collect();
        assert_eq!(shop, vec![0.175, 0.175, 0.175, 0.175, 0.3]);
    }

    #[test]
    fn loss_outside_round_is_rejected() {
        let mut config = GeneratorConfig::classic();
        config.transitions.states[0]
            .next
            .push(WeightedTransition::new(Transition::Loss, 0.1));
        assert_eq!(
            config.validate(),
            Err(ConfigError::UnexpectedLoss(StateKind::Pick))
        );
    }

    #[test]
    fn round_without_loss_is_rejected() {
        let mut config = GeneratorConfig::classic();
        let round = config
            .transitions
            .states
            .iter_mut()
            .find(|entry| entry.kind == StateKind::Round)
            .expect("round");
        round.next.retain(|edge| edge.to != Transition::Loss);
        assert_eq!(config.validate(), Err(ConfigError::RoundShape));
    }

    #[test]
    fn negative_weight_is_rejected() {
        let mut config = GeneratorConfig::flat();
        config.transitions.states[2].next[0].weight = -0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWeight {
                kind: StateKind::Shop,
                ..
            })
        ));
    }

    #[test]
    fn missing_duration_is_rejected() {
        let mut config = GeneratorConfig::classic();
        config
            .durations
            .states
            .retain(|entry| entry.kind != StateKind::TarotPack);
        assert_eq!(
            config.validate(),
            Err(ConfigError::MissingDuration(StateKind::TarotPack))
        );
    }

    #[test]
    fn pick_without_round_is_rejected() {
        let mut config = GeneratorConfig::classic();
        config.transitions.states[0].next.remove(0);
        assert_eq!(config.validate(), Err(ConfigError::PickWithoutRound));
    }

    #[test]
    fn preset_names_parse() {
        assert_eq!("classic".parse::<Preset>(), Ok(Preset::Classic));
        assert_eq!(" FLAT ".parse::<Preset>(), Ok(Preset::Flat));
        assert!("v3".parse::<Preset>().is_err());
    }
}
