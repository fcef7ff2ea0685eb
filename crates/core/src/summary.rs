use crate::{Run, StateKind};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackCounts {
    pub card: u32,
    pub joker: u32,
    pub tarot: u32,
    pub planet: u32,
}

impl PackCounts {
    pub fn total(&self) -> u32 {
        self.card + self.joker + self.tarot + self.planet
    }

    fn bump(&mut self, kind: StateKind) {
        match kind {
            StateKind::CardPack => self.card += 1,
            StateKind::JokerPack => self.joker += 1,
            StateKind::TarotPack => self.tarot += 1,
            StateKind::PlanetPack => self.planet += 1,
            _ => {}
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub total_ms: u64,
    pub ante: u8,
    pub max_ante: u8,
    pub round: u32,
    pub steps: usize,
    pub packs: PackCounts,
}

impl RunSummary {
    pub fn from_run(run: &Run, max_ante: u8) -> Self {
        let mut packs = PackCounts::default();
        for step in run {
            packs.bump(step.state.kind());
        }
        let (ante, round) = run
            .last()
            .map(|step| (step.state.ante(), step.state.round()))
            .unwrap_or((1, 1));
        Self {
            total_ms: run.total_duration_ms(),
            ante,
            max_ante,
            round,
            steps: run.len(),
            packs,
        }
    }

    pub fn duration_hms(&self) -> String {
        format_hms(self.total_ms)
    }
}

pub fn format_hms(total_ms: u64) -> String {
    let secs = total_ms / 1_000;
    format!("{:02}:{:02}:{:02}", secs / 3_600, (secs / 60) % 60, secs % 60)
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  > Duration: {}", self.duration_hms())?;
        writeln!(f, "  > Ante: {}/{}", self.ante, self.max_ante)?;
        writeln!(f, "  > Round: {}", self.round)?;
        writeln!(f, "  > Card packs: {}", self.packs.card)?;
        writeln!(f, "  > Joker packs: {}", self.packs.joker)?;
        writeln!(f, "  > Tarot packs: {}", self.packs.tarot)?;
        write!(f, "  > Planet packs: {}", self.packs.planet)
    }
}
