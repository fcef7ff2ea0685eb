use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Theme {
    Main,
    Shop,
    Tarot,
    Planet,
    Boss,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Main,
        Theme::Shop,
        Theme::Tarot,
        Theme::Planet,
        Theme::Boss,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum StateKind {
    Pick,
    Round,
    Shop,
    ShopEmpty,
    CardPack,
    JokerPack,
    TarotPack,
    PlanetPack,
}

impl StateKind {
    pub const ALL: [StateKind; 8] = [
        StateKind::Pick,
        StateKind::Round,
        StateKind::Shop,
        StateKind::ShopEmpty,
        StateKind::CardPack,
        StateKind::JokerPack,
        StateKind::TarotPack,
        StateKind::PlanetPack,
    ];

    pub fn is_pack(self) -> bool {
        matches!(
            self,
            Self::CardPack | Self::JokerPack | Self::TarotPack | Self::PlanetPack
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Pick => "Pick",
            Self::Round => "Round",
            Self::Shop => "Shop",
            Self::ShopEmpty => "ShopEmpty",
            Self::CardPack => "CardPack",
            Self::JokerPack => "JokerPack",
            Self::TarotPack => "TarotPack",
            Self::PlanetPack => "PlanetPack",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum BlindKind {
    Small,
    Big,
    Boss,
}

impl BlindKind {
    pub fn next(self) -> Self {
        match self {
            Self::Small => Self::Big,
            Self::Big => Self::Boss,
            Self::Boss => Self::Small,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Transition {
    To(StateKind),
    Loss,
}

impl Transition {
    pub fn kind(self) -> Option<StateKind> {
        match self {
            Self::To(kind) => Some(kind),
            Self::Loss => None,
        }
    }
}

pub fn theme_for(kind: StateKind, blind: BlindKind) -> Theme {
    match (kind, blind) {
        (StateKind::PlanetPack, _) => Theme::Planet,
        (StateKind::CardPack | StateKind::JokerPack | StateKind::TarotPack, _) => Theme::Tarot,
        (StateKind::Round, BlindKind::Boss) => Theme::Boss,
        (StateKind::Shop | StateKind::ShopEmpty, _) => Theme::Shop,
        _ => Theme::Main,
    }
}

// Theme is derived from (kind, blind) on construction, never stored apart.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RunState {
    theme: Theme,
    kind: StateKind,
    blind: BlindKind,
    ante: u8,
    round: u32,
}

impl RunState {
    pub fn new(kind: StateKind, blind: BlindKind, ante: u8, round: u32) -> Self {
        Self {
            theme: theme_for(kind, blind),
            kind,
            blind,
            ante,
            round,
        }
    }

    pub fn initial() -> Self {
        Self::new(StateKind::Pick, BlindKind::Boss, 1, 1)
    }

    pub fn with_kind(&self, kind: StateKind) -> Self {
        Self::new(kind, self.blind, self.ante, self.round)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn kind(&self) -> StateKind {
        self.kind
    }

    pub fn blind(&self) -> BlindKind {
        self.blind
    }

    pub fn ante(&self) -> u8 {
        self.ante
    }

    pub fn round(&self) -> u32 {
        self.round
    }
}

#[derive(Deserialize)]
struct RunStateFields {
    kind: StateKind,
    blind: BlindKind,
    ante: u8,
    round: u32,
}

// The serialized theme is informational; it is re-derived on load.
impl<'de> Deserialize<'de> for RunState {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let fields = RunStateFields::deserialize(deserializer)?;
        Ok(Self::new(fields.kind, fields.blind, fields.ante, fields.round))
    }
}
