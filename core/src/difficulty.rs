use serde::{Deserialize, Serialize};

use crate::*;

/// Difficulty class of a session. Only the first three are ranked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tier {
    Easy,
    Normal,
    Hard,
    Custom,
}

impl Tier {
    /// Ranked tiers in score-file order.
    pub const RANKED: [Tier; 3] = [Tier::Easy, Tier::Normal, Tier::Hard];

    pub const fn is_ranked(self) -> bool {
        !matches!(self, Self::Custom)
    }

    /// Position in the score table, `None` for unranked tiers.
    pub const fn slot(self) -> Option<usize> {
        match self {
            Self::Easy => Some(0),
            Self::Normal => Some(1),
            Self::Hard => Some(2),
            Self::Custom => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Normal => "Normal",
            Self::Hard => "Hard",
            Self::Custom => "Custom",
        }
    }
}

/// A tier together with the board it plays on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub tier: Tier,
    pub config: GameConfig,
}

impl Difficulty {
    pub const EASY: Self = Self {
        tier: Tier::Easy,
        config: GameConfig::new_unchecked((8, 8), 10),
    };
    pub const NORMAL: Self = Self {
        tier: Tier::Normal,
        config: GameConfig::new_unchecked((16, 16), 40),
    };
    pub const HARD: Self = Self {
        tier: Tier::Hard,
        config: GameConfig::new_unchecked((30, 19), 70),
    };

    /// Fixed board for a ranked tier, `None` for [`Tier::Custom`].
    pub const fn preset(tier: Tier) -> Option<Self> {
        match tier {
            Tier::Easy => Some(Self::EASY),
            Tier::Normal => Some(Self::NORMAL),
            Tier::Hard => Some(Self::HARD),
            Tier::Custom => None,
        }
    }

    /// Player-defined board, validated as a whole at submission.
    pub fn custom(width: Coord, height: Coord, mines: CellCount) -> Result<Self> {
        Ok(Self {
            tier: Tier::Custom,
            config: GameConfig::new((width, height), mines)?,
        })
    }
}
