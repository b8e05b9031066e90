//! Message types exchanged with the excluded narrative and chat
//! collaborators. Everything here is display-only data: apart from the hint
//! flow handled inside `bombhunt-core`, nothing in these types ever feeds
//! back into rules or state transitions.

use bombhunt_core::{CellCount, GridIndex, OpponentPolicy, Personality, Side};
use serde::{Deserialize, Serialize};

/// Item labels used when the narrative collaborator is unavailable.
pub const FALLBACK_PLAYER_ITEM: &str = "beacon";
pub const FALLBACK_OPPONENT_ITEM: &str = "artifact";

const FALLBACK_BRIEFING: &str = "Uplink lost. Standing orders apply: keep your \
beacon hidden and locate the enemy artifact before it locates you. Your \
mission begins now.";

/// What each party is narratively hiding. Opaque display strings; the rules
/// never look inside them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionItems {
    pub player_item: String,
    pub opponent_item: String,
}

impl Default for MissionItems {
    fn default() -> Self {
        Self {
            player_item: FALLBACK_PLAYER_ITEM.into(),
            opponent_item: FALLBACK_OPPONENT_ITEM.into(),
        }
    }
}

/// Mission briefing shown before placement begins.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Briefing {
    pub narrative: String,
    pub items: MissionItems,
}

impl Briefing {
    /// Placeholder briefing used when generation fails; the match proceeds
    /// with default item labels.
    pub fn fallback() -> Self {
        Self {
            narrative: FALLBACK_BRIEFING.into(),
            items: MissionItems::default(),
        }
    }
}

/// Outcome text shown after resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debrief {
    pub narrative: String,
}

impl Debrief {
    pub fn fallback(player_won: bool) -> Self {
        let narrative = if player_won {
            "You secured the objective before the enemy closed in. Humanity \
             holds the line."
        } else {
            "Your position was compromised first. What remains of the network \
             regroups in the dark."
        };
        Self {
            narrative: narrative.into(),
        }
    }
}

/// Read-only engine facts handed to the chat collaborator so it can stay in
/// character. Built after opponent placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSnapshot {
    pub personality: Personality,
    /// True location of the opponent's marker; the collaborator decides how
    /// honestly to talk about it.
    pub own_marker: GridIndex,
    pub revealed: Vec<GridIndex>,
    pub total_cells: CellCount,
    pub items: MissionItems,
}

impl ChatSnapshot {
    /// `None` until the opponent marker is placed; there is nothing to chat
    /// about before that.
    pub fn from_policy(
        policy: &OpponentPolicy,
        total_cells: CellCount,
        items: MissionItems,
    ) -> Option<Self> {
        Some(Self {
            personality: policy.personality(),
            own_marker: policy.own_marker()?,
            revealed: policy.revealed().iter().copied().collect(),
            total_cells,
            items,
        })
    }
}

/// One free-text exchange request from the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub snapshot: ChatSnapshot,
    pub player_message: String,
}

impl ChatRequest {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// One line of the chat log.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Side,
    pub text: String,
}

/// Append-only chat log. Display state only: the engine never reads it back,
/// so a late or lost reply can never affect play.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, speaker: Side, text: impl Into<String>) {
        self.entries.push(TranscriptEntry {
            speaker,
            text: text.into(),
        });
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
