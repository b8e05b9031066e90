use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use rand::rngs::SmallRng;
use rand::{Rng, RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// Honesty model the opponent commits to for a whole match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Personality {
    /// Hints always name the true location.
    Honest,
    /// Hints always name a plausible wrong location.
    Deceptive,
    /// A fresh fair coin on every hint request decides between the two.
    Unpredictable,
}

impl Personality {
    pub fn draw<R: Rng + ?Sized>(rng: &mut R) -> Self {
        match rng.random_range(0..3u8) {
            0 => Self::Honest,
            1 => Self::Deceptive,
            _ => Self::Unpredictable,
        }
    }
}

/// A hint as handed to the display layer: the claimed grid index plus whether
/// the claim happens to be true. Only the index is ever fed back into play.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintClaim {
    pub index: GridIndex,
    pub honest: bool,
}

/// Decides where the opponent searches next and whether its hints are
/// truthful. Holds its own seeded rng so matches replay deterministically.
///
/// The policy never mutates the grid; it only receives read-only facts
/// (candidate targets, reveals) and returns decisions.
#[derive(Clone, Debug)]
pub struct OpponentPolicy {
    personality: Personality,
    rng: SmallRng,
    own_marker: Option<GridIndex>,
    believed_target: Option<GridIndex>,
    revealed: BTreeSet<GridIndex>,
}

impl OpponentPolicy {
    pub fn new(personality: Personality, seed: u64) -> Self {
        Self {
            personality,
            rng: SmallRng::seed_from_u64(seed),
            own_marker: None,
            believed_target: None,
            revealed: BTreeSet::new(),
        }
    }

    /// Draws the personality from the seeded rng before anything else.
    pub fn with_random_personality(seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let personality = Personality::draw(&mut rng);
        Self {
            personality,
            rng,
            own_marker: None,
            believed_target: None,
            revealed: BTreeSet::new(),
        }
    }

    pub fn personality(&self) -> Personality {
        self.personality
    }

    pub fn own_marker(&self) -> Option<GridIndex> {
        self.own_marker
    }

    /// Records where the opponent's own marker ended up. Set once, right
    /// after placement, before any hint exchange.
    pub fn set_own_marker(&mut self, index: GridIndex) {
        self.own_marker = Some(index);
    }

    pub fn believed_target(&self) -> Option<GridIndex> {
        self.believed_target
    }

    /// Stores the location the player volunteered for their own marker. The
    /// claim biases exactly one upcoming search decision.
    pub fn record_volunteered_location(&mut self, index: GridIndex) {
        log::debug!("player volunteered grid {index}");
        self.believed_target = Some(index);
    }

    /// Mirrors a grid reveal into the policy's own bookkeeping.
    pub fn note_revealed(&mut self, index: GridIndex) {
        self.revealed.insert(index);
    }

    pub fn revealed(&self) -> &BTreeSet<GridIndex> {
        &self.revealed
    }

    /// Picks the next cell to search among `valid` (unrevealed, already
    /// excluding the opponent's own marker; re-filtered here as a safeguard).
    ///
    /// A volunteered location is consumed whether or not it is still a valid
    /// target: the opponent commits to acting on stated information over its
    /// own search, but only for the move immediately following the hint.
    /// Returns `None` when no target is left; the caller resolves the match
    /// as a stall.
    pub fn decide_next_target(&mut self, valid: &[GridIndex]) -> Option<GridIndex> {
        let hunch = self.believed_target.take();

        let candidates: Vec<GridIndex> = valid
            .iter()
            .copied()
            .filter(|&index| Some(index) != self.own_marker)
            .collect();
        if candidates.is_empty() {
            return None;
        }

        if let Some(target) = hunch
            && candidates.contains(&target)
        {
            log::debug!("opponent acts on volunteered grid {target}");
            return Some(target);
        }

        Some(candidates[self.rng.random_range(0..candidates.len())])
    }

    /// Answers "where is your marker?" according to the personality.
    ///
    /// Dishonest answers are drawn uniformly from every grid index except the
    /// true location. Requesting a hint before the opponent marker is placed
    /// is a sequencing bug in the caller.
    pub fn give_hint(&mut self, total_cells: CellCount) -> Result<HintClaim> {
        let true_location = self.own_marker.ok_or(GameError::MarkerNotPlaced)?;

        let honest = match self.personality {
            Personality::Honest => true,
            Personality::Deceptive => false,
            Personality::Unpredictable => self.rng.random_bool(0.5),
        };

        if honest {
            return Ok(HintClaim {
                index: true_location,
                honest: true,
            });
        }

        if total_cells < 2 {
            return Err(GameError::NoCellAvailable);
        }
        let drawn: GridIndex = self.rng.random_range(1..total_cells);
        let index = if drawn >= true_location { drawn + 1 } else { drawn };
        Ok(HintClaim {
            index,
            honest: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    const TOTAL: CellCount = 25;

    fn placed_policy(personality: Personality, seed: u64) -> OpponentPolicy {
        let mut policy = OpponentPolicy::new(personality, seed);
        policy.set_own_marker(13);
        policy
    }

    #[test]
    fn hint_before_placement_is_a_sequencing_error() {
        let mut policy = OpponentPolicy::new(Personality::Honest, 1);
        assert_eq!(policy.give_hint(TOTAL), Err(GameError::MarkerNotPlaced));
    }

    #[test]
    fn honest_personality_always_tells_the_truth() {
        let mut policy = placed_policy(Personality::Honest, 2);
        for _ in 0..1_000 {
            let claim = policy.give_hint(TOTAL).unwrap();
            assert!(claim.honest);
            assert_eq!(claim.index, 13);
        }
    }

    #[test]
    fn deceptive_personality_never_tells_the_truth() {
        let mut policy = placed_policy(Personality::Deceptive, 3);
        for _ in 0..1_000 {
            let claim = policy.give_hint(TOTAL).unwrap();
            assert!(!claim.honest);
            assert_ne!(claim.index, 13);
            assert!((1..=TOTAL).contains(&claim.index));
        }
    }

    #[test]
    fn deceptive_lies_cover_the_whole_grid() {
        let mut policy = placed_policy(Personality::Deceptive, 4);
        let mut seen = BTreeSet::new();
        for _ in 0..5_000 {
            seen.insert(policy.give_hint(TOTAL).unwrap().index);
        }
        // every index except the true location shows up eventually
        assert_eq!(seen.len(), usize::from(TOTAL) - 1);
        assert!(!seen.contains(&13));
    }

    #[test]
    fn unpredictable_personality_is_honest_about_half_the_time() {
        let mut policy = placed_policy(Personality::Unpredictable, 5);
        let trials = 1_000;
        let honest = (0..trials)
            .filter(|_| policy.give_hint(TOTAL).unwrap().honest)
            .count();
        assert!(
            (400..=600).contains(&honest),
            "honest {honest} of {trials} trials"
        );
    }

    #[test]
    fn unpredictable_claims_match_their_honesty_flag() {
        let mut policy = placed_policy(Personality::Unpredictable, 6);
        for _ in 0..1_000 {
            let claim = policy.give_hint(TOTAL).unwrap();
            assert_eq!(claim.honest, claim.index == 13);
        }
    }

    #[test]
    fn volunteered_location_is_used_once_then_forgotten() {
        let mut policy = placed_policy(Personality::Honest, 7);
        let valid: Vec<GridIndex> = (1..=TOTAL).filter(|&i| i != 13).collect();

        policy.record_volunteered_location(12);
        assert_eq!(policy.decide_next_target(&valid), Some(12));
        assert_eq!(policy.believed_target(), None);
    }

    #[test]
    fn stale_volunteered_location_is_still_consumed() {
        let mut policy = placed_policy(Personality::Honest, 8);

        policy.record_volunteered_location(12);
        // grid 12 is no longer a valid target; the hunch is spent anyway
        let valid: Vec<GridIndex> = (1..=TOTAL).filter(|&i| i != 12 && i != 13).collect();
        let target = policy.decide_next_target(&valid).unwrap();
        assert_ne!(target, 12);
        assert_eq!(policy.believed_target(), None);
    }

    #[test]
    fn policy_never_targets_its_own_marker() {
        let mut policy = placed_policy(Personality::Honest, 9);
        let valid: Vec<GridIndex> = (1..=TOTAL).collect();
        for _ in 0..2_000 {
            // own marker passed in by mistake; the safeguard filters it
            assert_ne!(policy.decide_next_target(&valid), Some(13));
        }
    }

    #[test]
    fn exhausted_target_set_yields_no_move() {
        let mut policy = placed_policy(Personality::Honest, 10);
        assert_eq!(policy.decide_next_target(&[]), None);
        assert_eq!(policy.decide_next_target(&[13]), None);
    }

    #[test]
    fn note_revealed_accumulates_indices() {
        let mut policy = placed_policy(Personality::Honest, 11);
        policy.note_revealed(4);
        policy.note_revealed(9);
        policy.note_revealed(4);
        let revealed: Vec<GridIndex> = policy.revealed().iter().copied().collect();
        assert_eq!(revealed, [4, 9]);
    }
}
