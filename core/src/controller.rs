use alloc::vec::Vec;
use core::time::Duration;
use rand::rngs::SmallRng;
use rand::{RngExt, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::*;

/// How a match ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    /// Somebody uncovered the other side's marker.
    MarkerFound { victor: Side },
    /// Time attack only: the player ran out the clock.
    TimedOut,
    /// Time attack only: the player spent every attempt without a find.
    AttemptsExhausted,
    /// The opponent had no legal target left; nobody wins.
    Stalemate,
}

impl Resolution {
    /// Timeouts and attempt exhaustion are scored as opponent wins; a
    /// stalemate has no victor.
    pub const fn victor(self) -> Option<Side> {
        match self {
            Self::MarkerFound { victor } => Some(victor),
            Self::TimedOut | Self::AttemptsExhausted => Some(Side::Opponent),
            Self::Stalemate => None,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// Difficulty not chosen yet; no board exists.
    Setup,
    PlayerPlacing,
    /// Optional pre-play dialog; the opponent's move is held back until the
    /// exchange is closed, so a submitted index is always recorded before the
    /// next opponent decision.
    HintExchange,
    Alternating(Side),
    /// Terminal. Play again with a fresh controller.
    Resolved(Resolution),
}

impl Phase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

/// One discrete input from the rendering layer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchEvent {
    SelectDifficulty(Difficulty),
    Place(Coord2),
    Reveal(Coord2),
    RequestHint,
    SubmitHint(GridIndex),
    DeclineHint,
    /// Total wall-clock time since the match was configured. Also drives the
    /// opponent's deferred turn.
    Tick(Duration),
}

/// Derived facts from feeding one event to the controller. The resolution, if
/// any, is always visible through [`MatchController::phase`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepOutcome {
    /// Board and opponent exist; the player may hide their marker.
    MatchConfigured,
    /// Both markers are hidden (opponent placement is automatic).
    MarkersPlaced,
    /// The opponent answered a hint request.
    HintOffered(HintClaim),
    /// The player's volunteered location was recorded.
    HintRecorded,
    HintDeclined,
    PlayerRevealed { index: GridIndex, found: bool },
    OpponentRevealed { index: GridIndex, found: bool },
    /// This event itself resolved the match.
    Resolved(Resolution),
    /// Nothing to do.
    Idle,
}

#[derive(Clone, Debug)]
struct Session {
    difficulty: Difficulty,
    engine: GridEngine,
    policy: OpponentPolicy,
    attempts_used: CellCount,
    elapsed: Duration,
    play_started: Option<Duration>,
}

impl Session {
    /// Elapsed-at-entry is latched the first time play starts so the time
    /// budget counts from entering `Alternating`, not from match setup.
    fn begin_alternating(&mut self) -> Phase {
        self.play_started.get_or_insert(self.elapsed);
        Phase::Alternating(Side::Player)
    }

    fn in_play_time(&self) -> Option<Duration> {
        self.play_started
            .map(|start| self.elapsed.saturating_sub(start))
    }
}

/// Sequences a match through its phases, mediating between the rendering
/// layer's events, the grid engine, and the opponent policy. All board
/// mutation goes through here; the policy only ever sees read-only facts.
#[derive(Clone, Debug)]
pub struct MatchController {
    rules: MatchRules,
    rng: SmallRng,
    phase: Phase,
    session: Option<Session>,
}

impl MatchController {
    pub fn new(rules: MatchRules, seed: u64) -> Self {
        Self {
            rules,
            rng: SmallRng::seed_from_u64(seed),
            phase: Phase::Setup,
            session: None,
        }
    }

    pub fn rules(&self) -> MatchRules {
        self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn resolution(&self) -> Option<Resolution> {
        match self.phase {
            Phase::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    pub fn difficulty(&self) -> Option<Difficulty> {
        self.session.as_ref().map(|session| session.difficulty)
    }

    pub fn engine(&self) -> Option<&GridEngine> {
        self.session.as_ref().map(|session| &session.engine)
    }

    pub fn policy(&self) -> Option<&OpponentPolicy> {
        self.session.as_ref().map(|session| &session.policy)
    }

    pub fn attempts_used(&self) -> CellCount {
        self.session
            .as_ref()
            .map_or(0, |session| session.attempts_used)
    }

    pub fn elapsed(&self) -> Duration {
        self.session
            .as_ref()
            .map_or(Duration::ZERO, |session| session.elapsed)
    }

    /// Feeds one external event through the state machine.
    pub fn handle(&mut self, event: MatchEvent) -> Result<StepOutcome> {
        match event {
            MatchEvent::SelectDifficulty(difficulty) => self.on_select_difficulty(difficulty),
            MatchEvent::Place(coords) => self.on_place(coords),
            MatchEvent::Reveal(coords) => self.on_reveal(coords),
            MatchEvent::RequestHint => self.on_request_hint(),
            MatchEvent::SubmitHint(index) => self.on_submit_hint(index),
            MatchEvent::DeclineHint => self.on_decline_hint(),
            MatchEvent::Tick(elapsed) => self.on_tick(elapsed),
        }
    }

    fn on_select_difficulty(&mut self, difficulty: Difficulty) -> Result<StepOutcome> {
        if self.phase != Phase::Setup {
            return Err(GameError::WrongPhase);
        }

        let personality = self
            .rules
            .personality
            .unwrap_or_else(|| Personality::draw(&mut self.rng));
        let policy_seed = self.rng.random();
        self.session = Some(Session {
            difficulty,
            engine: GridEngine::from_difficulty(difficulty),
            policy: OpponentPolicy::new(personality, policy_seed),
            attempts_used: 0,
            elapsed: Duration::ZERO,
            play_started: None,
        });
        self.phase = Phase::PlayerPlacing;
        log::info!("match configured: {difficulty:?} {:?}", self.rules.mode);
        Ok(StepOutcome::MatchConfigured)
    }

    fn on_place(&mut self, coords: Coord2) -> Result<StepOutcome> {
        if self.phase != Phase::PlayerPlacing {
            return Err(GameError::WrongPhase);
        }
        let session = self.session.as_mut().ok_or(GameError::WrongPhase)?;

        session.engine.place_marker(coords, Side::Player)?;
        let opponent_at = session
            .engine
            .place_opponent_marker_randomly(&mut self.rng)?;
        session.policy.set_own_marker(opponent_at);

        self.phase = if self.rules.hint_exchange {
            Phase::HintExchange
        } else {
            session.begin_alternating()
        };
        Ok(StepOutcome::MarkersPlaced)
    }

    fn on_request_hint(&mut self) -> Result<StepOutcome> {
        if self.phase != Phase::HintExchange {
            return Err(GameError::WrongPhase);
        }
        let session = self.session.as_mut().ok_or(GameError::WrongPhase)?;

        let claim = session.policy.give_hint(session.engine.total_cells())?;
        Ok(StepOutcome::HintOffered(claim))
    }

    fn on_submit_hint(&mut self, index: GridIndex) -> Result<StepOutcome> {
        if self.phase != Phase::HintExchange {
            return Err(GameError::WrongPhase);
        }
        let session = self.session.as_mut().ok_or(GameError::WrongPhase)?;

        if index == 0 || index > session.engine.total_cells() {
            return Err(GameError::InvalidCoords);
        }
        session.policy.record_volunteered_location(index);
        self.phase = session.begin_alternating();
        Ok(StepOutcome::HintRecorded)
    }

    fn on_decline_hint(&mut self) -> Result<StepOutcome> {
        if self.phase != Phase::HintExchange {
            return Err(GameError::WrongPhase);
        }
        let session = self.session.as_mut().ok_or(GameError::WrongPhase)?;

        self.phase = session.begin_alternating();
        Ok(StepOutcome::HintDeclined)
    }

    fn on_reveal(&mut self, coords: Coord2) -> Result<StepOutcome> {
        if self.phase != Phase::Alternating(Side::Player) {
            return Err(GameError::WrongPhase);
        }
        let session = self.session.as_mut().ok_or(GameError::WrongPhase)?;

        let index = session.engine.coords_to_index(coords)?;
        let outcome = session.engine.reveal(coords, Side::Player)?;
        session.policy.note_revealed(index);
        session.attempts_used += 1;

        if let RevealOutcome::FoundMarker(victor) = outcome {
            self.phase = Phase::Resolved(Resolution::MarkerFound { victor });
            return Ok(StepOutcome::PlayerRevealed { index, found: true });
        }

        // a winning final attempt was already handled above, so exhaustion
        // here is a genuine loss
        if self.rules.mode == GameMode::TimeAttack
            && session.attempts_used >= session.difficulty.attempt_budget()
        {
            log::info!("attempt budget spent, match resolves for the opponent");
            self.phase = Phase::Resolved(Resolution::AttemptsExhausted);
            return Ok(StepOutcome::PlayerRevealed {
                index,
                found: false,
            });
        }

        self.phase = Phase::Alternating(Side::Opponent);
        Ok(StepOutcome::PlayerRevealed {
            index,
            found: false,
        })
    }

    fn on_tick(&mut self, elapsed: Duration) -> Result<StepOutcome> {
        let Some(session) = self.session.as_mut() else {
            return Ok(StepOutcome::Idle);
        };
        session.elapsed = elapsed;

        match self.phase {
            Phase::Alternating(Side::Player) => {
                if self.rules.mode == GameMode::TimeAttack
                    && let Some(in_play) = session.in_play_time()
                    && in_play > session.difficulty.time_budget()
                {
                    log::info!("time budget spent, match resolves for the opponent");
                    self.phase = Phase::Resolved(Resolution::TimedOut);
                    return Ok(StepOutcome::Resolved(Resolution::TimedOut));
                }
                Ok(StepOutcome::Idle)
            }
            Phase::Alternating(Side::Opponent) => Self::opponent_turn(session, &mut self.phase),
            _ => Ok(StepOutcome::Idle),
        }
    }

    /// The opponent's deferred move: pick a target among unrevealed cells
    /// (its own marker excluded) and reveal it. The reveal cannot fail by
    /// construction of the candidate set.
    fn opponent_turn(session: &mut Session, phase: &mut Phase) -> Result<StepOutcome> {
        let own_marker = session.policy.own_marker();
        let valid: Vec<GridIndex> = session
            .engine
            .unrevealed_indices()
            .into_iter()
            .filter(|&index| Some(index) != own_marker)
            .collect();

        let Some(target) = session.policy.decide_next_target(&valid) else {
            log::warn!("opponent has no legal target left, match stalls");
            *phase = Phase::Resolved(Resolution::Stalemate);
            return Ok(StepOutcome::Resolved(Resolution::Stalemate));
        };

        let coords = session.engine.index_to_coords(target)?;
        let outcome = session.engine.reveal(coords, Side::Opponent)?;
        session.policy.note_revealed(target);

        if let RevealOutcome::FoundMarker(victor) = outcome {
            *phase = Phase::Resolved(Resolution::MarkerFound { victor });
            return Ok(StepOutcome::OpponentRevealed {
                index: target,
                found: true,
            });
        }

        *phase = Phase::Alternating(Side::Player);
        Ok(StepOutcome::OpponentRevealed {
            index: target,
            found: false,
        })
    }
}
