//! Round state machine.
//!
//! A [`Session`] owns one run: the visible pair, the score, the used-name
//! history and the single scheduled step (the promotion that follows a
//! correct guess). Every transition takes the caller's clock reading and
//! returns the events the presentation layer should animate.
//!
//! ```text
//! Idle --start--> Active(hidden) --guess--> Active(revealed) --tick--> Active(hidden)
//!                                                 |
//!                                                 +--wrong--> GameOver --play_again--> Active(hidden)
//! ```
//!
//! A guess is written to storage before it is scored. If the page goes away
//! between the click and the result, the next `start` scores that same guess
//! against the same pair instead of letting the player pick again.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Artist, Catalog};
use crate::config::GameConfig;
use crate::difficulty::next_difficulty;
use crate::error::GameError;
use crate::persistence::{PersistenceGateway, StorageBackend};
use crate::selector::{MatchSelector, left_wins};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn parse(s: &str) -> Option<Side> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Side::Left),
            "right" => Some(Side::Right),
            _ => None,
        }
    }

    /// Whether picking this side as the more popular card is right.
    pub fn is_correct(self, left: &Artist, right: &Artist) -> bool {
        let left_more = left_wins(left, right);
        match self {
            Side::Left => left_more,
            Side::Right => !left_more,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    pub score: u32,
    pub left: Artist,
    pub right: Artist,
    /// Recently shown names, oldest first.
    pub used_names: Vec<String>,
    pub game_over: bool,
    pub revealed: bool,
    /// Guess submitted but not yet scored.
    pub pending_choice: Option<Side>,
}

impl RoundState {
    /// Append a shown name, cutting history back to `memory_limit` once it
    /// grows past twice that. Trimmed names are gone for good.
    pub fn remember(&mut self, name: &str, config: &GameConfig) {
        self.used_names.push(name.to_string());
        self.trim_history(config);
    }

    fn trim_history(&mut self, config: &GameConfig) {
        if self.used_names.len() > config.history_cap() {
            let cut = self.used_names.len() - config.memory_limit;
            self.used_names.drain(..cut);
        }
    }

    /// Presentation view: the right card's popularity stays hidden until the
    /// guess is revealed.
    pub fn view(&self) -> RoundView {
        RoundView {
            score: self.score,
            left: self.left.clone(),
            right_name: self.right.name.clone(),
            right_image_ref: self.right.image_ref.clone(),
            right_popularity: self.revealed.then_some(self.right.popularity),
            revealed: self.revealed,
            game_over: self.game_over,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundView {
    pub score: u32,
    pub left: Artist,
    pub right_name: String,
    pub right_image_ref: String,
    pub right_popularity: Option<u64>,
    pub revealed: bool,
    pub game_over: bool,
}

/// Notifications for the presentation layer (animations, sounds).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameEvent {
    MatchResolved { side: Side, correct: bool, new_score: u32 },
    GameOver { final_score: u32 },
    NewRound { left: Artist, right: Artist },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Phase {
    Idle,
    Active { revealed: bool },
    GameOver,
}

/// Promotion staged by a correct guess, applied once `due_ms` has passed.
#[derive(Clone, Debug)]
struct ScheduledPromotion {
    due_ms: f64,
    next: RoundState,
}

pub struct Session<S, R> {
    catalog: Catalog,
    config: GameConfig,
    gateway: PersistenceGateway<S>,
    rng: R,
    state: Option<RoundState>,
    scheduled: Option<ScheduledPromotion>,
}

impl<S: StorageBackend, R: Rng> Session<S, R> {
    /// Fails with [`GameError::Config`] when `config` does not validate.
    pub fn new(
        catalog: Catalog,
        config: GameConfig,
        backend: S,
        rng: R,
    ) -> Result<Self, GameError> {
        config.validate()?;
        let gateway = PersistenceGateway::new(backend, config.storage_key.clone());
        Ok(Self {
            catalog,
            config,
            gateway,
            rng,
            state: None,
            scheduled: None,
        })
    }

    // --- Accessors ----------------------------------------------------------

    pub fn state(&self) -> Option<&RoundState> {
        self.state.as_ref()
    }

    pub fn phase(&self) -> Phase {
        match &self.state {
            None => Phase::Idle,
            Some(s) if s.game_over => Phase::GameOver,
            Some(s) => Phase::Active {
                revealed: s.revealed,
            },
        }
    }

    pub fn score(&self) -> u32 {
        self.state.as_ref().map_or(0, |s| s.score)
    }

    /// Clock reading at which the scheduled promotion becomes due.
    pub fn next_deadline(&self) -> Option<f64> {
        self.scheduled.as_ref().map(|p| p.due_ms)
    }

    pub fn gateway(&self) -> &PersistenceGateway<S> {
        &self.gateway
    }

    // --- Transitions --------------------------------------------------------

    /// Enter the game mode: resume the saved round (scoring any guess that
    /// was in flight) or deal a fresh pair.
    pub fn start(&mut self, now_ms: f64) -> Result<Vec<GameEvent>, GameError> {
        self.scheduled = None;
        self.require_catalog()?;
        let mut events = Vec::new();

        match self.load_saved() {
            Some(mut state) => {
                state.game_over = false;
                state.trim_history(&self.config);
                let pending = state.pending_choice;
                log::info!(
                    "round: resuming '{}' vs '{}' at score {}",
                    state.left.name,
                    state.right.name,
                    state.score
                );
                events.push(GameEvent::NewRound {
                    left: state.left.clone(),
                    right: state.right.clone(),
                });
                self.state = Some(state);
                if let Some(side) = pending {
                    log::info!("round: replaying interrupted {side:?} guess");
                    self.resolve(side, now_ms, &mut events);
                }
            }
            None => {
                let state = self.deal_fresh(0, &[])?;
                log::info!("round: new run '{}' vs '{}'", state.left.name, state.right.name);
                events.push(GameEvent::NewRound {
                    left: state.left.clone(),
                    right: state.right.clone(),
                });
                self.state = Some(state);
                self.persist();
            }
        }
        Ok(events)
    }

    /// Score a guess. Ignored (no events) unless a round is showing, hidden,
    /// and not over.
    pub fn submit_guess(&mut self, side: Side, now_ms: f64) -> Vec<GameEvent> {
        let Some(state) = self.state.as_mut() else {
            log::debug!("round: guess ignored, no active round");
            return Vec::new();
        };
        if state.revealed || state.game_over {
            log::debug!(
                "round: guess ignored (revealed={}, game_over={})",
                state.revealed,
                state.game_over
            );
            return Vec::new();
        }
        state.revealed = true;
        state.pending_choice = Some(side);
        self.persist();

        let mut events = Vec::new();
        self.resolve(side, now_ms, &mut events);
        events
    }

    /// Apply the scheduled promotion if it is due.
    pub fn tick(&mut self, now_ms: f64) -> Vec<GameEvent> {
        let Some(promotion) = self.scheduled.take_if(|p| now_ms >= p.due_ms) else {
            return Vec::new();
        };
        let next = promotion.next;
        let event = GameEvent::NewRound {
            left: next.left.clone(),
            right: next.right.clone(),
        };
        self.state = Some(next);
        self.persist();
        vec![event]
    }

    /// Start a new run from score zero with an empty history.
    pub fn play_again(&mut self, _now_ms: f64) -> Result<Vec<GameEvent>, GameError> {
        self.scheduled = None;
        self.require_catalog()?;
        self.clear_saved();

        let previous: Vec<String> = self
            .state
            .as_ref()
            .map(|s| vec![s.left.name.clone(), s.right.name.clone()])
            .unwrap_or_default();
        let displayed: Vec<&str> = previous.iter().map(String::as_str).collect();
        let state = self.deal_fresh(0, &displayed)?;
        log::info!(
            "round: play again '{}' vs '{}'",
            state.left.name,
            state.right.name
        );
        let events = vec![GameEvent::NewRound {
            left: state.left.clone(),
            right: state.right.clone(),
        }];
        self.state = Some(state);
        self.persist();
        Ok(events)
    }

    /// Leave the game mode. The saved round stays for a later `start`.
    pub fn deactivate(&mut self) {
        if self.state.take().is_some() {
            log::info!("round: deactivated");
        }
        self.scheduled = None;
    }

    // --- Internals ----------------------------------------------------------

    fn require_catalog(&self) -> Result<(), GameError> {
        if self.catalog.len() < 2 {
            log::warn!("round: catalog has {} artists, cannot deal", self.catalog.len());
            return Err(GameError::CatalogUnavailable {
                artists: self.catalog.len(),
            });
        }
        Ok(())
    }

    /// Score `side` against the current pair. Shared by live guesses and
    /// replayed ones so both paths produce identical outcomes.
    fn resolve(&mut self, side: Side, now_ms: f64, events: &mut Vec<GameEvent>) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        let correct = side.is_correct(&state.left, &state.right);
        state.pending_choice = None;
        state.revealed = true;

        if !correct {
            state.game_over = true;
            let final_score = state.score;
            log::info!("round: wrong guess, run over at {final_score}");
            events.push(GameEvent::MatchResolved {
                side,
                correct,
                new_score: final_score,
            });
            events.push(GameEvent::GameOver { final_score });
            self.scheduled = None;
            self.clear_saved();
            return;
        }

        state.score += 1;
        let new_score = state.score;
        log::debug!("round: correct {side:?} guess, score {new_score}");
        events.push(GameEvent::MatchResolved {
            side,
            correct,
            new_score,
        });

        let Some(next) = self.promoted_round() else {
            return;
        };
        // The promoted round is saved right away: a reload during the reveal
        // lands on the next pair, with no pending guess left to re-score.
        if let Err(e) = self.gateway.save(&next) {
            log::warn!("round: failed to persist promoted round: {e}");
        }
        self.scheduled = Some(ScheduledPromotion {
            due_ms: now_ms + self.config.promotion_delay_ms,
            next,
        });
    }

    /// Right card moves left and a new opponent is drawn for it.
    fn promoted_round(&mut self) -> Option<RoundState> {
        let current = self.state.as_ref()?;
        let score = current.score;
        let mut next = RoundState {
            score,
            left: current.right.clone(),
            right: current.left.clone(),
            used_names: current.used_names.clone(),
            game_over: false,
            revealed: false,
            pending_choice: None,
        };
        next.remember(&current.right.name, &self.config);

        match draw_opponent(
            &self.catalog,
            &self.config,
            &mut self.rng,
            &next.left,
            &next.used_names,
            score,
        ) {
            Some(right) => {
                next.remember(&right.name, &self.config);
                next.right = right;
                Some(next)
            }
            None => {
                log::warn!("round: no opponent for '{}', dealing a fresh pair", next.left.name);
                match self.deal_fresh(score, &[]) {
                    Ok(fresh) => Some(fresh),
                    Err(e) => {
                        log::error!("round: cannot continue run: {e}");
                        None
                    }
                }
            }
        }
    }

    /// New pair with an empty history. `displayed` are only avoided when
    /// nothing else is left.
    fn deal_fresh(&mut self, score: u32, displayed: &[&str]) -> Result<RoundState, GameError> {
        let left = MatchSelector::new(&self.catalog, &self.config)
            .select_initial(&[], displayed, None, &mut self.rng)
            .cloned()
            .ok_or(GameError::NoCandidateAvailable)?;
        let used = vec![left.name.clone()];
        let right = draw_opponent(&self.catalog, &self.config, &mut self.rng, &left, &used, score)
            .ok_or(GameError::NoCandidateAvailable)?;
        let mut state = RoundState {
            score,
            left,
            right,
            used_names: used,
            game_over: false,
            revealed: false,
            pending_choice: None,
        };
        let right_name = state.right.name.clone();
        state.remember(&right_name, &self.config);
        Ok(state)
    }

    fn load_saved(&mut self) -> Option<RoundState> {
        match self.gateway.load() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("round: discarding saved round: {}", GameError::from(e));
                self.clear_saved();
                None
            }
        }
    }

    fn persist(&mut self) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        if let Err(e) = self.gateway.save(state) {
            log::warn!("round: failed to persist round: {e}");
        }
    }

    fn clear_saved(&mut self) {
        if let Err(e) = self.gateway.clear() {
            log::warn!("round: failed to clear saved round: {e}");
        }
    }
}

/// Opponent for `left`: similarity-ranked pick at the rolled difficulty,
/// falling back to the relaxed fresh-pick chain.
fn draw_opponent(
    catalog: &Catalog,
    config: &GameConfig,
    rng: &mut impl Rng,
    left: &Artist,
    used_names: &[String],
    score: u32,
) -> Option<Artist> {
    let selector = MatchSelector::new(catalog, config);
    let excluded: HashSet<&str> = used_names.iter().map(String::as_str).collect();
    let difficulty = next_difficulty(score, rng);
    selector
        .select_opponent(left, &excluded, difficulty, rng)
        .or_else(|| {
            log::debug!("round: matchup pool exhausted for '{}', using fallback", left.name);
            selector.select_initial(used_names, &[left.name.as_str()], Some(left), rng)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn catalog(pops: &[u64]) -> Catalog {
        Catalog::new(
            pops.iter()
                .enumerate()
                .map(|(i, &p)| Artist::new(format!("a{i}"), p, format!("img/a{i}.png")))
                .collect(),
        )
    }

    fn session(pops: &[u64], seed: u64) -> Session<MemoryStorage, ChaCha8Rng> {
        Session::new(
            catalog(pops),
            GameConfig::default(),
            MemoryStorage::new(),
            ChaCha8Rng::seed_from_u64(seed),
        )
        .unwrap()
    }

    fn winning_side(s: &RoundState) -> Side {
        if left_wins(&s.left, &s.right) {
            Side::Left
        } else {
            Side::Right
        }
    }

    #[test]
    fn test_side_parse() {
        assert_eq!(Side::parse("left"), Some(Side::Left));
        assert_eq!(Side::parse(" RIGHT "), Some(Side::Right));
        assert_eq!(Side::parse("up"), None);
    }

    #[test]
    fn test_remember_trims_to_memory_limit() {
        let cfg = GameConfig::default();
        let mut s = RoundState {
            score: 0,
            left: Artist::new("l", 1, ""),
            right: Artist::new("r", 2, ""),
            used_names: Vec::new(),
            game_over: false,
            revealed: false,
            pending_choice: None,
        };
        for i in 0..40 {
            s.remember(&format!("n{i}"), &cfg);
        }
        assert_eq!(s.used_names.len(), 40);
        s.remember("n40", &cfg);
        assert_eq!(s.used_names.len(), 20);
        assert_eq!(s.used_names.first().map(String::as_str), Some("n21"));
        assert_eq!(s.used_names.last().map(String::as_str), Some("n40"));
    }

    #[test]
    fn test_start_deals_distinct_pair_and_persists() {
        let mut s = session(&[10, 20, 30, 40, 50], 1);
        assert_eq!(s.phase(), Phase::Idle);
        let events = s.start(0.0).unwrap();
        let st = s.state().unwrap();
        assert_ne!(st.left.name, st.right.name);
        assert_eq!(st.used_names, vec![st.left.name.clone(), st.right.name.clone()]);
        assert_eq!(s.phase(), Phase::Active { revealed: false });
        assert!(matches!(events.as_slice(), [GameEvent::NewRound { .. }]));
        assert!(s.gateway().load().unwrap().is_some());
    }

    #[test]
    fn test_start_requires_two_artists() {
        let mut s = session(&[10], 1);
        assert!(matches!(
            s.start(0.0),
            Err(GameError::CatalogUnavailable { artists: 1 })
        ));
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.submit_guess(Side::Left, 0.0).is_empty());
    }

    #[test]
    fn test_correct_guess_schedules_promotion() {
        let mut s = session(&[10, 20, 30, 40, 50, 60], 2);
        s.start(0.0).unwrap();
        let before = s.state().unwrap().clone();
        let side = winning_side(&before);

        let events = s.submit_guess(side, 100.0);
        assert_eq!(
            events,
            vec![GameEvent::MatchResolved {
                side,
                correct: true,
                new_score: 1
            }]
        );
        assert_eq!(s.phase(), Phase::Active { revealed: true });
        assert_eq!(s.next_deadline(), Some(3600.0));

        // double submission while revealed is ignored
        assert!(s.submit_guess(side, 200.0).is_empty());
        assert_eq!(s.score(), 1);

        assert!(s.tick(3599.0).is_empty());
        let events = s.tick(3600.0);
        assert!(matches!(events.as_slice(), [GameEvent::NewRound { .. }]));
        let after = s.state().unwrap();
        assert_eq!(after.left, before.right);
        assert_ne!(after.right.name, after.left.name);
        assert!(!after.revealed);
        assert_eq!(after.pending_choice, None);
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn test_wrong_guess_ends_run_and_clears_storage() {
        let mut s = session(&[10, 20, 30, 40], 3);
        s.start(0.0).unwrap();
        let losing = match winning_side(s.state().unwrap()) {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        };
        let events = s.submit_guess(losing, 10.0);
        assert_eq!(events.last(), Some(&GameEvent::GameOver { final_score: 0 }));
        assert_eq!(s.phase(), Phase::GameOver);
        assert!(s.gateway().load().unwrap().is_none());
        assert!(s.submit_guess(Side::Left, 20.0).is_empty());
        assert!(s.tick(1e9).is_empty());
    }

    #[test]
    fn test_play_again_resets() {
        let mut s = session(&[10, 20, 30, 40], 4);
        s.start(0.0).unwrap();
        let side = winning_side(s.state().unwrap());
        s.submit_guess(side, 0.0);
        s.tick(1e6);
        let events = s.play_again(2e6).unwrap();
        let st = s.state().unwrap();
        assert_eq!(st.score, 0);
        assert_ne!(st.left.name, st.right.name);
        assert_eq!(st.used_names.len(), 2);
        assert_eq!(events.len(), 1);
        assert_eq!(s.phase(), Phase::Active { revealed: false });
    }

    #[test]
    fn test_play_again_cancels_scheduled_promotion() {
        let mut s = session(&[10, 20, 30, 40, 50], 5);
        s.start(0.0).unwrap();
        let side = winning_side(s.state().unwrap());
        s.submit_guess(side, 0.0);
        assert!(s.next_deadline().is_some());
        s.play_again(1.0).unwrap();
        assert_eq!(s.next_deadline(), None);
        assert!(s.tick(1e9).is_empty());
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_two_artist_catalog_keeps_going() {
        let mut s = session(&[10, 20], 6);
        s.start(0.0).unwrap();
        for round in 1..=10 {
            let side = winning_side(s.state().unwrap());
            s.submit_guess(side, 0.0);
            s.tick(f64::MAX);
            let st = s.state().unwrap();
            assert_eq!(st.score, round);
            assert_ne!(st.left.name, st.right.name);
        }
    }

    #[test]
    fn test_deactivate_keeps_saved_round() {
        let mut s = session(&[10, 20, 30], 7);
        s.start(0.0).unwrap();
        let pair = s.state().cloned().unwrap();
        s.deactivate();
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.submit_guess(Side::Left, 0.0).is_empty());
        s.start(0.0).unwrap();
        assert_eq!(s.state().unwrap().left, pair.left);
        assert_eq!(s.state().unwrap().right, pair.right);
    }

    #[test]
    fn test_view_hides_right_popularity_until_reveal() {
        let mut s = session(&[10, 20, 30], 8);
        s.start(0.0).unwrap();
        assert_eq!(s.state().unwrap().view().right_popularity, None);
        s.submit_guess(Side::Left, 0.0);
        let st = s.state().unwrap();
        assert_eq!(st.view().right_popularity, Some(st.right.popularity));
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let cfg = GameConfig {
            memory_limit: 0,
            relaxed_memory: 0,
            ..GameConfig::default()
        };
        let res = Session::new(
            catalog(&[10, 20, 30]),
            cfg,
            MemoryStorage::new(),
            ChaCha8Rng::seed_from_u64(1),
        );
        assert!(matches!(res, Err(GameError::Config(_))));
    }

    #[test]
    fn test_event_json_shape() {
        let ev = GameEvent::MatchResolved {
            side: Side::Left,
            correct: true,
            new_score: 3,
        };
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["type"], "matchResolved");
        assert_eq!(v["side"], "left");
        assert_eq!(v["newScore"], 3);
        let v = serde_json::to_value(GameEvent::GameOver { final_score: 2 }).unwrap();
        assert_eq!(v["type"], "gameOver");
        assert_eq!(v["finalScore"], 2);
    }
}
