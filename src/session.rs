use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::config::Config;
use crate::events::GameEvent;
use crate::judge::{judge, Outcome};
use crate::target::roll_target;
use crate::track::{Step, Track};

/// Nominal render-surface width used to project percent positions into the
/// same units as `Config::target_window_size`. The presentation layer updates
/// it on resize.
pub const DEFAULT_SURFACE_WIDTH: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SessionStatus {
    Idle,
    Active,
    Won,
    Lost,
}

/// Sub-state within `Active`: commit is only legal while engaged, engage only
/// while ready.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Ready,
    Engaged,
}

/// One lock barrel. Unlocks exactly once per life of its target; a full reset
/// replaces every unit wholesale.
#[derive(Clone, Debug)]
pub struct LockUnit {
    pub id: usize,
    pub is_unlocked: bool,
    /// Target window center, in percent of track travel.
    pub target_position: f64,
}

/// A single lockpicking session: the unit sequence, the moving indicator, the
/// pick count, and win/loss detection.
///
/// All mutation flows through `engage`/`commit`/`on_tick`/`reset`. Illegal
/// actions (commit while ready, anything after termination) are silent
/// no-ops; wrong timing is gameplay, not an error. Consequences worth
/// presenting are queued as `GameEvent`s for the caller to drain.
#[derive(Debug)]
pub struct Session {
    config: Config,
    units: Vec<LockUnit>,
    /// 1-based pointer to the lowest-indexed locked unit.
    current_unit: usize,
    picks: u32,
    status: SessionStatus,
    phase: Phase,
    track: Track,
    /// Last run ended by overrun rather than a commit; cleared on the next
    /// engage.
    last_run_overran: bool,
    surface_width: f64,
    rng: SmallRng,
    events: Vec<GameEvent>,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Self::from_rng(config, SmallRng::from_entropy())
    }

    /// Deterministic session for tests and reproducible runs.
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Self::from_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn from_rng(config: Config, rng: SmallRng) -> Self {
        let track = Track::new(config.track_length);
        let picks = config.initial_picks;
        let mut session = Self {
            config,
            units: Vec::new(),
            current_unit: 1,
            picks,
            status: SessionStatus::Idle,
            phase: Phase::Ready,
            track,
            last_run_overran: false,
            surface_width: DEFAULT_SURFACE_WIDTH,
            rng,
            events: Vec::new(),
        };
        session.roll_units();
        session
    }

    fn roll_units(&mut self) {
        let range = self.config.target_range;
        self.units = (1..=self.config.unit_count)
            .map(|id| LockUnit {
                id,
                is_unlocked: false,
                target_position: roll_target(&mut self.rng, &range),
            })
            .collect();
    }

    /// Leave `Idle` and begin accepting actions. No-op in any other state.
    pub fn start(&mut self) {
        if self.status == SessionStatus::Idle {
            self.status = SessionStatus::Active;
        }
    }

    /// Re-initialize a fresh session from the same configuration. Valid from
    /// any state, including `Won` and `Lost`.
    pub fn reset(&mut self) {
        self.track.reset();
        self.roll_units();
        self.current_unit = 1;
        self.picks = self.config.initial_picks;
        self.phase = Phase::Ready;
        self.last_run_overran = false;
        self.status = SessionStatus::Active;
        self.events.clear();
    }

    /// Start the indicator for the current unit at a freshly sampled speed.
    pub fn engage(&mut self) {
        if self.status != SessionStatus::Active || self.phase != Phase::Ready {
            return;
        }
        if self.current().map_or(true, |u| u.is_unlocked) {
            return;
        }
        if self.picks == 0 {
            // Out of picks with a locked unit ahead: lose before the run
            // starts rather than after a pointless miss.
            self.terminate(SessionStatus::Lost);
            return;
        }

        let speed = self.sample_speed();
        if self.track.start(speed).is_err() {
            return;
        }
        self.phase = Phase::Engaged;
        self.last_run_overran = false;
        self.events.push(GameEvent::UnitEngaged {
            unit: self.current_unit,
            speed,
        });
    }

    /// Freeze the indicator and judge it against the current unit's window.
    pub fn commit(&mut self) {
        if self.status != SessionStatus::Active || self.phase != Phase::Engaged {
            return;
        }

        // Stop first so the judge reads a stable snapshot.
        self.track.stop();
        self.phase = Phase::Ready;

        let unit = self.current_unit;
        let target = match self.current() {
            Some(u) => u.target_position,
            None => return,
        };

        // Project indicator and target into surface units; the window size is
        // configured in that space.
        let position = self.track.position() / 100.0 * self.surface_width;
        let center = target / 100.0 * self.surface_width;
        let half_width = self.config.target_window_size / 2.0;

        match judge(position, center, half_width) {
            Outcome::Hit => self.apply_hit(unit),
            Outcome::Miss => self.apply_miss(unit),
        }
    }

    /// Advance the indicator one animation frame. Only meaningful while
    /// engaged; a stray tick after a stop or after termination does nothing.
    pub fn on_tick(&mut self) {
        if self.status != SessionStatus::Active || self.phase != Phase::Engaged {
            return;
        }
        if let Step::EndOfTrack = self.track.advance() {
            // Overrun is neutral: no judging, no pick cost, same unit.
            self.phase = Phase::Ready;
            self.last_run_overran = true;
            self.events.push(GameEvent::TrackEndReached);
        }
    }

    fn apply_hit(&mut self, unit: usize) {
        self.units[unit - 1].is_unlocked = true;
        self.events.push(GameEvent::UnitHit { unit });

        if unit == self.config.unit_count {
            self.terminate(SessionStatus::Won);
        } else {
            self.current_unit = unit + 1;
        }
    }

    fn apply_miss(&mut self, unit: usize) {
        self.picks -= 1;
        self.events.push(GameEvent::UnitMissed {
            unit,
            picks_left: self.picks,
        });

        // A miss re-locks every unit and rolls fresh targets for all of them.
        self.roll_units();
        self.current_unit = 1;
        self.events.push(GameEvent::FullReset);

        if self.picks == 0 {
            self.terminate(SessionStatus::Lost);
        }
    }

    fn terminate(&mut self, status: SessionStatus) {
        self.track.stop();
        self.phase = Phase::Ready;
        self.status = status;
        self.events.push(match status {
            SessionStatus::Won => GameEvent::SessionWon,
            _ => GameEvent::SessionLost,
        });
    }

    fn sample_speed(&mut self) -> f64 {
        self.config
            .speed_variants
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(1.0)
    }

    fn current(&self) -> Option<&LockUnit> {
        self.units.get(self.current_unit - 1)
    }

    // --- query surface for the presentation layer ---

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    /// 1-based index of the unit currently being picked.
    pub fn current_unit(&self) -> usize {
        self.current_unit
    }

    pub fn units(&self) -> &[LockUnit] {
        &self.units
    }

    pub fn picks(&self) -> u32 {
        self.picks
    }

    /// Indicator position in percent of track travel.
    pub fn indicator_position(&self) -> f64 {
        self.track.position()
    }

    pub fn is_engaged(&self) -> bool {
        self.phase == Phase::Engaged
    }

    /// True between an end-of-track overrun and the next engage; the current
    /// unit is waiting for another attempt rather than merely locked.
    pub fn last_run_overran(&self) -> bool {
        self.last_run_overran
    }

    pub fn track_length(&self) -> f64 {
        self.track.length()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Target window bounds for a unit, in percent of track travel, or None
    /// for an unknown id.
    pub fn target_bounds(&self, unit_id: usize) -> Option<(f64, f64)> {
        let unit = self.units.get(unit_id.checked_sub(1)?)?;
        let half_pct = self.config.target_window_size / 2.0 / self.surface_width * 100.0;
        Some((
            unit.target_position - half_pct,
            unit.target_position + half_pct,
        ))
    }

    /// Presentation layers call this when their render surface resizes, so
    /// the configured window width keeps meaning the same fraction of travel.
    pub fn set_surface_width(&mut self, width: f64) {
        if width.is_finite() && width > 0.0 {
            self.surface_width = width;
        }
    }

    /// Take everything that happened since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RawConfig;
    use assert_matches::assert_matches;

    /// Deterministic setup: one speed, a wide window (200 surface units on a
    /// 1000-wide surface, so ±10%), targets within reach of an 80% track.
    fn test_config() -> Config {
        Config::from_raw(RawConfig {
            unit_count: Some(3.0),
            initial_picks: Some(10.0),
            target_window_size: Some(200.0),
            speed_variants: Some(vec![1.0]),
            track_length: Some(80.0),
            target_position_min: Some(30.0),
            target_position_max: Some(70.0),
        })
    }

    fn active_session(seed: u64) -> Session {
        let mut session = Session::with_seed(test_config(), seed);
        session.start();
        session
    }

    /// Tick the engaged indicator until it sits inside the current window.
    /// With a 1.0 speed step and a 20%-wide window it cannot overshoot.
    fn tick_into_window(session: &mut Session) {
        let (lo, hi) = session.target_bounds(session.current_unit()).unwrap();
        while session.indicator_position() < lo {
            session.on_tick();
        }
        assert!(session.indicator_position() <= hi);
    }

    fn hit_current_unit(session: &mut Session) {
        session.engage();
        tick_into_window(session);
        session.commit();
    }

    #[test]
    fn test_new_session_is_idle_with_rolled_units() {
        let session = Session::with_seed(test_config(), 1);

        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.units().len(), 3);
        assert_eq!(session.current_unit(), 1);
        assert_eq!(session.picks(), 10);
        for unit in session.units() {
            assert!(!unit.is_unlocked);
            assert!((30.0..=70.0).contains(&unit.target_position));
        }
    }

    #[test]
    fn test_engage_before_start_is_noop() {
        let mut session = Session::with_seed(test_config(), 1);
        session.engage();

        assert!(!session.is_engaged());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_engage_starts_indicator_with_sampled_speed() {
        let mut session = active_session(2);
        session.engage();

        assert!(session.is_engaged());
        assert_eq!(session.indicator_position(), 0.0);
        assert_matches!(
            session.drain_events()[..],
            [GameEvent::UnitEngaged { unit: 1, speed }] if speed == 1.0
        );
    }

    #[test]
    fn test_engage_while_engaged_is_noop() {
        let mut session = active_session(2);
        session.engage();
        session.on_tick();
        let pos = session.indicator_position();
        session.drain_events();

        session.engage();

        assert_eq!(session.indicator_position(), pos);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_three_hits_win_without_spending_picks() {
        // Scenario A from the drawing board: hit every unit in sequence.
        let mut session = active_session(3);

        hit_current_unit(&mut session);
        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.current_unit(), 2);
        assert!(session.units()[0].is_unlocked);

        hit_current_unit(&mut session);
        assert_eq!(session.current_unit(), 3);
        // The pointer always trails the lowest locked unit.
        assert!(session.units()[..2].iter().all(|u| u.is_unlocked));

        hit_current_unit(&mut session);

        assert_eq!(session.status(), SessionStatus::Won);
        assert_eq!(session.picks(), 10);
        assert!(session.units().iter().all(|u| u.is_unlocked));

        let events = session.drain_events();
        assert_matches!(events.last(), Some(GameEvent::SessionWon));
        let hits = events
            .iter()
            .filter(|e| matches!(e, GameEvent::UnitHit { .. }))
            .count();
        assert_eq!(hits, 3);
    }

    #[test]
    fn test_last_pick_miss_loses_immediately() {
        // Scenario B: one pick, commit at position 0 (targets start at >= 20%).
        let config = Config {
            initial_picks: 1,
            ..test_config()
        };
        let mut session = Session::with_seed(config, 4);
        session.start();

        session.engage();
        session.commit();

        assert_eq!(session.picks(), 0);
        assert_eq!(session.status(), SessionStatus::Lost);
        assert!(session.units().iter().all(|u| !u.is_unlocked));

        let events = session.drain_events();
        assert_matches!(
            events[..],
            [
                GameEvent::UnitEngaged { .. },
                GameEvent::UnitMissed { unit: 1, picks_left: 0 },
                GameEvent::FullReset,
                GameEvent::SessionLost,
            ]
        );
    }

    #[test]
    fn test_overrun_is_neutral() {
        // Scenario C: let the indicator run off the end of the track.
        let mut session = active_session(5);
        session.engage();
        session.drain_events();

        for _ in 0..200 {
            session.on_tick();
        }

        assert_eq!(session.status(), SessionStatus::Active);
        assert!(!session.is_engaged());
        assert_eq!(session.current_unit(), 1);
        assert_eq!(session.picks(), 10);
        assert!(!session.units()[0].is_unlocked);
        assert_eq!(session.indicator_position(), 80.0);
        assert_matches!(session.drain_events()[..], [GameEvent::TrackEndReached]);
    }

    #[test]
    fn test_overrun_marks_unit_ready_until_next_engage() {
        let mut session = active_session(14);
        assert!(!session.last_run_overran());

        session.engage();
        for _ in 0..200 {
            session.on_tick();
        }
        assert!(session.last_run_overran());

        // The flag reports the gap between runs, not a lasting state.
        session.engage();
        assert!(!session.last_run_overran());
    }

    #[test]
    fn test_reset_clears_overran_flag() {
        let mut session = active_session(15);
        session.engage();
        for _ in 0..200 {
            session.on_tick();
        }
        assert!(session.last_run_overran());

        session.reset();
        assert!(!session.last_run_overran());
    }

    #[test]
    fn test_commit_while_ready_is_noop() {
        // Scenario D: commit with no prior engage.
        let mut session = active_session(6);
        session.commit();

        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.picks(), 10);
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_miss_relocks_and_rerolls_every_unit() {
        let mut session = active_session(7);

        hit_current_unit(&mut session);
        assert_eq!(session.current_unit(), 2);

        let targets_before: Vec<f64> =
            session.units().iter().map(|u| u.target_position).collect();

        // Miss unit 2 by committing at position 0.
        session.engage();
        session.commit();

        assert_eq!(session.status(), SessionStatus::Active);
        assert_eq!(session.picks(), 9);
        assert_eq!(session.current_unit(), 1);
        assert!(session.units().iter().all(|u| !u.is_unlocked));

        let targets_after: Vec<f64> =
            session.units().iter().map(|u| u.target_position).collect();
        assert_ne!(targets_before, targets_after);
    }

    #[test]
    fn test_engage_with_no_picks_is_immediate_loss() {
        // The validator never produces zero picks; a hand-built config can,
        // and the proactive check must catch it before the run starts.
        let config = Config {
            initial_picks: 0,
            ..test_config()
        };
        let mut session = Session::with_seed(config, 8);
        session.start();

        session.engage();

        assert_eq!(session.status(), SessionStatus::Lost);
        assert!(!session.is_engaged());
        assert_matches!(session.drain_events()[..], [GameEvent::SessionLost]);
    }

    #[test]
    fn test_actions_after_win_are_noops() {
        let mut session = active_session(9);
        for _ in 0..3 {
            hit_current_unit(&mut session);
        }
        assert_eq!(session.status(), SessionStatus::Won);
        session.drain_events();

        session.engage();
        session.commit();
        session.on_tick();

        assert_eq!(session.status(), SessionStatus::Won);
        assert!(!session.is_engaged());
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn test_reset_from_terminal_state_yields_fresh_active_session() {
        let mut session = active_session(10);
        for _ in 0..3 {
            hit_current_unit(&mut session);
        }
        assert_eq!(session.status(), SessionStatus::Won);

        session.reset();

        assert_eq!(session.status(), SessionStatus::Active);
        assert!(!session.is_engaged());
        assert_eq!(session.current_unit(), 1);
        assert_eq!(session.picks(), 10);
        assert_eq!(session.units().len(), 3);
        assert!(session.units().iter().all(|u| !u.is_unlocked));
        assert_eq!(session.indicator_position(), 0.0);
        assert!(session.drain_events().is_empty());

        // And the fresh session is playable.
        hit_current_unit(&mut session);
        assert_eq!(session.current_unit(), 2);
    }

    #[test]
    fn test_surface_width_scales_window_bounds() {
        let mut session = active_session(11);
        let (lo_before, hi_before) = session.target_bounds(1).unwrap();

        // Halving the surface doubles the window's share of travel.
        session.set_surface_width(500.0);
        let (lo_after, hi_after) = session.target_bounds(1).unwrap();
        assert!(hi_after - lo_after > hi_before - lo_before);

        // Nonsense widths are ignored.
        session.set_surface_width(0.0);
        session.set_surface_width(f64::NAN);
        assert_eq!(session.target_bounds(1).unwrap(), (lo_after, hi_after));
    }

    #[test]
    fn test_target_bounds_unknown_unit() {
        let session = active_session(12);
        assert_eq!(session.target_bounds(0), None);
        assert_eq!(session.target_bounds(17), None);
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = Session::with_seed(test_config(), 13);
        let b = Session::with_seed(test_config(), 13);

        let ta: Vec<f64> = a.units().iter().map(|u| u.target_position).collect();
        let tb: Vec<f64> = b.units().iter().map(|u| u.target_position).collect();
        assert_eq!(ta, tb);
    }
}
