/// Abstract happenings the presentation layer reacts to (sounds, flashes,
/// screen switches). The core only records them; it never renders.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GameEvent {
    /// The indicator started moving for a unit.
    UnitEngaged { unit: usize, speed: f64 },
    /// A commit landed inside the target window.
    UnitHit { unit: usize },
    /// A commit landed outside the target window; a pick broke.
    UnitMissed { unit: usize, picks_left: u32 },
    /// Every unit re-locked with fresh targets after a miss.
    FullReset,
    /// The indicator ran off the end of the track with no commit.
    TrackEndReached,
    SessionWon,
    SessionLost,
}
