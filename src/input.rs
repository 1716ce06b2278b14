use crate::session::Session;

/// The two logical actions the core understands. Everything else a front-end
/// receives (navigation, restart keys, clicks) is its own concern.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Start the indicator moving.
    Engage,
    /// Freeze the indicator and judge it.
    Commit,
}

/// Forward a logical action to the session, gated on the session still being
/// live. The session itself absorbs actions that are illegal in its current
/// phase.
pub fn apply_action(session: &mut Session, action: Action) {
    if !session.is_active() {
        return;
    }
    match action {
        Action::Engage => session.engage(),
        Action::Commit => session.commit(),
    }
}
