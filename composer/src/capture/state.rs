use derive_more::Display;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum SessionState {
    #[display(fmt = "idle")]
    Idle,
    #[display(fmt = "capturing")]
    Capturing,
    #[display(fmt = "finalizing")]
    Finalizing,
    #[display(fmt = "ready")]
    Ready,
    #[display(fmt = "rejected")]
    Rejected,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Transition {
    Start,
    Finish,
    Complete,
    Fail,
    Reset,
}

/// Session lifecycle; `None` means the transition is illegal in `state`.
pub fn next(
    state: SessionState,
    transition: Transition,
) -> Option<SessionState> {
    use SessionState::*;
    use Transition::*;

    match (state, transition) {
        (_, Reset) => Some(Idle),
        (Idle, Start) => Some(Capturing),
        (Capturing, Finish) => Some(Finalizing),
        (Finalizing, Complete) => Some(Ready),
        (Finalizing, Fail) => Some(Rejected),
        _ => None,
    }
}
