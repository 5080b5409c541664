mod bake_job;
pub mod events;
pub mod gates;
pub mod params;
pub mod ring_buffer;
mod session;
pub mod state;

pub use events::SessionEvent;
pub use gates::Rejection;
pub use params::CaptureParams;
pub use session::{Capture, SampleOutcome};
pub use state::SessionState;

/// Tells whether face tracking is available on the current device.
pub trait CapabilityProbe {
    fn is_supported(&self) -> bool;
}

impl CapabilityProbe for bool {
    fn is_supported(&self) -> bool {
        *self
    }
}

impl<F: Fn() -> bool> CapabilityProbe for F {
    fn is_supported(&self) -> bool {
        self()
    }
}
