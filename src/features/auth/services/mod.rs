mod session_gate;

pub use session_gate::{SessionGate, SessionObserver};
