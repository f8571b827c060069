//! Gameplay: tilt control, gestures and the maze session lifecycle

pub mod controller;
pub mod gestures;
pub mod state;
pub mod tilt;

pub use controller::GameplayController;
pub use gestures::{GestureState, pan_basis};
pub use state::{
    GameEvent, GesturePhase, PanSample, PinchSample, SessionPhase, SessionSnapshot, TickInput,
};
pub use tilt::{smooth_toward, target_tilt, tilt_angles};
