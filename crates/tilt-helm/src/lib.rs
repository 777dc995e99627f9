pub mod tilt;

pub use tilt::TiltHelm;

/// Turn direction requested by the pilot's lean.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
    Neutral,
}

/// One frame's steering decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Steering {
    /// Which way to rotate, if any.
    pub turn: Turn,
    /// Whether thrust is engaged.
    pub thrust: bool,
}

impl Steering {
    /// No rotation, no thrust.
    pub const NEUTRAL: Steering = Steering {
        turn: Turn::Neutral,
        thrust: false,
    };
}
