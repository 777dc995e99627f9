/// One sensor-reported orientation reading.
///
/// All three axes are in degrees, exactly as the sensor firmware fused them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSample {
    /// Rotation about the forward axis (lean left/right).
    pub roll: f32,
    /// Rotation about the lateral axis (nose up/down).
    pub pitch: f32,
    /// Rotation about the vertical axis (heading).
    pub yaw: f32,
}

impl Default for OrientationSample {
    fn default() -> Self {
        Self {
            roll: 0.0,
            pitch: 0.0,
            yaw: 0.0,
        }
    }
}

impl OrientationSample {
    /// This sample expressed relative to a zero reference, each axis
    /// normalized into (-180, 180].
    pub fn relative_to(self, zero: OrientationSample) -> OrientationSample {
        OrientationSample {
            roll: wrap_degrees(self.roll - zero.roll),
            pitch: wrap_degrees(self.pitch - zero.pitch),
            yaw: wrap_degrees(self.yaw - zero.yaw),
        }
    }
}

/// Lifecycle of the link between the reader and the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// The background task is running and the stream is open.
    Connected,
    /// The stream ended or failed; samples are frozen at their last values.
    Disconnected,
    /// `close()` was called and the task has been told to stop.
    Closed,
}

/// Normalize an angle in degrees into (-180, 180].
pub(crate) fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}
