use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Serial link to the tilt sensor.
    pub serial: SerialConfig,
    /// Tilt-to-steering thresholds.
    pub helm: HelmConfig,
    /// Terminal monitor behavior.
    pub monitor: MonitorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device the sensor is attached to, e.g. `COM6` or `/dev/ttyUSB0`.
    pub port: String,
    /// Line speed the sensor firmware is flashed for.
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: default_port().to_string(),
            baud_rate: 115_200,
        }
    }
}

fn default_port() -> &'static str {
    if cfg!(windows) {
        "COM6"
    } else {
        "/dev/ttyUSB0"
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HelmConfig {
    /// Roll past this many degrees steers left/right.
    pub roll_threshold_deg: f32,
    /// Pitching forward past this many degrees engages thrust.
    pub pitch_threshold_deg: f32,
}

impl Default for HelmConfig {
    fn default() -> Self {
        Self {
            roll_threshold_deg: 15.0,
            pitch_threshold_deg: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Status line redraws per second.
    pub refresh_hz: u32,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self { refresh_hz: 30 }
    }
}

impl MonitorConfig {
    /// Tick period for the status redraw. Never zero: rates above 1 kHz
    /// clamp to one millisecond, a zero rate means once per second.
    pub fn period(&self) -> Duration {
        Duration::from_millis((1000 / self.refresh_hz.max(1)).max(1) as u64)
    }
}
