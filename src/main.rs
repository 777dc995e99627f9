use anyhow::Result;
use std::io::Write;
use tilt_config::AppConfig;
use tilt_helm::{Steering, TiltHelm, Turn};
use tilt_telemetry::{LinkState, OrientationSample, TelemetryReader};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging. Logs go to stderr so they do not fight the
    // status line on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiltmon=info,tilt_telemetry=info,tilt_config=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Tilt telemetry monitor starting");

    // Load config; the first run writes a defaults file to edit.
    let config = tilt_config::load_or_init_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        port = %config.serial.port,
        baud_rate = config.serial.baud_rate,
        "Config loaded"
    );

    // Connect to the sensor (fall back to mock if it is not plugged in).
    let mut reader = match TelemetryReader::connect(&config.serial.port, config.serial.baud_rate) {
        Ok(reader) => {
            info!("Sensor connected");
            reader
        }
        Err(e) => {
            warn!(?e, "Sensor not available, using mock telemetry");
            TelemetryReader::mock()
        }
    };

    let helm = TiltHelm::new(
        config.helm.roll_threshold_deg,
        config.helm.pitch_threshold_deg,
    );

    println!("Commands: zero (tare), reset (absolute), quit");

    let mut ticker = tokio::time::interval(config.monitor.period());
    let mut input_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let sample = reader.sample();
                let steering = helm.steer(sample);
                draw_status(sample, steering, reader.link_state());
            }
            line = input_lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => match line.trim() {
                        "zero" => {
                            reader.set_zero();
                            info!("Zero reference set");
                        }
                        "reset" => {
                            reader.clear_zero();
                            info!("Zero reference cleared");
                        }
                        "quit" | "q" => break,
                        "" => {}
                        other => {
                            warn!(command = other, "Unknown command (try: zero, reset, quit)");
                        }
                    },
                    // stdin closed (piped input ran out); keep monitoring.
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    // Move off the status line before shutdown logs.
    println!();

    reader.close().await;
    info!("Telemetry reader closed");

    Ok(())
}

/// Redraw the single status line in place.
fn draw_status(sample: OrientationSample, steering: Steering, link: LinkState) {
    let turn = match steering.turn {
        Turn::Left => "LEFT ",
        Turn::Right => "RIGHT",
        Turn::Neutral => "  -  ",
    };
    let thrust = if steering.thrust { "ON " } else { "off" };
    let link = match link {
        LinkState::Connected => "connected",
        LinkState::Disconnected => "DISCONNECTED",
        LinkState::Closed => "closed",
    };

    print!(
        "\rroll {:+8.2}  pitch {:+8.2}  yaw {:+8.2}  |  turn {}  thrust {}  |  {}    ",
        sample.roll, sample.pitch, sample.yaw, turn, thrust, link
    );
    let _ = std::io::stdout().flush();
}
