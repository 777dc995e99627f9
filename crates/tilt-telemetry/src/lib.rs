pub mod protocol;
pub mod types;

pub use types::{LinkState, OrientationSample};

use protocol::LineParser;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_serial::SerialPortBuilderExt;

/// Failed to open the serial device.
#[derive(Debug, Error)]
#[error("failed to open {port} at {baud_rate} baud")]
pub struct ConnectionError {
    pub port: String,
    pub baud_rate: u32,
    #[source]
    pub source: tokio_serial::Error,
}

/// Commands sent to the telemetry read task.
enum ReaderCommand {
    SetZero,
    ClearZero,
}

/// Reader for a tilt sensor streaming `roll/pitch/yaw` lines.
///
/// Owns a background task that reads the byte stream, parses the line
/// protocol, and publishes the latest orientation snapshot. Accessors never
/// block and are safe from any task; an entire sample is replaced atomically,
/// so the three axes always come from the same line.
pub struct TelemetryReader {
    sample_rx: watch::Receiver<OrientationSample>,
    link_rx: watch::Receiver<LinkState>,
    command_tx: mpsc::UnboundedSender<ReaderCommand>,
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl TelemetryReader {
    /// Open a serial port (8 data bits, no parity, 1 stop bit, no flow
    /// control) and start reading telemetry from it.
    pub fn connect(port: &str, baud_rate: u32) -> Result<Self, ConnectionError> {
        tracing::info!(port, baud_rate, "Opening tilt sensor port");

        let stream = tokio_serial::new(port, baud_rate)
            .data_bits(tokio_serial::DataBits::Eight)
            .parity(tokio_serial::Parity::None)
            .stop_bits(tokio_serial::StopBits::One)
            .flow_control(tokio_serial::FlowControl::None)
            .open_native_async()
            .map_err(|source| ConnectionError {
                port: port.to_string(),
                baud_rate,
                source,
            })?;

        tracing::info!(port, "Tilt sensor connected");
        Ok(Self::from_stream(stream))
    }

    /// Start reading telemetry from an arbitrary byte stream (recorded
    /// session replay, test harnesses).
    pub fn from_stream<R>(stream: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (sample_tx, sample_rx) = watch::channel(OrientationSample::default());
        let (link_tx, link_rx) = watch::channel(LinkState::Connected);
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();

        let task = tokio::spawn(read_loop(stream, sample_tx, link_tx, command_rx, stop_rx));

        Self {
            sample_rx,
            link_rx,
            command_tx,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Create a mock reader for development without the sensor connected.
    /// Publishes smooth synthetic motion on all three axes.
    pub fn mock() -> Self {
        let (sample_tx, sample_rx) = watch::channel(OrientationSample::default());
        let (link_tx, link_rx) = watch::channel(LinkState::Connected);
        let (command_tx, _) = mpsc::unbounded_channel();
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(std::time::Duration::from_millis(20));
            let mut t: f32 = 0.0;
            loop {
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        t += 0.02;
                        let _ = sample_tx.send(OrientationSample {
                            roll: 20.0 * (0.7 * t).sin(),
                            pitch: -12.0 * (0.4 * t).sin(),
                            yaw: types::wrap_degrees(9.0 * t),
                        });
                    }
                }
            }
            let _ = link_tx.send(LinkState::Closed);
        });

        Self {
            sample_rx,
            link_rx,
            command_tx,
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Latest published sample (non-blocking).
    pub fn sample(&self) -> OrientationSample {
        *self.sample_rx.borrow()
    }

    /// Latest roll in degrees; `0.0` before the first parsed line.
    pub fn roll(&self) -> f32 {
        self.sample().roll
    }

    /// Latest pitch in degrees; `0.0` before the first parsed line.
    pub fn pitch(&self) -> f32 {
        self.sample().pitch
    }

    /// Latest yaw in degrees; `0.0` before the first parsed line.
    pub fn yaw(&self) -> f32 {
        self.sample().yaw
    }

    /// Watch sample updates instead of polling.
    pub fn subscribe(&self) -> watch::Receiver<OrientationSample> {
        self.sample_rx.clone()
    }

    /// Current state of the link to the sensor.
    pub fn link_state(&self) -> LinkState {
        *self.link_rx.borrow()
    }

    /// Capture the current orientation as the zero reference; subsequent
    /// samples are published relative to it.
    pub fn set_zero(&self) {
        let _ = self.command_tx.send(ReaderCommand::SetZero);
    }

    /// Drop the zero reference and publish absolute orientation again.
    pub fn clear_zero(&self) {
        let _ = self.command_tx.send(ReaderCommand::ClearZero);
    }

    /// Stop the read task and wait for it to exit, releasing the device.
    /// Calling `close` again is a no-op.
    pub async fn close(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(?e, "Telemetry read task failed to join");
            }
        }
    }
}

/// Background task: read the byte stream, parse lines, publish samples.
async fn read_loop<R>(
    mut stream: R,
    sample_tx: watch::Sender<OrientationSample>,
    link_tx: watch::Sender<LinkState>,
    mut command_rx: mpsc::UnboundedReceiver<ReaderCommand>,
    mut stop_rx: oneshot::Receiver<()>,
) where
    R: AsyncRead + Unpin,
{
    let mut parser = LineParser::new();
    let mut buf = [0u8; 512];
    let mut raw = OrientationSample::default();
    let mut zero: Option<OrientationSample> = None;
    let mut line_count: u64 = 0;

    // Resolves on close() and when the reader is dropped unclosed.
    let exit_state = loop {
        tokio::select! {
            _ = &mut stop_rx => {
                break LinkState::Closed;
            }
            result = stream.read(&mut buf) => {
                match result {
                    Ok(0) => {
                        tracing::warn!("Telemetry stream ended");
                        break LinkState::Disconnected;
                    }
                    Ok(n) => {
                        parser.push_data(&buf[..n]);

                        // Drain all complete lines from this read.
                        while let Some(parsed) = parser.next_sample() {
                            match parsed {
                                Ok(sample) => {
                                    raw = sample;
                                    publish(&sample_tx, raw, zero);
                                    line_count += 1;
                                    if line_count % 1000 == 0 {
                                        tracing::debug!(line_count, "Telemetry lines parsed");
                                    }
                                }
                                Err(e) => {
                                    tracing::warn!(%e, "Skipping malformed telemetry line");
                                }
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!(?e, "Telemetry read error");
                        break LinkState::Disconnected;
                    }
                }
            }
            Some(cmd) = command_rx.recv() => {
                match cmd {
                    ReaderCommand::SetZero => {
                        zero = Some(raw);
                        tracing::info!(
                            roll = raw.roll,
                            pitch = raw.pitch,
                            yaw = raw.yaw,
                            "Zero reference captured"
                        );
                    }
                    ReaderCommand::ClearZero => {
                        zero = None;
                        tracing::info!("Zero reference cleared");
                    }
                }
                // Re-publish so the change is visible before the next line.
                publish(&sample_tx, raw, zero);
            }
        }
    };

    let _ = link_tx.send(exit_state);
}

fn publish(
    sample_tx: &watch::Sender<OrientationSample>,
    raw: OrientationSample,
    zero: Option<OrientationSample>,
) {
    let sample = match zero {
        Some(reference) => raw.relative_to(reference),
        None => raw,
    };
    let _ = sample_tx.send(sample);
}
