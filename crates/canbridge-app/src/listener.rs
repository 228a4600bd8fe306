//! Downstream side: read packets off the serial link, log them, forward them.

use std::fs;
use std::io::{self, Read};
use std::net::UdpSocket;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use canbridge_decode::{PacketDecoder, Sample, SampleHistory};
use log::{info, warn};

use crate::settings::ListenSettings;

pub struct Listener<R> {
    port: R,
    decoder: PacketDecoder,
    history: SampleHistory,
    forward: Option<UdpSocket>,
    buf: [u8; 256],
}

impl<R: Read> Listener<R> {
    pub fn new(port: R, history_len: usize) -> Self {
        Self {
            port,
            decoder: PacketDecoder::new(),
            history: SampleHistory::new(history_len),
            forward: None,
            buf: [0u8; 256],
        }
    }

    /// Restricts reports to one CAN id. Every sample is still recorded.
    pub fn report_only(&mut self, can_id: Option<u16>) {
        self.history.set_filter(can_id);
    }

    /// Copies each raw packet to `target` over UDP.
    pub fn forward_to(&mut self, target: &str) -> io::Result<()> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        socket.connect(target)?;
        self.forward = Some(socket);
        Ok(())
    }

    /// One blocking read. A read timeout yields no samples.
    pub fn poll(&mut self) -> io::Result<Vec<Sample>> {
        let n = match self.port.read(&mut self.buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::TimedOut => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };
        let samples = self.decoder.push(&self.buf[..n]);
        for sample in &samples {
            info!("Received: {sample}");
            self.history.push(*sample);
            if let Some(socket) = &self.forward {
                if let Err(e) = socket.send(sample.to_packet().as_ref()) {
                    warn!("UDP forward failed: {e}");
                }
            }
        }
        Ok(samples)
    }

    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    /// The current history window, one line per sample.
    pub fn report(&self, hex: bool) -> String {
        self.history.to_text(true, hex)
    }

    /// Writes the history window to `path` as a JSON array.
    pub fn export_json(&self, path: &Path) -> Result<()> {
        let records: Vec<_> = self.history.entries().collect();
        let json = serde_json::to_string_pretty(&records)?;
        fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn pending(&self) -> usize {
        self.decoder.pending()
    }
}

pub fn run(settings: &ListenSettings) -> Result<()> {
    let cfg = settings.serial_config();
    let port = canbridge_core::open_port(&cfg)
        .with_context(|| format!("failed to open {}", cfg.port_name))?;
    info!("listening on {} at {} baud", cfg.port_name, cfg.baud_rate);

    let mut listener = Listener::new(port, settings.history_len);
    listener.report_only(settings.report_can_id);
    if let Some(target) = &settings.udp_forward {
        listener
            .forward_to(target)
            .with_context(|| format!("failed to set up UDP forward to {target}"))?;
        info!("forwarding packets to {target}");
    }

    let report_interval = settings.report_interval();
    let mut last_report = Instant::now();
    loop {
        if let Some(interval) = report_interval {
            if last_report.elapsed() >= interval && !listener.history().is_empty() {
                let report = listener.report(settings.report_hex);
                info!("last {} samples:\n{report}", listener.history().len());
                if let Some(path) = &settings.history_file {
                    if let Err(e) = listener.export_json(path) {
                        warn!("{e:#}");
                    }
                }
                last_report = Instant::now();
            }
        }

        if let Err(e) = listener.poll() {
            if listener.pending() > 0 {
                warn!("dropping {} partial packet bytes", listener.pending());
            }
            return Err(e).with_context(|| format!("serial read from {} failed", cfg.port_name));
        }
    }
}
