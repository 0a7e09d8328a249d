//! Handle to the control thread.
//!
//! Every method sends one command and waits for its reply. The queue is
//! bounded; when it is full the request fails fast with
//! [`AppError::CommandQueueFull`] instead of blocking the caller.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender, TrySendError};
use eaf_core::{ConnectionId, RunId, SharedTelemetry};
use eaf_sim::{
    EnergyBalance, MassBalance, OperatingParameters, ParameterUpdate, RunPhase, SimulationResults,
};

use crate::broadcast::Observer;
use crate::config::SimulatorConfig;
use crate::control::{Command, ControlLoop, RunSettings};
use crate::error::{AppError, AppResult};
use crate::payload::SimulationData;
use crate::status::{HistoryWindow, RunStatus, StartRequest, StopAck, ZoneStatus};

/// Owns the control thread. Dropping the manager shuts the thread down.
pub struct RunManager {
    cmd_tx: Option<Sender<Command>>,
    thread: Option<JoinHandle<()>>,
}

impl RunManager {
    pub fn spawn(settings: RunSettings, telemetry: SharedTelemetry) -> AppResult<Self> {
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(settings.command_capacity.max(1));
        let control = ControlLoop::new(cmd_rx, settings, telemetry);
        let thread = thread::Builder::new()
            .name("eaf-control".into())
            .spawn(move || control.run())?;
        Ok(Self {
            cmd_tx: Some(cmd_tx),
            thread: Some(thread),
        })
    }

    pub fn from_config(config: &SimulatorConfig, telemetry: SharedTelemetry) -> AppResult<Self> {
        Self::spawn(RunSettings::from(config), telemetry)
    }

    fn submit(&self, command: Command) -> AppResult<()> {
        let tx = self.cmd_tx.as_ref().ok_or(AppError::ControlLoopDown)?;
        tx.try_send(command).map_err(|err| match err {
            TrySendError::Full(_) => AppError::CommandQueueFull,
            TrySendError::Disconnected(_) => AppError::ControlLoopDown,
        })
    }

    fn request<T>(&self, make: impl FnOnce(Sender<T>) -> Command) -> AppResult<T> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.submit(make(reply_tx))?;
        reply_rx.recv().map_err(|_| AppError::ControlLoopDown)
    }

    /// Start a new run. Fails with [`AppError::RunActive`] while another
    /// run is active unless the manager was configured to supersede it.
    pub fn start(&self, request: StartRequest) -> AppResult<RunId> {
        self.request(|reply| Command::Start { request, reply })?
    }

    /// Stop the current run. Stopping a finished run is acknowledged
    /// without changing it.
    pub fn stop(&self) -> AppResult<StopAck> {
        self.request(|reply| Command::Stop { reply })?
    }

    /// Zeros when no run has been started yet.
    pub fn status(&self) -> AppResult<RunStatus> {
        self.request(|reply| Command::Status { reply })
    }

    pub fn is_active(&self) -> AppResult<bool> {
        self.request(|reply| Command::IsActive { reply })
    }

    pub fn zones(&self) -> AppResult<Vec<ZoneStatus>> {
        self.request(|reply| Command::Zones { reply })?
    }

    pub fn set_parameters(&self, params: OperatingParameters) -> AppResult<OperatingParameters> {
        self.request(|reply| Command::SetParameters { params, reply })?
    }

    /// Apply the fields present in `update`; returns the resulting parameters.
    pub fn update_parameters(&self, update: ParameterUpdate) -> AppResult<OperatingParameters> {
        self.request(|reply| Command::UpdateParameters { update, reply })?
    }

    pub fn add_material(&self, material: &str, amount_kg: f64, zone: &str) -> AppResult<String> {
        self.request(|reply| Command::AddMaterial {
            material: material.to_string(),
            amount_kg,
            zone: zone.to_string(),
            reply,
        })?
    }

    pub fn real_time(&self) -> AppResult<SimulationData> {
        self.request(|reply| Command::RealTime { reply })?
    }

    pub fn history(&self, limit: usize) -> AppResult<HistoryWindow> {
        self.request(|reply| Command::History { limit, reply })?
    }

    pub fn results(&self) -> AppResult<SimulationResults> {
        self.request(|reply| Command::Results { reply })?
    }

    pub fn energy_balance(&self) -> AppResult<EnergyBalance> {
        self.request(|reply| Command::EnergyBalance { reply })?
    }

    pub fn mass_balance(&self) -> AppResult<MassBalance> {
        self.request(|reply| Command::MassBalance { reply })?
    }

    /// Register an observer; it receives a connection greeting immediately.
    pub fn register(&self, observer: Box<dyn Observer>) -> AppResult<ConnectionId> {
        self.request(|reply| Command::Register { observer, reply })
    }

    pub fn unregister(&self, id: ConnectionId) -> AppResult<bool> {
        self.request(|reply| Command::Unregister { id, reply })
    }

    /// Block until the current run completes or stops.
    ///
    /// Returns `Ok(None)` if no run exists or the timeout expires first.
    pub fn wait_for_terminal(&self, timeout: Duration) -> AppResult<Option<RunPhase>> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.submit(Command::WatchTerminal { reply: reply_tx })?;
        match reply_rx.recv_timeout(timeout) {
            Ok(phase) => Ok(phase),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(AppError::ControlLoopDown),
        }
    }

    /// Stop the control thread and wait for it to exit.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            // A full queue is fine: dropping the sender disconnects the loop.
            let _ = tx.try_send(Command::Shutdown);
        }
        if let Some(handle) = self.thread.take() {
            if handle.join().is_err() {
                tracing::error!("control thread panicked");
            }
        }
    }
}

impl Drop for RunManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for RunManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunManager")
            .field("running", &self.thread.is_some())
            .finish()
    }
}
