//! Control loop thread.
//!
//! The control thread owns the active engine and the broadcast manager
//! exclusively. Requests arrive on a bounded crossbeam channel, each with
//! a one-shot reply channel, and are handled only between ticks so a step
//! always completes before a mutation or stop is observed.

use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use eaf_core::{ConnectionId, RunId, SharedTelemetry};
use eaf_sim::{
    Admission, EnergyBalance, MassBalance, OperatingParameters, ParameterUpdate, RunPhase,
    SimulationEngine, SimulationResults,
};

use crate::alerts::AlertThresholds;
use crate::broadcast::{BroadcastManager, Observer};
use crate::config::{SimulatorConfig, StartPolicy};
use crate::error::{AppError, AppResult};
use crate::payload::{Payload, SimulationData};
use crate::status::{HistoryWindow, RunStatus, StartRequest, StopAck, ZoneStatus};

const COMPONENT: &str = "control";
const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

/// Negative or non-finite values mean no wait.
fn seconds(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

/// Behaviour of the control loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    pub initial_temperature_k: f64,
    /// Wall-clock seconds per simulated second; 0 steps as fast as possible
    pub pacing_factor: f64,
    pub heartbeat_interval_s: f64,
    pub start_policy: StartPolicy,
    pub unknown_name_policy: eaf_sim::UnknownNamePolicy,
    pub alert_thresholds: AlertThresholds,
    /// Capacity of the command queue
    pub command_capacity: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self::from(&SimulatorConfig::default())
    }
}

impl From<&SimulatorConfig> for RunSettings {
    fn from(config: &SimulatorConfig) -> Self {
        Self {
            initial_temperature_k: config.initial_temperature,
            pacing_factor: config.realtime.pacing_factor,
            heartbeat_interval_s: config.realtime.heartbeat_interval_s,
            start_policy: config.realtime.start_policy,
            unknown_name_policy: config.realtime.unknown_name_policy,
            alert_thresholds: config.monitoring.alert_thresholds,
            command_capacity: 64,
        }
    }
}

type Reply<T> = Sender<T>;

/// Requests handled by the control thread.
pub(crate) enum Command {
    Start {
        request: StartRequest,
        reply: Reply<AppResult<RunId>>,
    },
    Stop {
        reply: Reply<AppResult<StopAck>>,
    },
    Status {
        reply: Reply<RunStatus>,
    },
    IsActive {
        reply: Reply<bool>,
    },
    Zones {
        reply: Reply<AppResult<Vec<ZoneStatus>>>,
    },
    SetParameters {
        params: OperatingParameters,
        reply: Reply<AppResult<OperatingParameters>>,
    },
    UpdateParameters {
        update: ParameterUpdate,
        reply: Reply<AppResult<OperatingParameters>>,
    },
    AddMaterial {
        material: String,
        amount_kg: f64,
        zone: String,
        reply: Reply<AppResult<String>>,
    },
    RealTime {
        reply: Reply<AppResult<SimulationData>>,
    },
    History {
        limit: usize,
        reply: Reply<AppResult<HistoryWindow>>,
    },
    Results {
        reply: Reply<AppResult<SimulationResults>>,
    },
    EnergyBalance {
        reply: Reply<AppResult<EnergyBalance>>,
    },
    MassBalance {
        reply: Reply<AppResult<MassBalance>>,
    },
    Register {
        observer: Box<dyn Observer>,
        reply: Reply<ConnectionId>,
    },
    Unregister {
        id: ConnectionId,
        reply: Reply<bool>,
    },
    WatchTerminal {
        reply: Reply<Option<RunPhase>>,
    },
    Shutdown,
}

struct ActiveRun {
    id: RunId,
    engine: SimulationEngine,
    next_tick: Instant,
}

impl ActiveRun {
    fn is_active(&self) -> bool {
        !self.engine.phase().is_terminal()
    }
}

/// State owned by the control thread's main loop.
pub(crate) struct ControlLoop {
    run: Option<ActiveRun>,
    broadcast: BroadcastManager,
    cmd_rx: Receiver<Command>,
    settings: RunSettings,
    telemetry: SharedTelemetry,
    next_heartbeat: Instant,
    waiters: Vec<Reply<Option<RunPhase>>>,
}

fn no_run() -> AppError {
    AppError::InvalidState("No simulation running".to_string())
}

impl ControlLoop {
    pub(crate) fn new(
        cmd_rx: Receiver<Command>,
        settings: RunSettings,
        telemetry: SharedTelemetry,
    ) -> Self {
        Self {
            run: None,
            broadcast: BroadcastManager::new(telemetry.clone()),
            cmd_rx,
            settings,
            telemetry,
            next_heartbeat: Instant::now(),
            waiters: Vec::new(),
        }
    }

    fn heartbeat_interval(&self) -> Duration {
        seconds(self.settings.heartbeat_interval_s).max(MIN_HEARTBEAT)
    }

    fn next_deadline(&self) -> Instant {
        match &self.run {
            Some(run) if run.engine.is_running() => run.next_tick,
            _ => self.next_heartbeat,
        }
    }

    /// Main loop. Runs until a shutdown command arrives or every handle is dropped.
    pub(crate) fn run(mut self) {
        tracing::debug!("control loop started");
        'control: loop {
            // Pending commands go first so an unpaced run cannot starve them.
            loop {
                match self.cmd_rx.try_recv() {
                    Ok(Command::Shutdown) => break 'control,
                    Ok(command) => self.handle(command),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => break 'control,
                }
            }

            let deadline = self.next_deadline();
            if Instant::now() >= deadline {
                self.on_deadline();
                continue;
            }
            match self.cmd_rx.recv_deadline(deadline) {
                Ok(Command::Shutdown) => break,
                Ok(command) => self.handle(command),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(run) = self.run.as_mut() {
            run.engine.stop();
        }
        self.notify_waiters();
        tracing::debug!("control loop stopped");
    }

    fn on_deadline(&mut self) {
        let running = self
            .run
            .as_ref()
            .is_some_and(|run| run.engine.is_running());
        if running {
            self.tick();
        } else {
            if !self.broadcast.is_empty() {
                self.broadcast.broadcast(&Payload::heartbeat(false));
            }
            self.next_heartbeat = Instant::now() + self.heartbeat_interval();
        }
    }

    /// Advance the active run by one step and publish the result.
    fn tick(&mut self) {
        let Some(run) = self.run.as_mut() else {
            return;
        };

        let thresholds = &self.settings.alert_thresholds;
        let stepped = run
            .engine
            .step()
            .map(|snapshot| (snapshot.time_s, thresholds.evaluate(snapshot)));
        let (step_time, alerts) = match stepped {
            Ok(stepped) => stepped,
            Err(err) => {
                self.telemetry
                    .error(COMPONENT, &format!("Simulation error: {err}"));
                run.engine.stop();
                self.next_heartbeat = Instant::now() + self.heartbeat_interval();
                self.notify_waiters();
                return;
            }
        };
        for alert in &alerts {
            self.telemetry.warn(COMPONENT, &format!("Alert: {alert}"));
        }

        if !self.broadcast.is_empty() {
            let data = SimulationData::at_step(&run.engine, step_time);
            self.broadcast.broadcast(&Payload::SimulationData(data));
        }

        let pacing = self.settings.pacing_factor;
        run.next_tick = Instant::now() + seconds(run.engine.time_step() * pacing);

        if run.engine.phase().is_terminal() {
            tracing::info!(run_id = %run.id, phase = %run.engine.phase(), "run finished");
            self.next_heartbeat = Instant::now() + self.heartbeat_interval();
            self.notify_waiters();
        }
    }

    fn notify_waiters(&mut self) {
        let phase = self.run.as_ref().map(|run| run.engine.phase());
        if phase.is_some_and(|p| !p.is_terminal()) {
            return;
        }
        for waiter in self.waiters.drain(..) {
            // Best-effort reply; the caller may have timed out.
            let _ = waiter.send(phase);
        }
    }

    fn engine(&self) -> AppResult<&SimulationEngine> {
        self.run.as_ref().map(|run| &run.engine).ok_or_else(no_run)
    }

    fn engine_mut(&mut self) -> AppResult<&mut SimulationEngine> {
        self.run.as_mut().map(|run| &mut run.engine).ok_or_else(no_run)
    }

    fn handle(&mut self, command: Command) {
        // Replies are best-effort: a caller that went away is not an error here.
        match command {
            Command::Start { request, reply } => {
                let _ = reply.send(self.start(request));
            }
            Command::Stop { reply } => {
                let _ = reply.send(self.stop());
            }
            Command::Status { reply } => {
                let status = self
                    .run
                    .as_ref()
                    .map(|run| RunStatus::of(&run.engine))
                    .unwrap_or_default();
                let _ = reply.send(status);
            }
            Command::IsActive { reply } => {
                let _ = reply.send(self.run.as_ref().is_some_and(ActiveRun::is_active));
            }
            Command::Zones { reply } => {
                let _ = reply.send(self.engine().map(ZoneStatus::all));
            }
            Command::SetParameters { params, reply } => {
                let result = self.engine_mut().map(|engine| {
                    engine.set_parameters(params);
                    *engine.parameters()
                });
                let _ = reply.send(result);
            }
            Command::UpdateParameters { update, reply } => {
                let result = self
                    .engine_mut()
                    .map(|engine| *engine.update_parameters(&update));
                let _ = reply.send(result);
            }
            Command::AddMaterial {
                material,
                amount_kg,
                zone,
                reply,
            } => {
                let _ = reply.send(self.add_material(&material, amount_kg, &zone));
            }
            Command::RealTime { reply } => {
                let _ = reply.send(self.engine().map(SimulationData::from_engine));
            }
            Command::History { limit, reply } => {
                let _ = reply.send(self.engine().map(|e| HistoryWindow::of(e, limit)));
            }
            Command::Results { reply } => {
                let _ = reply.send(self.engine().map(SimulationEngine::results));
            }
            Command::EnergyBalance { reply } => {
                let _ = reply.send(self.engine().map(SimulationEngine::energy_balance));
            }
            Command::MassBalance { reply } => {
                let _ = reply.send(self.engine().map(SimulationEngine::mass_balance));
            }
            Command::Register { observer, reply } => {
                let id = self.broadcast.register(observer);
                let _ = reply.send(id);
            }
            Command::Unregister { id, reply } => {
                let _ = reply.send(self.broadcast.unregister(id));
            }
            Command::WatchTerminal { reply } => match &self.run {
                Some(run) if run.is_active() => self.waiters.push(reply),
                Some(run) => {
                    let _ = reply.send(Some(run.engine.phase()));
                }
                None => {
                    let _ = reply.send(None);
                }
            },
            Command::Shutdown => {}
        }
    }

    fn start(&mut self, request: StartRequest) -> AppResult<RunId> {
        if let Some(run) = self.run.as_mut().filter(|run| run.is_active()) {
            match self.settings.start_policy {
                StartPolicy::RejectIfActive => {
                    return Err(AppError::RunActive { run_id: run.id });
                }
                StartPolicy::Supersede => {
                    tracing::info!(run_id = %run.id, "superseding active run");
                    run.engine.stop();
                    self.notify_waiters();
                }
            }
        }

        let mut engine = SimulationEngine::initialize(
            request.engine_config(&self.settings),
            self.telemetry.clone(),
        )?;
        engine.set_parameters(request.initial_parameters());
        engine.start()?;

        let id = RunId::new();
        tracing::info!(run_id = %id, capacity_t = request.furnace_capacity, "run started");
        self.telemetry.info(
            COMPONENT,
            &format!(
                "Simulation started with capacity: {} tons",
                request.furnace_capacity
            ),
        );

        // A run whose duration is already reached never ticks.
        let finished = engine.phase().is_terminal();
        self.run = Some(ActiveRun {
            id,
            engine,
            next_tick: Instant::now(),
        });
        if finished {
            self.notify_waiters();
        }
        Ok(id)
    }

    fn stop(&mut self) -> AppResult<StopAck> {
        let run = self.run.as_mut().ok_or_else(no_run)?;
        let message = if run.engine.phase().is_terminal() {
            format!("Simulation already {}", run.engine.phase())
        } else {
            run.engine.stop();
            "Simulation stopped successfully".to_string()
        };
        let ack = StopAck {
            run_id: run.id,
            phase: run.engine.phase(),
            message,
        };
        self.next_heartbeat = Instant::now() + self.heartbeat_interval();
        self.notify_waiters();
        Ok(ack)
    }

    fn add_material(&mut self, material: &str, amount_kg: f64, zone: &str) -> AppResult<String> {
        let engine = self.engine_mut()?;
        let message = match engine.add_material(material, amount_kg, zone)? {
            Admission::Accepted { .. } => format!("Added {amount_kg} kg of {material} to {zone}"),
            Admission::Ignored { reason } => {
                format!("Ignored {amount_kg} kg of {material} for {zone}: {reason}")
            }
        };
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::ChannelObserver;
    use eaf_core::RecordingTelemetry;
    use eaf_sim::EngineConfig;

    #[test]
    fn failed_step_ends_the_run_without_broadcasting() {
        let telemetry = RecordingTelemetry::new();
        let (_cmd_tx, cmd_rx) = crossbeam_channel::unbounded();
        let mut control = ControlLoop::new(cmd_rx, RunSettings::default(), telemetry.clone());
        let (observer, rx) = ChannelObserver::unbounded();
        control.broadcast.register(Box::new(observer));

        // Zero duration: the implicit start completes the run, so the step is refused.
        let config = EngineConfig {
            duration_s: 0.0,
            ..Default::default()
        };
        let engine = SimulationEngine::initialize(config, telemetry.clone()).unwrap();
        control.run = Some(ActiveRun {
            id: RunId::new(),
            engine,
            next_tick: Instant::now(),
        });

        control.tick();

        assert!(telemetry.contains("Simulation error"));
        let run = control.run.as_ref().unwrap();
        assert!(run.engine.phase().is_terminal());
        assert!(run.engine.snapshots().is_empty());
        let messages: Vec<String> = rx.try_iter().collect();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("connection_status"));
    }
}
