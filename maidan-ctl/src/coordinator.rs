//! Coordinator: holds the authoritative world and routes snapshots
//!
//! Runs on the main thread. Every loop iteration it refreshes the fields it
//! owns (game clock, defense side, UI inputs), offers the authoritative
//! world to every provider, and copies back each provider's owned fields
//! from whatever the provider last handed in. SIGINT and SIGTERM set the
//! shared stop flag; providers see it at the head of their loop.

use crate::config::{AppConfig, Deployment};
use crate::error::{Error, Result};
use crate::providers::{
    PlannerProvider, Provider, ProviderHandle, ProviderKind, RadioProvider, RefereeProvider,
    SimulatorProvider, VisionProvider,
};
use crate::transport::{MockTransport, RadioTransport, SerialTransport};
use maidan::WorldModel;
use maidan::core::clock;
use maidan::world::UiInputs;
use signal_hook::consts::{SIGINT, SIGTERM};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

/// Coordinator loop period
const LOOP_PERIOD: Duration = Duration::from_millis(1);
/// Frames kept by the in-memory radio
const MOCK_RADIO_HISTORY: usize = 100;

pub struct Coordinator {
    world: WorldModel,
    handles: Vec<ProviderHandle>,
    stop: Arc<AtomicBool>,
    started_at: f64,
    reported_exits: HashSet<ProviderKind>,
}

impl Coordinator {
    pub fn new(config: &AppConfig) -> Self {
        let mut world = WorldModel::new(Arc::new(config.constants.clone()));
        world.is_blue_defense_side_left = config.is_blue_defense_side_left;
        let started_at = clock::now();
        world.game_clock = Some(0.0);

        Self {
            world,
            handles: Vec::new(),
            stop: Arc::new(AtomicBool::new(false)),
            started_at,
            reported_exits: HashSet::new(),
        }
    }

    /// Flag that stops the coordinator and every provider.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// The authoritative world
    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    pub fn ui_inputs_mut(&mut self) -> &mut UiInputs {
        &mut self.world.ui_inputs
    }

    pub fn set_blue_defense_side_left(&mut self, left: bool) {
        self.world.is_blue_defense_side_left = left;
    }

    /// Start one thread per provider.
    pub fn start(&mut self, providers: Vec<Box<dyn Provider>>) -> Result<()> {
        for provider in providers {
            let handle =
                ProviderHandle::spawn(provider, self.world.clone(), Arc::clone(&self.stop))?;
            self.handles.push(handle);
        }
        Ok(())
    }

    /// One routing pass.
    pub fn step(&mut self) {
        self.world.game_clock = Some(clock::now() - self.started_at);

        for handle in &self.handles {
            handle.ingress.put(self.world.clone());
        }
        for handle in &self.handles {
            if let Some(snapshot) = handle.egress.try_take() {
                self.world
                    .copy_fields_from(&snapshot, handle.owned_fields());
            }
        }

        for handle in &self.handles {
            if handle.is_finished() && self.reported_exits.insert(handle.kind()) {
                log::warn!("{} provider has exited", handle.kind());
            }
        }
    }

    /// The provider of `kind` has exited and been reported.
    pub fn has_exited(&self, kind: ProviderKind) -> bool {
        self.reported_exits.contains(&kind)
    }

    /// Every provider thread has exited.
    pub fn all_finished(&self) -> bool {
        self.handles.iter().all(ProviderHandle::is_finished)
    }

    /// Route snapshots until a signal or the stop flag ends the session.
    pub fn run(&mut self) -> Result<()> {
        install_signal_handlers(&self.stop)?;
        log::info!("Coordinator running with {} providers", self.handles.len());

        while !self.stop.load(Ordering::Relaxed) {
            self.step();
            if !self.handles.is_empty() && self.all_finished() {
                log::error!("All providers have exited");
                break;
            }
            thread::sleep(LOOP_PERIOD);
        }

        self.shutdown();
        Ok(())
    }

    /// Stop and join every provider.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        for handle in &mut self.handles {
            handle.join();
        }
        log::info!("All providers joined");
    }
}

/// Register SIGINT and SIGTERM to set `stop`. Main thread only.
fn install_signal_handlers(stop: &Arc<AtomicBool>) -> Result<()> {
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(stop))
            .map_err(|e| Error::Other(format!("Error setting signal handler: {}", e)))?;
    }
    Ok(())
}

/// Open the configured radio, or an in-memory one when disabled.
pub fn open_radio(config: &AppConfig) -> Result<Box<dyn RadioTransport>> {
    if config.radio.enabled {
        let serial = SerialTransport::open(&config.radio.port, config.radio.baud_rate)?;
        Ok(Box::new(serial))
    } else {
        log::info!("Radio disabled, frames stay in memory");
        Ok(Box::new(MockTransport::bounded(MOCK_RADIO_HISTORY)))
    }
}

/// Providers for the configured deployment.
///
/// Vision: vision, referee, planner, radio. Simulator: simulator,
/// planner, radio.
pub fn build_providers(
    config: &AppConfig,
    radio: Box<dyn RadioTransport>,
) -> Vec<Box<dyn Provider>> {
    let mut providers: Vec<Box<dyn Provider>> = Vec::new();
    match config.deployment {
        Deployment::Vision => {
            providers.push(Box::new(VisionProvider::new(
                config.network.vision_address.clone(),
            )));
            providers.push(Box::new(RefereeProvider::new(
                config.network.referee_address.clone(),
            )));
        }
        Deployment::Simulator => {
            providers.push(Box::new(SimulatorProvider::new(
                config.initial_setup,
                config.team,
            )));
        }
    }
    providers.push(Box::new(PlannerProvider::new(
        config.strategy,
        config.team,
        config.constants.planner.random_seed,
    )));
    providers.push(Box::new(RadioProvider::new(config.team, radio)));
    providers
}
