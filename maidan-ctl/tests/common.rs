#![allow(dead_code)]

use maidan::codec::{RobotCommand, decode_team};
use maidan::sim::InitialSetup;
use maidan::strategy::StrategyKind;
use maidan::world::WorldField;
use maidan::{Team, WorldModel};
use maidan_ctl::config::{AppConfig, Deployment};
use maidan_ctl::coordinator::Coordinator;
use maidan_ctl::providers::ProviderKind;
use std::thread;
use std::time::{Duration, Instant};

/// Simulator deployment with the radio kept in memory.
pub fn simulator_config(strategy: StrategyKind, setup: InitialSetup) -> AppConfig {
    let mut config = AppConfig::default();
    config.team = Team::Blue;
    config.strategy = strategy;
    config.deployment = Deployment::Simulator;
    config.initial_setup = setup;
    config.radio.enabled = false;
    config.constants.planner.random_seed = 11;
    config
}

/// Step the coordinator like its main loop does, for `duration`.
pub fn drive(coordinator: &mut Coordinator, duration: Duration) {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        coordinator.step();
        thread::sleep(Duration::from_millis(1));
    }
}

/// Decode every recorded frame.
pub fn decoded(frames: &[Vec<u8>]) -> Vec<Vec<RobotCommand>> {
    frames
        .iter()
        .map(|f| decode_team(f).expect("recorded frame decodes"))
        .collect()
}

/// A provider's own world, exchanged with the authoritative one the way the
/// coordinator routes snapshots.
pub struct Mirror {
    pub world: WorldModel,
    owned: &'static [WorldField],
}

impl Mirror {
    pub fn new(kind: ProviderKind, authoritative: &WorldModel) -> Self {
        Self {
            world: authoritative.clone(),
            owned: kind.owned_fields(),
        }
    }

    /// Take the authoritative world, keeping our own fields.
    pub fn absorb(&mut self, authoritative: &WorldModel) {
        self.world
            .absorb_snapshot(authoritative.clone(), self.owned);
    }

    /// Copy our own fields into the authoritative world.
    pub fn publish(&self, authoritative: &mut WorldModel) {
        authoritative.copy_fields_from(&self.world, self.owned);
    }
}
