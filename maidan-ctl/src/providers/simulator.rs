//! Simulator provider: physics in place of the vision system

use super::{Provider, ProviderKind};
use crate::error::Result;
use maidan::core::clock;
use maidan::sim::{InitialSetup, Simulator};
use maidan::{Team, WorldModel};

pub struct SimulatorProvider {
    setup: InitialSetup,
    team: Team,
    simulator: Simulator,
}

impl SimulatorProvider {
    pub fn new(setup: InitialSetup, team: Team) -> Self {
        Self {
            setup,
            team,
            simulator: Simulator::new(),
        }
    }
}

impl Provider for SimulatorProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Simulator
    }

    fn pre_run(&mut self, world: &mut WorldModel) -> Result<()> {
        let now = clock::now();
        self.setup.apply(world, self.team, now);
        self.simulator.tick(world, now);
        Ok(())
    }

    fn run(&mut self, world: &mut WorldModel) -> Result<()> {
        self.simulator.tick(world, clock::now());
        Ok(())
    }

    fn post_run(&mut self, _world: &mut WorldModel) {
        log::info!("Simulator ran {} ticks", self.simulator.ticks());
    }
}
