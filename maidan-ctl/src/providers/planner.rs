//! Planner provider: runs the team strategy at a fixed interval

use super::{Provider, ProviderKind};
use crate::error::Result;
use maidan::core::clock;
use maidan::strategy::{Strategy, StrategyKind};
use maidan::{Team, WorldModel};
use std::thread;
use std::time::Duration;

pub struct PlannerProvider {
    strategy: Strategy,
    ticks: u64,
}

impl PlannerProvider {
    pub fn new(kind: StrategyKind, team: Team, seed: u64) -> Self {
        Self {
            strategy: Strategy::new(kind, team, seed),
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// One strategy step at `now`.
    pub fn tick(&mut self, world: &mut WorldModel, now: f64) {
        self.strategy.tick(world, now);
        self.ticks += 1;
    }
}

impl Provider for PlannerProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Planner
    }

    fn pre_run(&mut self, _world: &mut WorldModel) -> Result<()> {
        log::info!(
            "Planning {} for the {} team",
            self.strategy.kind(),
            self.strategy.team()
        );
        Ok(())
    }

    fn run(&mut self, world: &mut WorldModel) -> Result<()> {
        let started = clock::now();
        self.tick(world, started);

        let interval = world.constants().planner.interval;
        let remaining = started + interval - clock::now();
        if remaining > 0.0 {
            thread::sleep(Duration::from_secs_f64(remaining));
        } else {
            log::trace!("Planner tick overran by {:.1} ms", -remaining * 1000.0);
        }
        Ok(())
    }

    fn post_run(&mut self, _world: &mut WorldModel) {
        log::info!("Planner ran {} ticks", self.ticks);
    }
}
