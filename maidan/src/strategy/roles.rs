//! Per-robot roles.

use super::analysis::{best_support_position, intercept_range};
use super::planner::Planner;
use crate::core::{Point2, Pose, RobotId};
use crate::world::WorldModel;

/// Charge level an attacker waits for before shooting (mm/s).
const SHOT_CHARGE: f64 = 4000.0;

impl Planner {
    /// Guard the goal.
    ///
    /// With a shot coming, drive to the earliest reachable point of the
    /// ball's path; otherwise stand `goalie_offset` out from the goal
    /// center on the line towards the ball.
    pub fn goalie(&mut self, world: &mut WorldModel, id: RobotId) -> bool {
        let team = self.team();
        let goal = world.get_defense_goal(team);
        let ball = world.ball_pos();

        if let Some(hit) = world.is_shot_coming(team) {
            let target = intercept_range(world, team, id).map_or(hit, |(early, _)| early);
            let heading = ball
                .and_then(|b| (b - target).angle())
                .unwrap_or(self.facing_field(world));
            return self.move_straight(world, id, Pose::from_point(target, heading));
        }

        let inward = Point2::new(-world.defense_side_sign(team), 0.0);
        let dir = ball.and_then(|b| (b - goal).unit()).unwrap_or(inward);
        let station = goal + dir * world.constants().planner.goalie_offset;
        let heading = ball
            .and_then(|b| (b - station).angle())
            .unwrap_or(self.facing_field(world));
        self.move_straight(world, id, Pose::from_point(station, heading))
    }

    /// Win the ball and shoot at the opponent goal.
    pub fn attacker(&mut self, world: &mut WorldModel, id: RobotId, now: f64) -> bool {
        let target = world.get_attack_goal(self.team());
        let charge = SHOT_CHARGE.min(world.constants().kicker.max_charge_level);
        self.prepare_and_kick(world, id, target, charge, now)
    }

    /// Take up the best-rated open position, facing the ball.
    pub fn supporter(&mut self, world: &mut WorldModel, id: RobotId, avoid: &[Point2], now: f64) -> Option<Point2> {
        let team = self.team();
        let spot = best_support_position(world, team, id, avoid)?;
        let heading = world
            .ball_pos()
            .and_then(|b| (b - spot).angle())
            .unwrap_or(self.facing_field(world));
        self.move_to(world, id, Pose::from_point(spot, heading), now);
        Some(spot)
    }

    /// Heading pointing from our goal towards the opponent's.
    pub(crate) fn facing_field(&self, world: &WorldModel) -> f64 {
        if world.defense_side_sign(self.team()) < 0.0 {
            0.0
        } else {
            std::f64::consts::PI
        }
    }
}
