//! Rules geometry: goals, defense areas and position legality.

use super::model::WorldModel;
use super::referee::RefereeCommand;
use crate::core::{Point2, RobotId, Team};

impl WorldModel {
    /// -1 when `team` defends the negative-x half, +1 otherwise.
    pub fn defense_side_sign(&self, team: Team) -> f64 {
        let blue_left = self.is_blue_defense_side_left;
        let left = match team {
            Team::Blue => blue_left,
            Team::Yellow => !blue_left,
        };
        if left { -1.0 } else { 1.0 }
    }

    /// Center of the goal `team` defends.
    pub fn get_defense_goal(&self, team: Team) -> Point2 {
        Point2::new(self.defense_side_sign(team) * self.constants().half_x(), 0.0)
    }

    /// Center of the goal `team` attacks.
    pub fn get_attack_goal(&self, team: Team) -> Point2 {
        self.get_defense_goal(team.other())
    }

    /// Corner of `team`'s defense area with the smallest x and y.
    pub fn defense_area_corner(&self, team: Team) -> Point2 {
        let field = &self.constants().field;
        let half_x = self.constants().half_x();
        let x = if self.defense_side_sign(team) < 0.0 {
            -half_x
        } else {
            half_x - field.defense_area_x_length
        };
        Point2::new(x, -field.defense_area_y_length / 2.0)
    }

    pub fn is_in_defense_area(&self, pos: Point2, team: Team) -> bool {
        let field = &self.constants().field;
        let corner = self.defense_area_corner(team);
        pos.x >= corner.x
            && pos.x <= corner.x + field.defense_area_x_length
            && pos.y >= corner.y
            && pos.y <= corner.y + field.defense_area_y_length
    }

    pub fn is_in_field(&self, pos: Point2) -> bool {
        pos.x.abs() <= self.constants().half_x() && pos.y.abs() <= self.constants().half_y()
    }

    #[inline]
    pub fn is_goalie(&self, id: RobotId) -> bool {
        id == self.constants().planner.goalie_id
    }

    /// Whether robot `id` of `team` may stand at `pos` under the rules and
    /// the current referee command.
    pub fn is_pos_legal(&self, pos: Point2, team: Team, id: RobotId) -> bool {
        if !self.is_in_field(pos) {
            return false;
        }
        if self.is_in_defense_area(pos, team) && !self.is_goalie(id) {
            return false;
        }
        if self.is_in_defense_area(pos, team.other()) {
            return false;
        }

        let constants = self.constants();
        match self.referee_command() {
            Some(RefereeCommand::Stop) => {
                if let Some(ball) = self.ball_pos() {
                    let clearance =
                        constants.planner.stop_ball_clearance + constants.robot.radius;
                    if pos.distance(&ball) < clearance {
                        return false;
                    }
                }
            }
            Some(RefereeCommand::PreparePenalty(kicker)) if kicker != team => {
                if !self.is_goalie(id) {
                    if let Some(ball) = self.ball_pos() {
                        // Behind the ball means farther from our own goal
                        let away = -self.defense_side_sign(team);
                        if (pos.x - ball.x) * away < constants.planner.penalty_distance {
                            return false;
                        }
                    }
                }
            }
            _ => {}
        }
        true
    }
}
