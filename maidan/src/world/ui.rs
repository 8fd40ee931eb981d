//! Operator intents forwarded from the UI.

use crate::core::{Point2, RobotId, Team};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UiInputs {
    pub selected_robot: Option<(Team, RobotId)>,
    /// The ball is being placed by hand (simulator only)
    pub selected_ball: bool,
    pub click_position: Option<Point2>,
    /// Drag from the click point; heading for robots, velocity for the ball
    pub drag_vector: Option<Point2>,
    pub charge: bool,
    pub kick: bool,
    pub dribble: bool,
}

impl UiInputs {
    /// Robot id selected on `team`, if any.
    pub fn selected_on(&self, team: Team) -> Option<RobotId> {
        match self.selected_robot {
            Some((t, id)) if t == team => Some(id),
            _ => None,
        }
    }
}
