//! Simulation engine for robots and the ball
//!
//! Advances the world by wall-clock `dt` each tick: ball placement,
//! friction roll, robot motion from commanded waypoints, collision
//! resolution, dribbling and kicking.

use std::collections::HashMap;

use crate::config::Constants;
use crate::core::{
    Point2, Pose, RobotId, Team, field_to_robot_perspective, robot_to_field_perspective,
};
use crate::physics::{dribbler_center, overlap, predict_ball, robot_ball_overlap};
use crate::world::{Velocity, WorldModel};

/// Extra distance added when separating bodies, so they end up strictly
/// apart (mm).
const SEPARATION_SLACK: f64 = 1e-3;
/// Robot-robot resolution passes per tick.
const MAX_SEPARATION_PASSES: usize = 100;
/// Ball back-tracing step (mm).
const TRACE_STEP: f64 = 1.0;
/// Ball speed below which a dribbler grabs it (mm/s).
const CAPTURE_SPEED: f64 = 20.0;
/// Pull rate towards the robot center while dribbling (1/s).
const DRIBBLE_CENTER_RATE: f64 = 2.0;
/// Pull rate towards the dribbler center while dribbling (1/s).
const DRIBBLE_RECENTER_RATE: f64 = 1.0;

/// One simulated robot during a tick.
#[derive(Clone, Copy, Debug)]
struct Body {
    team: Team,
    id: RobotId,
    pose: Pose,
    /// Field-frame linear velocity (mm/s)
    velocity: Point2,
    is_dribbling: bool,
    is_kicking: bool,
}

/// Ball during a tick.
#[derive(Clone, Copy, Debug)]
struct Ball {
    pos: Point2,
    velocity: Point2,
    /// Velocity changed discontinuously; history must be rewritten
    reset: bool,
}

/// Robot holding the ball, with the ball's offset in its own frame.
#[derive(Clone, Copy, Debug)]
struct Carry {
    index: usize,
    local: Point2,
}

/// Kicker of one robot as the simulator sees it.
#[derive(Clone, Copy, Debug, Default)]
struct Kicker {
    /// Charge before the current kick request
    charge: f64,
    /// The current kick request already fired
    spent: bool,
}

/// Physics simulator standing in for vision.
#[derive(Debug, Default)]
pub struct Simulator {
    last_tick: Option<f64>,
    ticks: u64,
    /// Robot whose dribbler holds the ball
    holder: Option<(Team, RobotId)>,
    kickers: HashMap<(Team, RobotId), Kicker>,
}

impl Simulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed ticks.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Robot currently holding the ball, if any.
    pub fn holder(&self) -> Option<(Team, RobotId)> {
        self.holder
    }

    /// Advance `world` to `now`.
    ///
    /// Writes new robot and ball samples stamped `now`. Commands and
    /// status belong to other components and are only read: a kick fires
    /// once per request, with the charge seen before the request was made.
    pub fn tick(&mut self, world: &mut WorldModel, now: f64) {
        let dt = self.last_tick.map_or(0.0, |t| (now - t).max(0.0));
        self.last_tick = Some(now);
        self.ticks += 1;

        let constants = world.constants_arc();
        let mut bodies = collect_bodies(world, &constants);
        self.observe_kickers(world, &bodies);
        let mut ball = place_ball(world);
        let carry = match ball {
            Some(b) => self.find_carrier(&bodies, b, &constants),
            None => {
                self.holder = None;
                None
            }
        };

        // Free roll
        if let Some(b) = ball.as_mut() {
            if carry.is_none() && !b.reset {
                let (pos, velocity) =
                    predict_ball(b.pos, b.velocity, dt, constants.ball.deceleration);
                b.pos = pos;
                b.velocity = velocity;
            }
        }

        for body in bodies.iter_mut() {
            if let Some(commands) = world.commands(body.team, body.id) {
                body.pose = commands.predict_pos(body.pose, dt);
            }
        }

        separate_robots(&mut bodies, &constants);

        let Some(mut b) = ball else {
            write_robots(world, &bodies, now);
            return;
        };

        if let Some(carry) = carry {
            let carrier = &bodies[carry.index];
            b.pos = carrier.pose.xy() + robot_to_field_perspective(carrier.pose.w, carry.local);
            b.velocity = carrier.velocity;
        }

        resolve_ball(&mut b, &bodies, &constants);

        let dribbler = carry.map(|c| c.index).or_else(|| {
            bodies
                .iter()
                .position(|body| is_captured(body, &b, &constants))
        });
        match dribbler {
            Some(index) => {
                let body = &bodies[index];
                dribble(&mut b, body, dt, &constants);
                self.holder = Some((body.team, body.id));
            }
            None => self.holder = None,
        }

        self.kick(world, &mut b, &bodies);

        write_robots(world, &bodies, now);
        if b.reset {
            world.set_ball_state(now, b.pos, b.velocity);
        } else {
            world.push_ball(now, b.pos);
        }
    }

    /// The robot keeps a held ball while it dribbles and the ball stays
    /// in the dribbler zone; a new capture needs a slow ball.
    fn find_carrier(&mut self, bodies: &[Body], ball: Ball, constants: &Constants) -> Option<Carry> {
        if ball.reset {
            self.holder = None;
            return None;
        }
        let held = self.holder.and_then(|(team, id)| {
            bodies
                .iter()
                .position(|b| b.team == team && b.id == id && b.is_dribbling && in_zone(b, &ball, constants))
        });
        let index = held.or_else(|| bodies.iter().position(|b| is_captured(b, &ball, constants)));
        self.holder = index.map(|i| (bodies[i].team, bodies[i].id));
        index.map(|index| {
            let body = &bodies[index];
            Carry {
                index,
                local: field_to_robot_perspective(body.pose.w, ball.pos - body.pose.xy()),
            }
        })
    }

    /// Track charge while no kick is requested and re-arm spent kickers.
    fn observe_kickers(&mut self, world: &WorldModel, bodies: &[Body]) {
        self.kickers
            .retain(|&(team, id), _| bodies.iter().any(|b| b.team == team && b.id == id));
        for body in bodies.iter().filter(|b| !b.is_kicking) {
            self.kickers.insert(
                (body.team, body.id),
                Kicker {
                    charge: world.status(body.team, body.id).charge_level,
                    spent: false,
                },
            );
        }
    }

    fn kick(&mut self, world: &WorldModel, ball: &mut Ball, bodies: &[Body]) {
        for body in bodies {
            if !body.is_kicking || !world.ball_in_dribbler(body.team, body.id) {
                continue;
            }
            let kicker = self
                .kickers
                .entry((body.team, body.id))
                .or_insert_with(|| Kicker {
                    charge: world.status(body.team, body.id).charge_level,
                    spent: false,
                });
            if kicker.spent || kicker.charge <= 0.0 {
                continue;
            }
            let speed = kicker.charge;
            kicker.spent = true;
            ball.velocity = body.pose.heading() * speed;
            ball.reset = true;
            self.holder = None;
            log::debug!(
                "{} robot {} kicked at {:.0} mm/s",
                body.team,
                body.id,
                speed
            );
        }
    }
}

/// Ball state at the start of the tick, overridden by a UI placement.
fn place_ball(world: &WorldModel) -> Option<Ball> {
    let ui = &world.ui_inputs;
    if ui.selected_ball {
        if let Some(click) = ui.click_position {
            return Some(Ball {
                pos: click,
                velocity: ui.drag_vector.unwrap_or(Point2::ZERO),
                reset: true,
            });
        }
    }
    world.ball_pos().map(|pos| Ball {
        pos,
        velocity: world.ball_velocity(),
        reset: false,
    })
}

fn write_robots(world: &mut WorldModel, bodies: &[Body], now: f64) {
    for body in bodies {
        world.push_robot(body.team, body.id, now, body.pose);
    }
}

/// Snapshot every tracked robot with the velocity its waypoints ask for.
fn collect_bodies(world: &mut WorldModel, constants: &Constants) -> Vec<Body> {
    let robots: Vec<(Team, RobotId, Pose)> = world.all_robots().collect();
    robots
        .into_iter()
        .map(|(team, id, pose)| {
            let (local, is_dribbling, is_kicking) = match world.robot_commands_mut(team).get_mut(&id)
            {
                Some(commands) => {
                    let v = commands.derive_speeds(pose, constants);
                    (v, commands.is_dribbling, commands.is_kicking)
                }
                None => (Velocity::ZERO, false, false),
            };
            Body {
                team,
                id,
                pose,
                velocity: robot_to_field_perspective(pose.w, local.linear()),
                is_dribbling,
                is_kicking,
            }
        })
        .collect()
}

fn in_zone(body: &Body, ball: &Ball, constants: &Constants) -> bool {
    ball.pos.distance(&dribbler_center(body.pose, constants)) <= constants.ball.dribble_zone_radius
}

fn is_captured(body: &Body, ball: &Ball, constants: &Constants) -> bool {
    body.is_dribbling
        && in_zone(body, ball, constants)
        && ball.velocity.norm() < CAPTURE_SPEED
}

/// Push overlapping robot pairs apart, half each, until none overlap.
fn separate_robots(bodies: &mut [Body], constants: &Constants) {
    let r_sum = 2.0 * constants.robot.radius + SEPARATION_SLACK;
    for _ in 0..MAX_SEPARATION_PASSES {
        let mut moved = false;
        for i in 0..bodies.len() {
            for j in (i + 1)..bodies.len() {
                let push = overlap(bodies[i].pose.xy(), bodies[j].pose.xy(), r_sum);
                if push.is_zero() {
                    continue;
                }
                let half = push * 0.5;
                bodies[i].pose.x += half.x;
                bodies[i].pose.y += half.y;
                bodies[j].pose.x -= half.x;
                bodies[j].pose.y -= half.y;
                moved = true;
            }
        }
        if !moved {
            return;
        }
    }
    log::debug!("Robot separation did not settle in {} passes", MAX_SEPARATION_PASSES);
}

/// Move the ball out of every robot it overlaps.
///
/// A ball rolling into a robot is traced back along its path to the
/// contact point and keeps only the tangential part of its velocity.
fn resolve_ball(ball: &mut Ball, bodies: &[Body], constants: &Constants) {
    let max_trace = (2.0 * (constants.robot.radius + constants.ball.radius) / TRACE_STEP) as usize;
    for body in bodies {
        let push = robot_ball_overlap(body.pose, ball.pos, constants);
        let Some(normal) = push.unit() else {
            continue;
        };

        let incoming = ball.velocity.dot(&normal) < 0.0;
        if incoming {
            if let Some(back) = (-ball.velocity).unit() {
                let mut steps = 0;
                while steps < max_trace
                    && !robot_ball_overlap(body.pose, ball.pos, constants).is_zero()
                {
                    ball.pos += back * TRACE_STEP;
                    steps += 1;
                }
            }
            ball.velocity -= normal * ball.velocity.dot(&normal);
        }

        let rest = robot_ball_overlap(body.pose, ball.pos, constants);
        if let Some(dir) = rest.unit() {
            ball.pos += rest + dir * SEPARATION_SLACK;
        }
        ball.reset = true;
    }
}

/// Pull a held ball towards the robot and onto the dribbler center.
fn dribble(ball: &mut Ball, body: &Body, dt: f64, constants: &Constants) {
    let center = body.pose.xy();
    let dribbler = dribbler_center(body.pose, constants);
    ball.pos += (center - ball.pos) * (DRIBBLE_CENTER_RATE * dt).min(1.0);
    ball.pos += (dribbler - ball.pos) * (DRIBBLE_RECENTER_RATE * dt).min(1.0);

    let push = robot_ball_overlap(body.pose, ball.pos, constants);
    if let Some(dir) = push.unit() {
        ball.pos += push + dir * SEPARATION_SLACK;
    }
    ball.velocity = body.velocity;
}
