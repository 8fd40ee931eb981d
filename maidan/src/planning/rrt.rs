//! Rapidly-exploring random tree path search.
//!
//! The tree grows from the mover's position towards uniform random samples
//! (with a small goal bias) until a node lands within one robot radius of
//! the goal. The resulting node chain is then shortened by dropping
//! points that can be skipped in a straight line.

use rand::Rng;

use super::obstacles::{Mover, is_path_blocked, is_position_open};
use crate::core::Point2;
use crate::error::{Error, Result};
use crate::world::WorldModel;

/// Search parameters, normally taken from the planner constants.
#[derive(Clone, Debug)]
pub struct RrtConfig {
    pub iterations: usize,
    /// Probability of sampling the goal itself
    pub goal_bias: f64,
    /// Clearance required around random samples (mm)
    pub sample_buffer: f64,
    /// Extension step and goal tolerance (mm)
    pub step: f64,
    /// Longest single extension (mm)
    pub max_extension: f64,
    /// Also reject positions that break the rules
    pub check_legal: bool,
}

impl RrtConfig {
    pub fn from_world(world: &WorldModel, check_legal: bool) -> Self {
        let c = world.constants();
        Self {
            iterations: c.planner.rrt_iterations,
            goal_bias: c.planner.rrt_goal_bias,
            sample_buffer: c.planner.rrt_sample_buffer,
            step: c.robot.radius,
            max_extension: 4.0 * c.robot.radius,
            check_legal,
        }
    }
}

struct Node {
    pos: Point2,
    parent: Option<usize>,
}

/// Find a path from `start` to `goal` avoiding other robots.
///
/// Returns the waypoints to drive through, excluding `start` and ending at
/// `goal`. A clear straight line yields just `[goal]`.
pub fn find_path<R: Rng>(
    world: &WorldModel,
    mover: Mover,
    start: Point2,
    goal: Point2,
    config: &RrtConfig,
    rng: &mut R,
) -> Result<Vec<Point2>> {
    if !is_path_blocked(world, start, goal, mover, config.check_legal) {
        return Ok(vec![goal]);
    }

    let half_x = world.constants().half_x();
    let half_y = world.constants().half_y();
    let mut nodes = vec![Node {
        pos: start,
        parent: None,
    }];

    for _ in 0..config.iterations {
        let sample = if rng.gen_bool(config.goal_bias) {
            goal
        } else {
            Point2::new(
                rng.gen_range(-half_x..=half_x),
                rng.gen_range(-half_y..=half_y),
            )
        };
        if !is_position_open(world, sample, mover, config.sample_buffer) {
            continue;
        }

        let Some(nearest) = nearest_node(&nodes, sample) else {
            continue;
        };
        let Some(new_pos) = extend(world, mover, nodes[nearest].pos, sample, config) else {
            continue;
        };
        nodes.push(Node {
            pos: new_pos,
            parent: Some(nearest),
        });

        if new_pos.distance(&goal) <= config.step {
            let mut chain = trace_back(&nodes, nodes.len() - 1);
            chain.push(goal);
            return Ok(smooth(world, mover, chain, goal, config.check_legal));
        }
    }

    Err(Error::RrtFailed {
        iterations: config.iterations,
    })
}

fn nearest_node(nodes: &[Node], target: Point2) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            a.pos
                .distance(&target)
                .total_cmp(&b.pos.distance(&target))
        })
        .map(|(i, _)| i)
}

/// Step from `from` towards `target`, stopping at the first blocked or
/// illegal step. Returns the last good step, if any.
fn extend(
    world: &WorldModel,
    mover: Mover,
    from: Point2,
    target: Point2,
    config: &RrtConfig,
) -> Option<Point2> {
    let delta = target - from;
    let dir = delta.unit()?;
    let reach = delta.norm().min(config.max_extension);

    let mut last = None;
    let mut travelled = 0.0;
    while travelled < reach {
        travelled = (travelled + config.step).min(reach);
        let p = from + dir * travelled;
        let open = is_position_open(world, p, mover, 0.0);
        let legal = !config.check_legal || world.is_pos_legal(p, mover.team, mover.id);
        if !(open && legal) {
            break;
        }
        last = Some(p);
    }
    last
}

/// Root-to-node positions, root included.
fn trace_back(nodes: &[Node], leaf: usize) -> Vec<Point2> {
    let mut chain = Vec::new();
    let mut cursor = Some(leaf);
    while let Some(i) = cursor {
        chain.push(nodes[i].pos);
        cursor = nodes[i].parent;
    }
    chain.reverse();
    chain
}

/// Drop skippable middle points, then cut the tail at the first point
/// that sees the goal. The start point is removed from the result.
fn smooth(
    world: &WorldModel,
    mover: Mover,
    mut chain: Vec<Point2>,
    goal: Point2,
    check_legal: bool,
) -> Vec<Point2> {
    let mut i = 0;
    while i + 2 < chain.len() {
        if is_path_blocked(world, chain[i], chain[i + 2], mover, check_legal) {
            i += 1;
        } else {
            chain.remove(i + 1);
        }
    }

    if let Some(cut) = chain
        .iter()
        .position(|&p| !is_path_blocked(world, p, goal, mover, check_legal))
    {
        chain.truncate(cut + 1);
        if chain.last() != Some(&goal) {
            chain.push(goal);
        }
    }

    if chain.len() > 1 {
        chain.remove(0);
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Pose, Team};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn config(w: &WorldModel) -> RrtConfig {
        RrtConfig::from_world(w, false)
    }

    #[test]
    fn test_clear_field_direct() {
        let mut w = WorldModel::default();
        w.push_robot(Team::Blue, 1, 0.0, Pose::new(-3000.0, 0.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);
        let path = find_path(
            &w,
            Mover::new(Team::Blue, 1),
            Point2::new(-3000.0, 0.0),
            Point2::new(3000.0, 0.0),
            &config(&w),
            &mut rng,
        )
        .unwrap();
        assert_eq!(path, vec![Point2::new(3000.0, 0.0)]);
    }

    #[test]
    fn test_detour_around_wall() {
        let mut w = WorldModel::default();
        // Vertical wall of opponents between start and goal
        for (i, y) in [-810.0, -540.0, -270.0, 0.0, 270.0, 540.0, 810.0].iter().enumerate() {
            w.push_robot(Team::Yellow, i as u8, 0.0, Pose::new(0.0, *y, 0.0));
        }
        let mover = Mover::new(Team::Blue, 0);
        let start = Point2::new(-1500.0, 0.0);
        let goal = Point2::new(1500.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(7);
        let path = find_path(&w, mover, start, goal, &config(&w), &mut rng).unwrap();

        assert!(path.len() >= 2);
        assert_eq!(*path.last().unwrap(), goal);
        let mut from = start;
        for &to in &path {
            assert!(!is_path_blocked(&w, from, to, mover, false));
            from = to;
        }
    }

    #[test]
    fn test_surrounded_fails() {
        let mut w = WorldModel::default();
        let r = 2.0 * w.constants().robot.radius;
        for k in 0..8 {
            let a = k as f64 * std::f64::consts::FRAC_PI_4;
            w.push_robot(Team::Yellow, k, 0.0, Pose::new(r * a.cos(), r * a.sin(), 0.0));
        }
        let mut rng = SmallRng::seed_from_u64(3);
        let err = find_path(
            &w,
            Mover::new(Team::Blue, 0),
            Point2::ZERO,
            Point2::new(2000.0, 0.0),
            &config(&w),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, Error::RrtFailed { iterations: 1000 }));
    }
}
