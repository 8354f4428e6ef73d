//! Lead prediction for a pursuer closing on a constant-velocity target.
//!
//! Displacements always take the short way around the wrap: each axis picks
//! whichever periodic image of the target sits nearest the mover before the
//! pursuit quadratic is solved.

use crate::torus::{Plane, Position, Vec2};

const DEGENERATE_EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug)]
pub struct InterceptSolution {
    /// Where to steer, wrapped back into the plane.
    pub aim: Position,
    /// Target image minus mover, before any lead is applied.
    pub displacement: Vec2,
    /// Time to intercept, `None` when the target's current position is used.
    pub time: Option<f64>,
}

/// Aim point for a mover travelling at `max(min_speed, |mover velocity|)`.
pub fn intercept_position(
    plane: &Plane,
    target: &Position,
    mover: &Position,
    min_speed: f64,
) -> Position {
    solve_intercept(plane, target, mover, min_speed).aim
}

pub fn solve_intercept(
    plane: &Plane,
    target: &Position,
    mover: &Position,
    min_speed: f64,
) -> InterceptSolution {
    let displacement = Vec2::new(
        nearest_image(target.x, mover.x, plane.width()) - mover.x,
        nearest_image(target.y, mover.y, plane.height()) - mover.y,
    );
    let speed = min_speed.max(mover.speed());
    let target_velocity = target.velocity();

    let a = target_velocity.length_sq() - speed * speed;
    let b = 2.0 * target_velocity.dot(displacement);
    let c = displacement.length_sq();

    match intercept_time(a, b, c) {
        Some(t) => {
            let lead = mover.point() + displacement + target_velocity * t;
            let aim = plane.wrap(Position::with_velocity(
                lead.x, lead.y, target.vx, target.vy,
            ));
            InterceptSolution {
                aim,
                displacement,
                time: Some(t),
            }
        }
        None => InterceptSolution {
            aim: *target,
            displacement,
            time: None,
        },
    }
}

fn nearest_image(value: f64, reference: f64, size: f64) -> f64 {
    [value - size, value, value + size]
        .into_iter()
        .min_by(|a, b| (a - reference).abs().total_cmp(&(b - reference).abs()))
        .unwrap_or(value)
}

/// Smallest strictly positive root of `a t^2 + b t + c = 0`.
fn intercept_time(a: f64, b: f64, c: f64) -> Option<f64> {
    if c <= 0.0 {
        return Some(0.0);
    }

    // Target speed equals pursuit speed: the quadratic collapses to b t + c = 0.
    if a.abs() <= DEGENERATE_EPS {
        if b.abs() <= DEGENERATE_EPS {
            return None;
        }
        let t = -c / b;
        return (t.is_finite() && t > 0.0).then_some(t);
    }

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 {
        return None;
    }
    let sqrt_disc = disc.sqrt();
    let roots = [(-b - sqrt_disc) / (2.0 * a), (-b + sqrt_disc) / (2.0 * a)];

    roots
        .into_iter()
        .filter(|t| t.is_finite() && *t > 0.0)
        .min_by(f64::total_cmp)
}
