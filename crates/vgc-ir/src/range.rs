//! Per-kind interval transfer functions for range analysis.

use crate::interval::{Interval, WorldBounds};
use crate::kind::{BinaryOp, CompareOp, NodeKind, UnaryOp};

/// Computes the conservative output interval of a kind from its input
/// intervals. `None` means the output is not interval-tracked (seed,
/// color, material, and structural kinds).
///
/// A missing input interval (unconnected pin or untracked source) widens
/// the result to everything rather than failing: range analysis must stay
/// conservative in the face of partial graphs.
pub fn transfer(
    kind: &NodeKind,
    inputs: &[Option<Interval>],
    bounds: &WorldBounds,
) -> Option<Interval> {
    let get = |i: usize| -> Interval {
        inputs
            .get(i)
            .copied()
            .flatten()
            .unwrap_or_else(Interval::everything)
    };

    Some(match kind {
        NodeKind::X => bounds.axis(0),
        NodeKind::Y => bounds.axis(1),
        NodeKind::Z => bounds.axis(2),

        NodeKind::Constant(v) => Interval::point(*v),
        NodeKind::IntConstant(v) => Interval::point(*v as f32),
        NodeKind::BoolConstant(v) => Interval::point(if *v { 1.0 } else { 0.0 }),

        NodeKind::Binary(op) => {
            let a = get(0);
            let b = get(1);
            match op {
                BinaryOp::Add => a.add(&b),
                BinaryOp::Subtract => a.sub(&b),
                BinaryOp::Multiply => a.mul(&b),
                BinaryOp::Divide => a.div(&b),
                BinaryOp::Min => a.min_with(&b),
                BinaryOp::Max => a.max_with(&b),
                // Pow bounds are subtle with negative bases; stay wide.
                BinaryOp::Pow => Interval::everything(),
            }
        }
        NodeKind::Unary(op) => {
            let v = get(0);
            match op {
                UnaryOp::Negate => v.neg(),
                UnaryOp::Abs => v.abs(),
                UnaryOp::Sqrt => v.sqrt(),
                UnaryOp::Floor => v.floor(),
                UnaryOp::Ceil => v.ceil(),
                UnaryOp::Sin | UnaryOp::Cos => Interval::new(-1.0, 1.0),
                UnaryOp::OneMinus => Interval::point(1.0).sub(&v),
            }
        }
        NodeKind::Clamp => get(0).clamp_to(&get(1), &get(2)),
        NodeKind::Lerp => get(0).lerp(&get(1), &get(2)),
        NodeKind::Select => get(1).union(&get(2)),
        NodeKind::Compare(op) => {
            // Provably constant comparisons collapse to a point so the
            // constants pass can fold the whole branch.
            let a = get(0);
            let b = get(1);
            let always = match op {
                CompareOp::Less => a.max < b.min,
                CompareOp::LessEqual => a.max <= b.min,
                CompareOp::Greater => a.min > b.max,
                CompareOp::GreaterEqual => a.min >= b.max,
            };
            let never = match op {
                CompareOp::Less => a.min >= b.max,
                CompareOp::LessEqual => a.min > b.max,
                CompareOp::Greater => a.max <= b.min,
                CompareOp::GreaterEqual => a.max < b.min,
            };
            if always {
                Interval::point(1.0)
            } else if never {
                Interval::point(0.0)
            } else {
                Interval::new(0.0, 1.0)
            }
        }

        NodeKind::Noise(params) => {
            let amp = params.amplitude.abs();
            Interval::new(-amp, amp)
        }

        NodeKind::RoundToInt => {
            let v = get(0);
            Interval::new(v.min.round(), v.max.round())
        }
        NodeKind::IntToFloat => get(0),

        NodeKind::MacroOutput { .. } | NodeKind::Output { .. } => get(0),

        NodeKind::ColorConstant(_)
        | NodeKind::SeedConstant(_)
        | NodeKind::CombineSeeds
        | NodeKind::FlattenMaterial
        | NodeKind::SeedRelay { .. }
        | NodeKind::Macro { .. }
        | NodeKind::MacroInput { .. }
        | NodeKind::LocalVariableDeclaration { .. }
        | NodeKind::LocalVariableUsage { .. } => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> WorldBounds {
        WorldBounds {
            min: [-10.0; 3],
            max: [10.0; 3],
        }
    }

    #[test]
    fn coordinates_take_world_bounds() {
        let r = transfer(&NodeKind::X, &[], &bounds()).unwrap();
        assert_eq!(r, Interval::new(-10.0, 10.0));
    }

    #[test]
    fn add_propagates() {
        let a = Some(Interval::new(0.0, 1.0));
        let b = Some(Interval::new(2.0, 3.0));
        let r = transfer(&NodeKind::Binary(BinaryOp::Add), &[a, b], &bounds()).unwrap();
        assert_eq!(r, Interval::new(2.0, 4.0));
    }

    #[test]
    fn missing_input_widens() {
        let r = transfer(
            &NodeKind::Binary(BinaryOp::Add),
            &[Some(Interval::point(1.0)), None],
            &bounds(),
        )
        .unwrap();
        assert_eq!(r, Interval::everything());
    }

    #[test]
    fn noise_bounded_by_amplitude() {
        let kind = NodeKind::Noise(crate::kind::NoiseParams {
            algorithm: crate::kind::NoiseAlgorithm::Perlin,
            frequency: 0.02,
            amplitude: 5.0,
            resolved_seed: None,
        });
        let r = transfer(&kind, &[None, None, None, None], &bounds()).unwrap();
        assert_eq!(r, Interval::new(-5.0, 5.0));
    }

    #[test]
    fn decided_comparison_is_constant() {
        let a = Some(Interval::new(0.0, 1.0));
        let b = Some(Interval::new(2.0, 3.0));
        let r = transfer(&NodeKind::Compare(CompareOp::Less), &[a, b], &bounds()).unwrap();
        assert!(r.is_constant());
        assert_eq!(r.min, 1.0);
    }

    #[test]
    fn seed_kinds_untracked() {
        assert!(transfer(&NodeKind::SeedConstant(4), &[], &bounds()).is_none());
    }
}
