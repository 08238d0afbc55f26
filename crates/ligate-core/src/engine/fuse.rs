use super::error::EngineError;
use crate::core::models::ids::{FragmentId, PortId};
use crate::core::models::structure::{Structure, StructureError};
use crate::core::models::topology::BondOrder;
use crate::core::utils::geometry::{self, DIRECTION_EPSILON, RigidTransform};
use crate::engine::config::GapPolicy;
use nalgebra::Vector3;
use tracing::{debug, instrument, warn};

/// Superimposes two ports and fuses their fragments.
///
/// This is the whole-body alignment operation: the subtree rooted at the
/// moving port's top-level fragment is rigidly rotated so the two ports face
/// each other, then translated so the moving anchor lands at the target
/// anchor offset by the configured gap along the target's outward direction.
/// The moving root is re-parented under the target's root, an implicit single
/// bond is recorded between the two anchors, and both ports are consumed.
///
/// # Errors
///
/// Returns [`EngineError::PortUnavailable`] if either port has already been
/// consumed and [`EngineError::Cycle`] if both ports already live in the same
/// tree. Near-zero port directions are not errors; they log a warning and
/// fall back to a stable axis.
#[instrument(skip_all, name = "fuse")]
pub fn fuse(
    structure: &mut Structure,
    moving_port: PortId,
    target_port: PortId,
    policy: GapPolicy,
) -> Result<(), EngineError> {
    let (moving_root, target_root) = check_preconditions(structure, moving_port, target_port)?;

    let transform = alignment_transform(structure, moving_port, target_port, policy)?;
    structure.apply_transform(moving_root, &transform)?;
    structure.attach(target_root, moving_root, None)?;

    let moving_anchor = structure.port(moving_port).unwrap().anchor;
    let target_anchor = structure.port(target_port).unwrap().anchor;
    structure.add_bond(moving_anchor, target_anchor, BondOrder::Single)?;

    structure.port_mut(moving_port).unwrap().consume()?;
    structure.port_mut(target_port).unwrap().consume()?;

    debug!(
        moving = %structure.port(moving_port).unwrap().label,
        target = %structure.port(target_port).unwrap().label,
        "Fused ports and re-parented moving fragment."
    );
    Ok(())
}

fn check_preconditions(
    structure: &Structure,
    moving_port: PortId,
    target_port: PortId,
) -> Result<(FragmentId, FragmentId), EngineError> {
    let moving = structure
        .port(moving_port)
        .ok_or(StructureError::PortNotFound)?;
    let target = structure
        .port(target_port)
        .ok_or(StructureError::PortNotFound)?;

    for port in [moving, target] {
        if !port.is_available() {
            return Err(EngineError::PortUnavailable {
                label: port.label.clone(),
            });
        }
    }

    let moving_root = structure.root_of(moving.fragment());
    let target_root = structure.root_of(target.fragment());
    if moving_root == target_root {
        return Err(EngineError::Cycle {
            moving: structure.fragment(moving.fragment()).unwrap().name.clone(),
            target: structure.fragment(target.fragment()).unwrap().name.clone(),
        });
    }

    Ok((moving_root, target_root))
}

fn alignment_transform(
    structure: &Structure,
    moving_port: PortId,
    target_port: PortId,
    policy: GapPolicy,
) -> Result<RigidTransform, EngineError> {
    let moving = structure.port(moving_port).unwrap();
    let target = structure.port(target_port).unwrap();

    let moving_dir = effective_direction(&moving.direction, &moving.label);
    let target_dir = effective_direction(&target.direction, &target.label);

    let rotation = geometry::rotation_facing(&moving_dir, &target_dir);
    let gap = policy.gap(target.separation, moving.separation);

    let moving_anchor = structure
        .particle(moving.anchor)
        .ok_or(StructureError::ParticleNotFound)?
        .position;
    let target_anchor = structure
        .particle(target.anchor)
        .ok_or(StructureError::ParticleNotFound)?
        .position;

    let desired = target_anchor + target_dir.normalize() * gap;
    let translation = desired - rotation * moving_anchor;
    Ok(RigidTransform::from_parts(rotation, translation))
}

fn effective_direction(direction: &Vector3<f64>, label: &str) -> Vector3<f64> {
    if direction.norm() < DIRECTION_EPSILON {
        warn!(
            port = label,
            "Degenerate port direction; aligning along a fallback axis."
        );
        Vector3::z()
    } else {
        *direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::ids::ParticleId;
    use crate::core::models::particle::Particle;
    use nalgebra::Point3;

    const TOL: f64 = 1e-9;
    const HALF_CC_BOND: f64 = 0.77;

    struct UnitRefs {
        fragment: FragmentId,
        carbon: ParticleId,
        up: PortId,
        down: PortId,
    }

    fn methylene(structure: &mut Structure, up_direction: Vector3<f64>) -> UnitRefs {
        let fragment = structure.new_fragment("methylene");
        let carbon = structure
            .add_particle(
                fragment,
                Particle::new("C", "C", Point3::origin()),
                Some("C"),
            )
            .unwrap();
        for x in [-0.89, 0.89] {
            let hydrogen = structure
                .add_particle(
                    fragment,
                    Particle::new("H", "H", Point3::new(x, 0.0, 0.63)),
                    Some("H[$]"),
                )
                .unwrap();
            structure
                .add_bond(carbon, hydrogen, BondOrder::Single)
                .unwrap();
        }
        let up = structure
            .add_port(fragment, "up", carbon, up_direction, HALF_CC_BOND)
            .unwrap();
        let down = structure
            .add_port(fragment, "down", carbon, -up_direction, HALF_CC_BOND)
            .unwrap();
        UnitRefs {
            fragment,
            carbon,
            up,
            down,
        }
    }

    fn anchor_distance(structure: &Structure, a: ParticleId, b: ParticleId) -> f64 {
        let pa = structure.particle(a).unwrap().position;
        let pb = structure.particle(b).unwrap().position;
        (pa - pb).norm()
    }

    #[test]
    fn fused_anchors_sit_at_the_additive_gap() {
        let mut structure = Structure::new();
        let first = methylene(&mut structure, Vector3::y());
        let second = methylene(&mut structure, Vector3::y());

        fuse(&mut structure, second.up, first.down, GapPolicy::Additive).unwrap();

        let distance = anchor_distance(&structure, first.carbon, second.carbon);
        assert!((distance - 2.0 * HALF_CC_BOND).abs() < TOL);
    }

    #[test]
    fn gap_policy_controls_the_fused_distance() {
        for (policy, expected) in [
            (GapPolicy::Additive, 2.0 * HALF_CC_BOND),
            (GapPolicy::TargetOnly, HALF_CC_BOND),
            (GapPolicy::Mean, HALF_CC_BOND),
        ] {
            let mut structure = Structure::new();
            let first = methylene(&mut structure, Vector3::y());
            let second = methylene(&mut structure, Vector3::y());

            fuse(&mut structure, second.up, first.down, policy).unwrap();

            let distance = anchor_distance(&structure, first.carbon, second.carbon);
            assert!((distance - expected).abs() < TOL);
        }
    }

    #[test]
    fn fused_ports_face_each_other() {
        let mut structure = Structure::new();
        let first = methylene(&mut structure, Vector3::y());
        // Give the moving unit a skewed frame so the fusion must rotate it.
        let second = methylene(&mut structure, Vector3::new(1.0, 0.3, -0.4));

        fuse(&mut structure, second.up, first.down, GapPolicy::Additive).unwrap();

        let target_dir = structure.port(first.down).unwrap().direction.normalize();
        let moving_dir = structure.port(second.up).unwrap().direction.normalize();
        assert!((moving_dir + target_dir).norm() < TOL);
    }

    #[test]
    fn fusion_moves_the_whole_subtree_rigidly() {
        let mut structure = Structure::new();
        let first = methylene(&mut structure, Vector3::y());
        let second = methylene(&mut structure, Vector3::new(0.2, -1.0, 0.5));

        let before: Vec<f64> = {
            let positions: Vec<Point3<f64>> = structure
                .particles_of(second.fragment)
                .map(|(_, p)| p.position)
                .collect();
            positions
                .iter()
                .flat_map(|a| positions.iter().map(move |b| (a - b).norm()))
                .collect()
        };

        fuse(&mut structure, second.up, first.down, GapPolicy::Additive).unwrap();

        let after: Vec<f64> = {
            let positions: Vec<Point3<f64>> = structure
                .particles_of(second.fragment)
                .map(|(_, p)| p.position)
                .collect();
            positions
                .iter()
                .flat_map(|a| positions.iter().map(move |b| (a - b).norm()))
                .collect()
        };

        for (d_before, d_after) in before.iter().zip(after.iter()) {
            assert!((d_before - d_after).abs() < TOL);
        }
    }

    #[test]
    fn fusion_consumes_both_ports_and_records_the_bond() {
        let mut structure = Structure::new();
        let first = methylene(&mut structure, Vector3::y());
        let second = methylene(&mut structure, Vector3::y());

        fuse(&mut structure, second.up, first.down, GapPolicy::Additive).unwrap();

        assert!(!structure.port(second.up).unwrap().is_available());
        assert!(!structure.port(first.down).unwrap().is_available());
        assert!(
            structure
                .bonded_neighbors(second.carbon)
                .unwrap()
                .contains(&first.carbon)
        );

        let root = structure.root_of(first.fragment);
        assert_eq!(
            structure.open_ports(root),
            vec![first.up, second.down],
            "Only the outward-facing ports remain open"
        );
    }

    #[test]
    fn fusion_re_parents_the_moving_root_under_the_target_root() {
        let mut structure = Structure::new();
        let first = methylene(&mut structure, Vector3::y());
        let second = methylene(&mut structure, Vector3::y());

        fuse(&mut structure, second.up, first.down, GapPolicy::Additive).unwrap();

        assert_eq!(structure.root_of(second.fragment), first.fragment);
        assert_eq!(
            structure.fragment(first.fragment).unwrap().children(),
            &[second.fragment]
        );
        assert_eq!(structure.roots(), &[first.fragment]);
    }

    #[test]
    fn fusing_a_consumed_port_fails() {
        let mut structure = Structure::new();
        let first = methylene(&mut structure, Vector3::y());
        let second = methylene(&mut structure, Vector3::y());
        let third = methylene(&mut structure, Vector3::y());

        fuse(&mut structure, second.up, first.down, GapPolicy::Additive).unwrap();
        let err = fuse(&mut structure, third.up, first.down, GapPolicy::Additive).unwrap_err();
        assert!(matches!(err, EngineError::PortUnavailable { .. }));
    }

    #[test]
    fn fusing_within_one_tree_fails_with_cycle() {
        let mut structure = Structure::new();
        let first = methylene(&mut structure, Vector3::y());
        let second = methylene(&mut structure, Vector3::y());

        fuse(&mut structure, second.up, first.down, GapPolicy::Additive).unwrap();
        let err = fuse(&mut structure, second.down, first.up, GapPolicy::Additive).unwrap_err();
        assert!(matches!(err, EngineError::Cycle { .. }));
    }

    #[test]
    fn degenerate_port_direction_falls_back_instead_of_failing() {
        let mut structure = Structure::new();
        let first = methylene(&mut structure, Vector3::y());

        let odd = structure.new_fragment("odd");
        let anchor = structure
            .add_particle(odd, Particle::new("X", "C", Point3::origin()), None)
            .unwrap();
        let odd_port = structure
            .add_port(odd, "stub", anchor, Vector3::zeros(), HALF_CC_BOND)
            .unwrap();

        fuse(&mut structure, odd_port, first.down, GapPolicy::Additive).unwrap();

        let position = structure.particle(anchor).unwrap().position;
        assert!(position.iter().all(|c| c.is_finite()));
        let distance = anchor_distance(&structure, first.carbon, anchor);
        assert!((distance - 2.0 * HALF_CC_BOND).abs() < TOL);
    }
}
