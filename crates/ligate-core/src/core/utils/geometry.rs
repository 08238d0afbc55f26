use nalgebra::{Isometry3, Point3, Rotation3, Translation3, Unit, UnitQuaternion, Vector3};

/// Vectors shorter than this are treated as degenerate for alignment purposes.
pub const DIRECTION_EPSILON: f64 = 1e-12;

pub fn clamped_angle(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    let denom = a.norm() * b.norm();
    if denom < DIRECTION_EPSILON {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos()
}

pub fn stable_orthogonal(v: &Vector3<f64>) -> Vector3<f64> {
    let n = v.normalize();
    let seed = if n.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    (seed - n * n.dot(&seed)).normalize()
}

/// Rotation taking `moving` onto the direction opposite `target`, so that two
/// ports end up facing each other rather than parallel.
///
/// Exactly opposed inputs (already facing) yield the identity; exactly
/// parallel inputs fall back to a half-turn about a stable orthogonal axis
/// instead of failing.
pub fn rotation_facing(moving: &Vector3<f64>, target: &Vector3<f64>) -> Rotation3<f64> {
    let goal = -target;
    Rotation3::rotation_between(moving, &goal).unwrap_or_else(|| {
        let axis = Unit::new_normalize(stable_orthogonal(moving));
        Rotation3::from_axis_angle(&axis, std::f64::consts::PI)
    })
}

/// A rigid-body motion: rotation followed by translation.
///
/// Wraps an [`Isometry3`] so the rotation is carried as a unit quaternion and
/// stays orthonormal within floating tolerance across compositions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform(Isometry3<f64>);

impl RigidTransform {
    pub fn identity() -> Self {
        Self(Isometry3::identity())
    }

    pub fn from_parts(rotation: Rotation3<f64>, translation: Vector3<f64>) -> Self {
        Self(Isometry3::from_parts(
            Translation3::from(translation),
            UnitQuaternion::from_rotation_matrix(&rotation),
        ))
    }

    /// The transform equivalent to applying `other` first, then `self`.
    pub fn compose(&self, other: &RigidTransform) -> RigidTransform {
        let mut iso = self.0 * other.0;
        iso.rotation = UnitQuaternion::new_normalize(iso.rotation.into_inner());
        Self(iso)
    }

    pub fn inverse(&self) -> RigidTransform {
        Self(self.0.inverse())
    }

    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        self.0.transform_point(point)
    }

    /// Applies only the rotational part; directions carry no positional offset.
    pub fn rotate_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.0.transform_vector(vector)
    }

    pub fn rotation(&self) -> Rotation3<f64> {
        self.0.rotation.to_rotation_matrix()
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.0.translation.vector
    }
}

impl Default for RigidTransform {
    fn default() -> Self {
        Self::identity()
    }
}
