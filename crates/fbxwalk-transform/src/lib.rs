use glam::{DMat4, DVec3};
use std::sync::{Mutex, PoisonError};

/// Euler rotation order of a node. `EulerXYZ` rotates about X first, then Y, then Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationOrder {
    #[default]
    EulerXYZ,
    EulerXZY,
    EulerYZX,
    EulerYXZ,
    EulerZXY,
    EulerZYX,
    SphericXYZ,
}

impl RotationOrder {
    /// Maps the `RotationOrder` enum property stored in the file, unknown values fall back to `EulerXYZ`.
    pub fn from_fbx(value: i64) -> Self {
        match value {
            1 => Self::EulerXZY,
            2 => Self::EulerYZX,
            3 => Self::EulerYXZ,
            4 => Self::EulerZXY,
            5 => Self::EulerZYX,
            6 => Self::SphericXYZ,
            _ => Self::EulerXYZ,
        }
    }

    /// Rotation matrix for euler angles given in degrees.
    pub fn matrix(&self, degrees: DVec3) -> DMat4 {
        let x = DMat4::from_rotation_x(degrees.x.to_radians());
        let y = DMat4::from_rotation_y(degrees.y.to_radians());
        let z = DMat4::from_rotation_z(degrees.z.to_radians());

        // Column vectors, so the first axis applied is the rightmost factor.
        match self {
            Self::EulerXYZ | Self::SphericXYZ => z * y * x,
            Self::EulerXZY => y * z * x,
            Self::EulerYZX => x * z * y,
            Self::EulerYXZ => z * x * y,
            Self::EulerZXY => y * x * z,
            Self::EulerZYX => x * y * z,
        }
    }
}

/// Local transform of a scene node, expressed the way the file stores it.
///
/// The evaluated matrix is
/// `T * Roff * Rp * Rpre * R * Rpost^-1 * Rp^-1 * Soff * Sp * S * Sp^-1`
/// and is cached until one of the components changes.
#[derive(Debug)]
pub struct NodeTransform {
    translation: DVec3,
    rotation: DVec3,
    scaling: DVec3,
    pre_rotation: DVec3,
    post_rotation: DVec3,
    rotation_offset: DVec3,
    rotation_pivot: DVec3,
    scaling_offset: DVec3,
    scaling_pivot: DVec3,
    rotation_order: RotationOrder,
    rotation_active: bool,
    matrix: Mutex<(DMat4, bool)>,
}

impl Clone for NodeTransform {
    fn clone(&self) -> Self {
        let matrix = *self.matrix.lock().unwrap_or_else(PoisonError::into_inner);

        Self {
            translation: self.translation,
            rotation: self.rotation,
            scaling: self.scaling,
            pre_rotation: self.pre_rotation,
            post_rotation: self.post_rotation,
            rotation_offset: self.rotation_offset,
            rotation_pivot: self.rotation_pivot,
            scaling_offset: self.scaling_offset,
            scaling_pivot: self.scaling_pivot,
            rotation_order: self.rotation_order,
            rotation_active: self.rotation_active,
            matrix: Mutex::new(matrix),
        }
    }
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            translation: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scaling: DVec3::ONE,
            pre_rotation: DVec3::ZERO,
            post_rotation: DVec3::ZERO,
            rotation_offset: DVec3::ZERO,
            rotation_pivot: DVec3::ZERO,
            scaling_offset: DVec3::ZERO,
            scaling_pivot: DVec3::ZERO,
            rotation_order: RotationOrder::EulerXYZ,
            rotation_active: false,
            matrix: Mutex::new((DMat4::IDENTITY, false)),
        }
    }
}

impl NodeTransform {
    /// Translation, euler rotation in degrees and scaling, without pivots.
    pub fn new(translation: DVec3, rotation: DVec3, scaling: DVec3) -> Self {
        Self {
            translation,
            rotation,
            scaling,
            matrix: Mutex::new((DMat4::IDENTITY, true)),
            ..Default::default()
        }
    }

    pub fn from_translation(translation: DVec3) -> Self {
        Self::new(translation, DVec3::ZERO, DVec3::ONE)
    }

    pub fn get_translation(&self) -> DVec3 {
        self.translation
    }

    pub fn get_rotation(&self) -> DVec3 {
        self.rotation
    }

    pub fn get_scaling(&self) -> DVec3 {
        self.scaling
    }

    pub fn get_rotation_order(&self) -> RotationOrder {
        self.rotation_order
    }

    pub fn set_translation(&mut self, translation: DVec3) {
        self.translation = translation;
        self.mark_dirty();
    }

    pub fn set_rotation(&mut self, rotation: DVec3) {
        self.rotation = rotation;
        self.mark_dirty();
    }

    pub fn set_scaling(&mut self, scaling: DVec3) {
        self.scaling = scaling;
        self.mark_dirty();
    }

    pub fn set_pre_rotation(&mut self, pre_rotation: DVec3) {
        self.pre_rotation = pre_rotation;
        self.mark_dirty();
    }

    pub fn set_post_rotation(&mut self, post_rotation: DVec3) {
        self.post_rotation = post_rotation;
        self.mark_dirty();
    }

    pub fn set_rotation_offset(&mut self, rotation_offset: DVec3) {
        self.rotation_offset = rotation_offset;
        self.mark_dirty();
    }

    pub fn set_rotation_pivot(&mut self, rotation_pivot: DVec3) {
        self.rotation_pivot = rotation_pivot;
        self.mark_dirty();
    }

    pub fn set_scaling_offset(&mut self, scaling_offset: DVec3) {
        self.scaling_offset = scaling_offset;
        self.mark_dirty();
    }

    pub fn set_scaling_pivot(&mut self, scaling_pivot: DVec3) {
        self.scaling_pivot = scaling_pivot;
        self.mark_dirty();
    }

    pub fn set_rotation_order(&mut self, rotation_order: RotationOrder) {
        self.rotation_order = rotation_order;
        self.mark_dirty();
    }

    /// Pre/post rotation and the rotation order only take effect while rotation is active.
    pub fn set_rotation_active(&mut self, rotation_active: bool) {
        self.rotation_active = rotation_active;
        self.mark_dirty();
    }

    pub fn get_matrix(&self) -> DMat4 {
        let mut matrix = self.matrix.lock().unwrap_or_else(PoisonError::into_inner);

        if matrix.1 {
            matrix.0 = self.evaluate();
            matrix.1 = false;
        }

        matrix.0
    }

    fn mark_dirty(&mut self) {
        self.matrix.get_mut().unwrap_or_else(PoisonError::into_inner).1 = true;
    }

    fn evaluate(&self) -> DMat4 {
        let (order, pre, post) = if self.rotation_active {
            (
                self.rotation_order,
                RotationOrder::EulerXYZ.matrix(self.pre_rotation),
                RotationOrder::EulerXYZ.matrix(self.post_rotation),
            )
        } else {
            (RotationOrder::EulerXYZ, DMat4::IDENTITY, DMat4::IDENTITY)
        };

        let t = DMat4::from_translation(self.translation);
        let r_off = DMat4::from_translation(self.rotation_offset);
        let r_piv = DMat4::from_translation(self.rotation_pivot);
        let r = order.matrix(self.rotation);
        let s_off = DMat4::from_translation(self.scaling_offset);
        let s_piv = DMat4::from_translation(self.scaling_pivot);
        let s = DMat4::from_scale(self.scaling);

        t * r_off
            * r_piv
            * pre
            * r
            * post.inverse()
            * r_piv.inverse()
            * s_off
            * s_piv
            * s
            * s_piv.inverse()
    }
}
