/// In-place transforms over a mesh's vertex buffer, plus the matrices the
/// viewer composes for projection
use nalgebra::{Matrix3, Matrix4, Rotation3, Vector3};

use crate::geometry::Mesh;

/// Transform builder and in-place mesh transforms
pub struct Transform;

impl Transform {
    /// Combined rotation from angles in degrees: X is applied first, then Y,
    /// then Z (right-handed about each axis)
    pub fn rotation_matrix(angle_x: f64, angle_y: f64, angle_z: f64) -> Matrix3<f64> {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), angle_x.to_radians());
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), angle_y.to_radians());
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), angle_z.to_radians());

        (rz * ry * rx).into_inner()
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f64>,
        view: &Matrix4<f64>,
        projection: &Matrix4<f64>,
    ) -> Matrix4<f64> {
        projection * view * model
    }

    /// Multiply every coordinate by `factor`. Negative factors mirror the
    /// model and zero collapses it onto the origin.
    pub fn scale(mesh: &mut Mesh, factor: f64) {
        for coord in mesh.positions_mut() {
            *coord *= factor;
        }
    }

    pub fn translate(mesh: &mut Mesh, dx: f64, dy: f64, dz: f64) {
        for xyz in mesh.positions_mut().chunks_exact_mut(3) {
            xyz[0] += dx;
            xyz[1] += dy;
            xyz[2] += dz;
        }
    }

    /// Rotate every vertex by a freshly built [`Transform::rotation_matrix`].
    /// Nothing is accumulated between calls.
    pub fn rotate(mesh: &mut Mesh, angle_x: f64, angle_y: f64, angle_z: f64) {
        let rotation = Self::rotation_matrix(angle_x, angle_y, angle_z);
        for xyz in mesh.positions_mut().chunks_exact_mut(3) {
            let rotated = rotation * Vector3::new(xyz[0], xyz[1], xyz[2]);
            xyz.copy_from_slice(rotated.as_slice());
        }
    }

    /// Move the mesh so its bounding-box center sits on the origin
    pub fn center(mesh: &mut Mesh) {
        if let Some(bounds) = mesh.bounds() {
            let center = bounds.center();
            Self::translate(mesh, -center.x, -center.y, -center.z);
        }
    }
}
