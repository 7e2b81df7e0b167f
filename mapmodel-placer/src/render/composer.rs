use glam::{DMat4, DVec3};
use mapmodel_common::ModelDescriptor;

use crate::projection::MercatorCoordinate;

/// Floor for the composed scale factor; keeps the model matrix invertible.
pub const MIN_RENDER_SCALE: f64 = 1e-15;

/// Translation to the projected anchor, meters-to-mercator scaling with y
/// mirrored into the host's y-down convention, then x, y, z rotations.
pub fn model_matrix(descriptor: &ModelDescriptor, position: &MercatorCoordinate) -> DMat4 {
    let render_scale = (position.meter_scale * descriptor.scale_meters).max(MIN_RENDER_SCALE);
    let [rotation_x, rotation_y, rotation_z] = descriptor.rotation_radians();

    let translation = DMat4::from_translation(position.position());
    let scale = DMat4::from_scale(DVec3::new(render_scale, -render_scale, render_scale));
    let rotation = DMat4::from_rotation_x(rotation_x)
        * DMat4::from_rotation_y(rotation_y)
        * DMat4::from_rotation_z(rotation_z);

    translation * scale * rotation
}

pub fn clip_matrix(
    view_proj: &DMat4,
    descriptor: &ModelDescriptor,
    position: &MercatorCoordinate,
) -> DMat4 {
    *view_proj * model_matrix(descriptor, position)
}
