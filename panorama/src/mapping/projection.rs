//! Curved warp parameters derived from the frame sweep.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config::BlendType;
use crate::error::Error;
use crate::math::DMat3;

/// Dominant direction of the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepAxis {
    Horizontal,
    Vertical,
}

impl SweepAxis {
    /// Split a point into `(along, across)` components for this axis.
    #[inline]
    fn split(self, p: DVec2) -> (f64, f64) {
        match self {
            SweepAxis::Horizontal => (p.x, p.y),
            SweepAxis::Vertical => (p.y, p.x),
        }
    }

    #[inline]
    fn join(self, along: f64, across: f64) -> DVec2 {
        match self {
            SweepAxis::Horizontal => DVec2::new(along, across),
            SweepAxis::Vertical => DVec2::new(across, along),
        }
    }
}

/// Cylinder-like warp that unrolls an arc of radius `radius` around `center`
/// into a straight strip of length `width`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvedWarp {
    /// Total rotation covered by the sweep, radians. Never zero.
    pub theta: f64,
    /// Arc length of the unrolled strip. The sign encodes the unroll direction.
    pub width: f64,
    pub radius: f64,
    pub center: DVec2,
    pub axis: SweepAxis,
    /// Offset that makes both ends of the strip land on the same line.
    pub correction: f64,
    /// `1.0` or `-1.0`, the side of the centre the strip lies on.
    pub direction: f64,
}

impl CurvedWarp {
    /// Planar mosaic point to strip coordinates.
    pub fn warp(&self, p: DVec2) -> Option<DVec2> {
        let (along, across) = self.axis.split(p - self.center);
        let length = along.hypot(across);
        if length == 0.0 {
            return None;
        }
        let ratio = along / length;
        if !(-1.0..=1.0).contains(&ratio) {
            return None;
        }
        let alpha = ratio.asin() / self.theta;
        let out_along = alpha * self.width * self.direction;
        let out_across = (length - self.radius) * self.direction + alpha * self.correction;
        let out = self.axis.join(out_along, out_across);
        out.is_finite().then_some(out)
    }

    /// Strip coordinates back to the planar mosaic.
    pub fn unwarp(&self, p: DVec2) -> Option<DVec2> {
        if self.width == 0.0 {
            return None;
        }
        let (along, across) = self.axis.split(p);
        let alpha = along * self.direction / self.width;
        let length = (across - alpha * self.correction) * self.direction + self.radius;
        let sin_t = (self.theta * alpha).sin();
        let cos_t = (1.0 - sin_t * sin_t).sqrt() * self.direction;
        let out = self.center + self.axis.join(length * sin_t, length * cos_t);
        out.is_finite().then_some(out)
    }
}

/// Mapping from planar mosaic coordinates to the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Projection {
    #[default]
    Planar,
    Curved(CurvedWarp),
}

impl Projection {
    /// Derive the output surface from the (prepared) transforms of a frame set.
    ///
    /// Only curved blend types produce a [`Projection::Curved`]; a sweep without
    /// rotation stays planar. In `full_circle` mode the rotation extent comes
    /// from the last transform alone and the warp centre is anchored on the
    /// first frame's middle.
    pub fn derive(
        transforms: &[DMat3],
        frame_width: usize,
        frame_height: usize,
        blend_type: BlendType,
        full_circle: bool,
    ) -> Result<Projection, Error> {
        if !blend_type.is_curved() || transforms.is_empty() {
            return Ok(Projection::Planar);
        }
        let last_index = transforms.len() - 1;
        let first = &transforms[0];
        let last = &transforms[last_index];
        let project = |index: usize, p: DVec2| {
            transforms[index]
                .try_transform_point(p)
                .ok_or(Error::DegenerateTransform { index })
        };

        let mid = DVec2::new(frame_width as f64 / 2.0, frame_height as f64 / 2.0);
        let first_mid = project(0, mid)?;

        let mut prev = first_mid;
        let mut arc_length = 0.0;
        let mut theta = 0.0;
        let mut last_theta = 0.0;
        for (index, t) in transforms.iter().enumerate() {
            let curr = project(index, mid)?;
            arc_length += (curr - prev).length();
            if !full_circle {
                let this_theta = t.at(1, 0).clamp(-1.0, 1.0).asin();
                theta += this_theta - last_theta;
                last_theta = this_theta;
            }
            prev = curr;
        }
        if full_circle {
            theta = last.at(1, 0).clamp(-1.0, 1.0).asin();
        }
        if theta == 0.0 || !theta.is_finite() {
            return Ok(Projection::Planar);
        }

        let first_pos = DVec2::new(first.at(0, 2), first.at(1, 2));
        let last_pos = DVec2::new(last.at(0, 2), last.at(1, 2));
        let axis = if (last_pos.x - first_pos.x).abs() > (last_pos.y - first_pos.y).abs() {
            SweepAxis::Horizontal
        } else {
            SweepAxis::Vertical
        };

        // Radius that puts both ends of the sweep at the same offset.
        let (d_along, d_across) = axis.split(prev - first_mid);
        let radius_theta = d_along / (std::f64::consts::FRAC_PI_2 - theta).cos();
        let radius = (d_across + radius_theta * theta.cos()).abs();

        let (first_along, first_across) = axis.split(first_mid);
        let (mid_along, _) = axis.split(mid);
        let (frame_extent_along, _) = axis.split(DVec2::new(
            frame_width as f64 - 1.0,
            frame_height as f64 - 1.0,
        ));
        let center_along = if full_circle {
            first_along
        } else {
            let (first_pos_along, _) = axis.split(first_pos);
            let (last_pos_along, _) = axis.split(last_pos);
            // Anchor on the trailing edge of the last frame.
            let (center_along, edge_along) = if last_pos_along - first_pos_along < 0.0 {
                (first_along + mid_along, 0.0)
            } else {
                (first_along - mid_along, frame_extent_along)
            };
            let (_, mid_across) = axis.split(mid);
            prev = project(last_index, axis.join(edge_along, mid_across))?;
            center_along
        };

        let (_, end_across) = axis.split(prev - first_mid);
        let direction = if end_across < 0.0 { 1.0 } else { -1.0 };
        let center_across = first_across - radius * direction;
        let width = if end_across * theta > 0.0 {
            -arc_length
        } else {
            arc_length
        };
        let center = axis.join(center_along, center_across);

        let (end_along, end_across) = axis.split(prev - center);
        let length = end_along.hypot(end_across);
        let end_theta = (end_along / length).clamp(-1.0, 1.0).asin();
        let mut correction = ((radius - length) * direction) / (end_theta / theta);
        if !correction.is_finite() {
            correction = 0.0;
        }

        let warp = CurvedWarp {
            theta,
            width,
            radius,
            center,
            axis,
            correction,
            direction,
        };
        if radius == 0.0 || width == 0.0 || !radius.is_finite() || !center.is_finite() {
            tracing::warn!(?warp, "Degenerate curved warp, falling back to planar");
            return Ok(Projection::Planar);
        }
        Ok(Projection::Curved(warp))
    }

    #[inline]
    pub fn is_planar(&self) -> bool {
        matches!(self, Projection::Planar)
    }

    /// Frame pixel coordinates to mosaic coordinates.
    #[inline]
    pub fn frame_to_mosaic(&self, transform: &DMat3, p: DVec2) -> Option<DVec2> {
        let planar = transform.try_transform_point(p)?;
        match self {
            Projection::Planar => Some(planar),
            Projection::Curved(warp) => warp.warp(planar),
        }
    }

    /// Mosaic coordinates back to frame pixel coordinates.
    #[inline]
    pub fn mosaic_to_frame(&self, inverse: &DMat3, p: DVec2) -> Option<DVec2> {
        let planar = match self {
            Projection::Planar => p,
            Projection::Curved(warp) => warp.unwarp(p)?,
        };
        inverse.try_transform_point(planar)
    }
}
