use crate::config::ReferenceGeometry;
use crate::data::model::{Channel, Point3D};

// ---------------------------------------------------------------------------
// LMR coordinate calculator
// ---------------------------------------------------------------------------

/// Absolute coordinate of `channel` at `distance` along the tunnel.
///
/// The tunnel axis is treated as a straight line with the configured
/// direction. Each channel's reference XY already carries its lateral offset,
/// so only the along-axis component varies with distance; Z is the channel's
/// fixed elevation.
pub fn to_xyz(channel: Channel, distance: f64, geometry: &ReferenceGeometry) -> Point3D {
    let anchor = geometry.anchor(channel);
    let theta = geometry.direction_angle.to_radians();
    let d = distance - geometry.reference_distance;

    Point3D {
        x: anchor.x + d * theta.cos(),
        y: anchor.y + d * theta.sin(),
        z: anchor.z,
    }
}

/// Position of a sample `depth` metres into a hole collared at
/// `collar_distance`. Holes are drilled forward along the tunnel axis.
pub fn sample_position(
    channel: Channel,
    collar_distance: f64,
    depth: f64,
    geometry: &ReferenceGeometry,
) -> Point3D {
    to_xyz(channel, collar_distance + depth, geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calc::survey::{station_to_distance, SurveyStation};

    #[test]
    fn reference_distance_maps_to_anchor_exactly() {
        let g = ReferenceGeometry::default();
        for channel in Channel::ALL {
            let p = to_xyz(channel, g.reference_distance, &g);
            assert_eq!(p, g.anchor(channel), "{channel}");
        }
    }

    #[test]
    fn station_scenario_left_channel() {
        let g = ReferenceGeometry::default();
        let station: SurveyStation = "250+11".parse().unwrap();
        let distance = station_to_distance(&station, &g);
        assert_eq!(distance, -493.0);

        let p = to_xyz(Channel::Left, distance, &g);
        let theta = 65.588_f64.to_radians();
        let d = -493.0 - 967.0;
        assert_eq!(d, -1460.0);
        let expected_x = -660689.7596 + d * theta.cos();
        let expected_y = 733147.0996 + d * theta.sin();
        assert!((p.x - expected_x).abs() < 1e-6);
        assert!((p.y - expected_y).abs() < 1e-6);
        assert_eq!(p.z, 17.3);
    }

    #[test]
    fn elevation_depends_only_on_channel() {
        let g = ReferenceGeometry::default();
        for distance in [-1000.0, 0.0, 967.0, 2500.0] {
            assert_eq!(to_xyz(Channel::Center, distance, &g).z, 21.3);
            assert_eq!(to_xyz(Channel::Right, distance, &g).z, 17.3);
        }
    }

    #[test]
    fn moving_along_axis_covers_the_same_plan_distance() {
        let g = ReferenceGeometry::default();
        let a = to_xyz(Channel::Right, 100.0, &g);
        let b = to_xyz(Channel::Right, 112.5, &g);
        let plan = ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt();
        assert!((plan - 12.5).abs() < 1e-9);
    }

    #[test]
    fn sample_position_advances_from_collar() {
        let g = ReferenceGeometry::default();
        let collar = to_xyz(Channel::Left, 50.0, &g);
        assert_eq!(sample_position(Channel::Left, 50.0, 0.0, &g), collar);
        assert_eq!(
            sample_position(Channel::Left, 50.0, 3.0, &g),
            to_xyz(Channel::Left, 53.0, &g)
        );
    }
}
