//! Fixed catalog of Ken Burns pan/zoom trajectories.

use serde::Serialize;

/// Linear pan/zoom over one image's display time.
///
/// Offsets are the crop-window centre as a fraction of the image width/height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KenBurnsTrajectory {
    pub name: &'static str,
    pub start_zoom: f64,
    pub end_zoom: f64,
    pub start_x: f64,
    pub end_x: f64,
    pub start_y: f64,
    pub end_y: f64,
}

pub const CATALOG: [KenBurnsTrajectory; 8] = [
    KenBurnsTrajectory {
        name: "zoom-in-left-to-right",
        start_zoom: 1.0,
        end_zoom: 1.2,
        start_x: 0.40,
        end_x: 0.60,
        start_y: 0.50,
        end_y: 0.50,
    },
    KenBurnsTrajectory {
        name: "zoom-in-right-to-left",
        start_zoom: 1.0,
        end_zoom: 1.2,
        start_x: 0.60,
        end_x: 0.40,
        start_y: 0.50,
        end_y: 0.50,
    },
    KenBurnsTrajectory {
        name: "zoom-in-top-to-bottom",
        start_zoom: 1.0,
        end_zoom: 1.2,
        start_x: 0.50,
        end_x: 0.50,
        start_y: 0.40,
        end_y: 0.60,
    },
    KenBurnsTrajectory {
        name: "zoom-in-bottom-to-top",
        start_zoom: 1.0,
        end_zoom: 1.2,
        start_x: 0.50,
        end_x: 0.50,
        start_y: 0.60,
        end_y: 0.40,
    },
    KenBurnsTrajectory {
        name: "zoom-out-from-center",
        start_zoom: 1.3,
        end_zoom: 1.0,
        start_x: 0.50,
        end_x: 0.50,
        start_y: 0.50,
        end_y: 0.50,
    },
    KenBurnsTrajectory {
        name: "diagonal-top-left-to-bottom-right",
        start_zoom: 1.0,
        end_zoom: 1.25,
        start_x: 0.40,
        end_x: 0.60,
        start_y: 0.40,
        end_y: 0.60,
    },
    KenBurnsTrajectory {
        name: "diagonal-top-right-to-bottom-left",
        start_zoom: 1.0,
        end_zoom: 1.25,
        start_x: 0.60,
        end_x: 0.40,
        start_y: 0.40,
        end_y: 0.60,
    },
    KenBurnsTrajectory {
        name: "subtle-drift",
        start_zoom: 1.05,
        end_zoom: 1.15,
        start_x: 0.45,
        end_x: 0.55,
        start_y: 0.50,
        end_y: 0.48,
    },
];

/// Trajectory for the image at `image_index` in playback order
pub fn select_trajectory(image_index: usize) -> KenBurnsTrajectory {
    CATALOG[image_index % CATALOG.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_periodic() {
        for k in 0..32 {
            assert_eq!(select_trajectory(k), select_trajectory(k + CATALOG.len()));
        }
    }

    #[test]
    fn test_catalog_entries_are_distinct() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.name, b.name);
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_zoom_never_below_one() {
        for t in &CATALOG {
            assert!(t.start_zoom >= 1.0 && t.end_zoom >= 1.0, "{}", t.name);
        }
    }
}
