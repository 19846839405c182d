//! Pose frame types - sparse sets of normalized body landmarks
//!
//! Landmark positions follow the MediaPipe pose topology: index 0 is the
//! nose/head, 11/12 the shoulders, 15/16 the wrists, 23/24 the hips, 25/26
//! the knees, 27/28 the ankles. Coordinates are normalized to [0, 1] with
//! the origin at the top-left of the (mirrored) camera image.
//!
//! Any landmark may be absent in any frame; absence is never an error.

/// Number of landmark slots in the pose topology.
pub const LANDMARK_COUNT: usize = 33;

/// A single detected landmark, normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
}

/// The landmarks the interpreter actually reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(usize)]
pub enum LandmarkIndex {
    Head = 0,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

/// One camera frame's worth of landmarks, indexable and sparse.
#[derive(Debug, Clone, PartialEq)]
pub struct PoseFrame {
    points: [Option<Landmark>; LANDMARK_COUNT],
}

impl Default for PoseFrame {
    fn default() -> Self {
        Self {
            points: [None; LANDMARK_COUNT],
        }
    }
}

impl PoseFrame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a landmark by raw index. Unknown indices and non-finite
    /// coordinates are ignored.
    pub fn set(&mut self, index: usize, x: f32, y: f32) {
        if index < LANDMARK_COUNT && x.is_finite() && y.is_finite() {
            self.points[index] = Some(Landmark { x, y });
        }
    }

    pub fn get(&self, index: LandmarkIndex) -> Option<Landmark> {
        self.points[index as usize]
    }

    /// Midpoint of the two landmarks, or whichever one is present.
    pub fn midpoint(&self, a: LandmarkIndex, b: LandmarkIndex) -> Option<Landmark> {
        match (self.get(a), self.get(b)) {
            (Some(l), Some(r)) => Some(Landmark {
                x: (l.x + r.x) / 2.0,
                y: (l.y + r.y) / 2.0,
            }),
            (Some(l), None) => Some(l),
            (None, Some(r)) => Some(r),
            (None, None) => None,
        }
    }
}
