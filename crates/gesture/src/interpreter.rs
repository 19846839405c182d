//! Gesture interpreter - turns noisy landmark frames into stable cues
//!
//! The interpreter is a pure state machine over caller-supplied `Instant`s:
//! it never reads the clock, so debounce and cooldown behavior is fully
//! testable without sleeping.
//!
//! Per frame it classifies hip shift, per-hand raises, shoulder lean,
//! both-hands-up and (debounced) squat, then decides whether the resulting
//! [`GestureState`] is worth forwarding: only changes are forwarded, and
//! non-idle changes are rate-limited by a cooldown. Idle always passes so a
//! return to neutral is never delayed.

use std::time::{Duration, Instant};

use pose_tetris_types::{
    GestureState, GESTURE_COOLDOWN_MS, HAND_RAISE_MARGIN, HIP_SHIFT_THRESHOLD, SMOOTHING_ALPHA,
    SQUAT_HOLD_MS, SQUAT_RELEASE_MS,
};

use crate::pose::{Landmark, LandmarkIndex, PoseFrame};

/// Detection thresholds. Defaults are tuned for a person standing roughly
/// centered, two to three meters from the camera.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// EWMA weight for the newest hip-x sample.
    pub smoothing_alpha: f32,
    /// Horizontal hip displacement from center that counts as a shift.
    pub hip_shift_threshold: f32,
    /// Wrist must be this far above the shoulder to count as raised.
    pub hand_raise_margin: f32,
    /// Shoulder tilt counts as a lean when it exceeds this fraction of the
    /// shoulder separation.
    pub lean_ratio: f32,
    /// Hip drop below the standing reference that suggests a squat.
    pub squat_hip_drop: f32,
    /// Hip drop that counts as a squat regardless of knee angles.
    pub squat_large_hip_drop: f32,
    /// Mean knee angle below this (with a hip drop) suggests a squat.
    pub squat_knee_bend_deg: f32,
    /// A single knee bent past this counts as a squat on its own.
    pub squat_knee_strict_deg: f32,
    /// Raw squat must hold this long before the flag turns on.
    pub squat_hold: Duration,
    /// Raw non-squat must hold this long before the flag turns off.
    pub squat_release: Duration,
    /// Minimum gap between forwarded non-idle states.
    pub cooldown: Duration,
    /// Hip band around the standing reference treated as "still standing".
    pub standing_band: f32,
    /// Low-pass rate at which the standing reference follows the hips.
    pub standing_adapt_rate: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            smoothing_alpha: SMOOTHING_ALPHA,
            hip_shift_threshold: HIP_SHIFT_THRESHOLD,
            hand_raise_margin: HAND_RAISE_MARGIN,
            lean_ratio: 0.25,
            squat_hip_drop: 0.07,
            squat_large_hip_drop: 0.15,
            squat_knee_bend_deg: 150.0,
            squat_knee_strict_deg: 120.0,
            squat_hold: Duration::from_millis(SQUAT_HOLD_MS),
            squat_release: Duration::from_millis(SQUAT_RELEASE_MS),
            cooldown: Duration::from_millis(GESTURE_COOLDOWN_MS),
            standing_band: 0.03,
            standing_adapt_rate: 0.05,
        }
    }
}

pub struct GestureInterpreter {
    config: GestureConfig,
    hip_x_smoothed: Option<f32>,
    initial_hip_x: Option<f32>,
    standing_hip_y: Option<f32>,
    squat: bool,
    squat_raw_since: Option<Instant>,
    squat_clear_since: Option<Instant>,
    last_forwarded: Option<GestureState>,
    last_non_idle_forward: Option<Instant>,
}

impl GestureInterpreter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            hip_x_smoothed: None,
            initial_hip_x: None,
            standing_hip_y: None,
            squat: false,
            squat_raw_since: None,
            squat_clear_since: None,
            last_forwarded: None,
            last_non_idle_forward: None,
        }
    }

    /// Classify one frame and decide whether to forward the result.
    ///
    /// `None` frames (camera hiccup) classify as idle. A `None` return means
    /// the state was unchanged or rate-limited, not an error.
    pub fn process(&mut self, frame: Option<&PoseFrame>, now: Instant) -> Option<GestureState> {
        let state = match frame {
            Some(frame) => self.classify(frame, now),
            None => self.idle_state(),
        };
        self.forward(state, now)
    }

    fn idle_state(&self) -> GestureState {
        GestureState {
            hip_x: self.hip_x_smoothed.unwrap_or(0.5),
            hip_delta_x: self.hip_delta(),
            ..GestureState::default()
        }
    }

    fn hip_delta(&self) -> f32 {
        match (self.hip_x_smoothed, self.initial_hip_x) {
            (Some(s), Some(init)) => s - init,
            _ => 0.0,
        }
    }

    fn classify(&mut self, frame: &PoseFrame, now: Instant) -> GestureState {
        let Some(hip) = frame.midpoint(LandmarkIndex::LeftHip, LandmarkIndex::RightHip) else {
            // No usable hips: keep the previous smoothing state, stay idle.
            return self.idle_state();
        };

        let alpha = self.config.smoothing_alpha;
        let smoothed = match self.hip_x_smoothed {
            Some(prev) => alpha * hip.x + (1.0 - alpha) * prev,
            None => hip.x,
        };
        self.hip_x_smoothed = Some(smoothed);
        if self.initial_hip_x.is_none() {
            self.initial_hip_x = Some(smoothed);
        }

        let dx = smoothed - 0.5;
        let hip_left = dx < -self.config.hip_shift_threshold;
        let hip_right = dx > self.config.hip_shift_threshold;

        let left_hand_up =
            self.hand_raised(frame, LandmarkIndex::LeftWrist, LandmarkIndex::LeftShoulder);
        let right_hand_up =
            self.hand_raised(frame, LandmarkIndex::RightWrist, LandmarkIndex::RightShoulder);

        let both_hands_up = match (
            frame.get(LandmarkIndex::LeftWrist),
            frame.get(LandmarkIndex::RightWrist),
            frame.get(LandmarkIndex::Head),
        ) {
            (Some(lw), Some(rw), Some(head)) => lw.y < head.y && rw.y < head.y,
            _ => false,
        };

        let (lean_left, lean_right) = self.lean(frame);
        let squat = self.debounced_squat(frame, hip.y, now);

        let idle = !(hip_left
            || hip_right
            || left_hand_up
            || right_hand_up
            || both_hands_up
            || squat);

        GestureState {
            idle,
            hip_x: smoothed,
            hip_delta_x: self.hip_delta(),
            hip_left,
            hip_right,
            left_hand_up,
            right_hand_up,
            lean_left,
            lean_right,
            both_hands_up,
            squat,
        }
    }

    fn hand_raised(&self, frame: &PoseFrame, wrist: LandmarkIndex, shoulder: LandmarkIndex) -> bool {
        match (frame.get(wrist), frame.get(shoulder)) {
            (Some(w), Some(s)) => w.y < s.y - self.config.hand_raise_margin,
            _ => false,
        }
    }

    /// Shoulder tilt, with the threshold proportional to how far apart the
    /// shoulders appear so distance from the camera cancels out.
    fn lean(&self, frame: &PoseFrame) -> (bool, bool) {
        let (Some(ls), Some(rs)) = (
            frame.get(LandmarkIndex::LeftShoulder),
            frame.get(LandmarkIndex::RightShoulder),
        ) else {
            return (false, false);
        };
        let separation = (ls.x - rs.x).abs();
        if separation < 1e-3 {
            return (false, false);
        }
        let tilt = ls.y - rs.y;
        let threshold = self.config.lean_ratio * separation;
        (tilt > threshold, tilt < -threshold)
    }

    fn debounced_squat(&mut self, frame: &PoseFrame, hip_y: f32, now: Instant) -> bool {
        let raw = self.raw_squat(frame, hip_y);

        // Hysteresis: enter after the raw signal holds, leave after it clears.
        if raw {
            self.squat_clear_since = None;
            if !self.squat {
                let since = *self.squat_raw_since.get_or_insert(now);
                if now.duration_since(since) >= self.config.squat_hold {
                    self.squat = true;
                }
            }
        } else {
            self.squat_raw_since = None;
            if self.squat {
                let since = *self.squat_clear_since.get_or_insert(now);
                if now.duration_since(since) >= self.config.squat_release {
                    self.squat = false;
                }
            }
        }
        self.squat
    }

    fn raw_squat(&mut self, frame: &PoseFrame, hip_y: f32) -> bool {
        let standing = *self.standing_hip_y.get_or_insert(hip_y);
        let drop = hip_y - standing;

        let left = knee_angle(
            frame.get(LandmarkIndex::LeftHip),
            frame.get(LandmarkIndex::LeftKnee),
            frame.get(LandmarkIndex::LeftAnkle),
        );
        let right = knee_angle(
            frame.get(LandmarkIndex::RightHip),
            frame.get(LandmarkIndex::RightKnee),
            frame.get(LandmarkIndex::RightAnkle),
        );
        let mean_knee = (left + right) / 2.0;
        let min_knee = left.min(right);

        let raw = (drop > self.config.squat_hip_drop
            && mean_knee < self.config.squat_knee_bend_deg)
            || min_knee < self.config.squat_knee_strict_deg
            || drop > self.config.squat_large_hip_drop;

        // Track slow posture drift while clearly standing.
        if !raw && drop.abs() < self.config.standing_band {
            self.standing_hip_y = Some(standing + self.config.standing_adapt_rate * drop);
        }
        raw
    }

    fn forward(&mut self, state: GestureState, now: Instant) -> Option<GestureState> {
        if self.last_forwarded.as_ref() == Some(&state) {
            return None;
        }
        if !state.idle {
            if let Some(last) = self.last_non_idle_forward {
                if now.duration_since(last) < self.config.cooldown {
                    return None;
                }
            }
            self.last_non_idle_forward = Some(now);
        }
        self.last_forwarded = Some(state);
        Some(state)
    }
}

impl Default for GestureInterpreter {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

/// Interior angle at the knee between the thigh and shin, in degrees.
/// Defaults to a straight 180 when any landmark is missing or degenerate.
fn knee_angle(hip: Option<Landmark>, knee: Option<Landmark>, ankle: Option<Landmark>) -> f32 {
    let (Some(hip), Some(knee), Some(ankle)) = (hip, knee, ankle) else {
        return 180.0;
    };
    let v1 = (hip.x - knee.x, hip.y - knee.y);
    let v2 = (ankle.x - knee.x, ankle.y - knee.y);
    let n1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let n2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if n1 == 0.0 || n2 == 0.0 {
        return 180.0;
    }
    let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (n1 * n2)).clamp(-1.0, 1.0);
    cos.acos().to_degrees()
}
