//! Interaction bindings - which gesture drives which command category
//!
//! A binding names a gesture id per category (movement, rotation, drop).
//! Known ids map straight to a handler. Unknown ids never fail: a keyword
//! heuristic classifies the id into a category and the category's default
//! handler takes over, so a stale or misspelled profile still plays.

use pose_tetris_types::InputCategory;

use crate::handlers::GestureHandler;

/// Gesture ids per command category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionBinding {
    pub movement: String,
    pub rotation: String,
    pub drop: String,
}

impl Default for InteractionBinding {
    fn default() -> Self {
        Self {
            movement: "lean".to_string(),
            rotation: "raise-hand".to_string(),
            drop: "raise-both-hands".to_string(),
        }
    }
}

impl InteractionBinding {
    /// Resolve the handler for a category.
    pub fn handler(&self, category: InputCategory) -> GestureHandler {
        let id = match category {
            InputCategory::Movement => &self.movement,
            InputCategory::Rotation => &self.rotation,
            InputCategory::Drop => &self.drop,
        };
        resolve_id(id)
    }
}

/// Fallback handler when an id cannot be resolved directly.
fn default_handler(category: InputCategory) -> GestureHandler {
    match category {
        InputCategory::Movement => GestureHandler::LeanStep,
        InputCategory::Rotation => GestureHandler::SingleHandRotate,
        InputCategory::Drop => GestureHandler::BothHandsDrop,
    }
}

/// Map a gesture id to a handler. Known ids are authoritative regardless of
/// the slot they appear in; anything else degrades through
/// [`classify_id`] to a category default.
pub fn resolve_id(id: &str) -> GestureHandler {
    match id {
        "lean" => GestureHandler::LeanStep,
        "step" | "jump" | "raise-foot" => GestureHandler::HipTrack,
        "raise-hand" => GestureHandler::SingleHandRotate,
        "raise-both-hands" | "raise-both" => GestureHandler::BothHandsDrop,
        "drop" | "squat" => GestureHandler::SquatDrop,
        other => default_handler(classify_id(other)),
    }
}

/// Best-effort category for an unknown gesture id.
pub fn classify_id(id: &str) -> InputCategory {
    let id = id.to_lowercase();
    if id.contains("raise") && id.contains("both") {
        return InputCategory::Drop;
    }
    if id.contains("raise") || id.contains("rotate") || id.contains("hand") {
        return InputCategory::Rotation;
    }
    if ["step", "lean", "jump", "squat", "foot"]
        .iter()
        .any(|kw| id.contains(kw))
    {
        return InputCategory::Movement;
    }
    InputCategory::Movement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_binding_handlers() {
        let binding = InteractionBinding::default();
        assert_eq!(binding.handler(InputCategory::Movement), GestureHandler::LeanStep);
        assert_eq!(
            binding.handler(InputCategory::Rotation),
            GestureHandler::SingleHandRotate
        );
        assert_eq!(binding.handler(InputCategory::Drop), GestureHandler::BothHandsDrop);
    }

    #[test]
    fn test_known_ids_map_directly() {
        assert_eq!(resolve_id("step"), GestureHandler::HipTrack);
        assert_eq!(resolve_id("squat"), GestureHandler::SquatDrop);
        assert_eq!(resolve_id("raise-both"), GestureHandler::BothHandsDrop);
        // A known id wins even in a surprising slot.
        let binding = InteractionBinding {
            movement: "squat".to_string(),
            ..InteractionBinding::default()
        };
        assert_eq!(
            binding.handler(InputCategory::Movement),
            GestureHandler::SquatDrop
        );
    }

    #[test]
    fn test_unknown_ids_classify_by_keyword() {
        assert_eq!(classify_id("raise-both-arms"), InputCategory::Drop);
        assert_eq!(classify_id("raise-left-arm"), InputCategory::Rotation);
        assert_eq!(classify_id("wave-hand"), InputCategory::Rotation);
        assert_eq!(classify_id("side-step-fast"), InputCategory::Movement);
        assert_eq!(classify_id("LEAN-HARD"), InputCategory::Movement);
        assert_eq!(classify_id("mystery"), InputCategory::Movement);
    }

    #[test]
    fn test_unknown_id_degrades_to_classified_default() {
        assert_eq!(resolve_id("wave-hand"), GestureHandler::SingleHandRotate);
        assert_eq!(resolve_id("raise-both-arms"), GestureHandler::BothHandsDrop);
        assert_eq!(resolve_id("mystery"), GestureHandler::LeanStep);
    }
}
