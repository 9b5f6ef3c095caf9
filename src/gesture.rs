use serde::Serialize;

use crate::constants::{DRAG_TRANSITION, MIN_DRAG_TO_DISMISS, SNAP_BACK_TRANSITION};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum GestureState {
    Idle,
    Dragging { start_y: f64 },
    Dismissed,
}

/// Inline style of the swipeable view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ViewTransform {
    pub translate_y: Option<f64>,
    pub transition: Option<&'static str>,
}

impl ViewTransform {
    pub fn css_transform(&self) -> Option<String> {
        self.translate_y
            .map(|y| format!("translate3d(0,{}px,0)", y))
    }
}

/// What a touch end resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    SnappedBack,
    Dismissed,
}

/// Tracks one vertical drag on the detail view. Only the first touch point
/// of each event is looked at, and a second touch start during a drag is
/// ignored.
#[derive(Debug, Clone, Serialize)]
pub struct SwipeDismiss {
    state: GestureState,
    transform: ViewTransform,
    #[serde(skip)]
    threshold: f64,
}

impl Default for SwipeDismiss {
    fn default() -> Self {
        Self::with_threshold(MIN_DRAG_TO_DISMISS)
    }
}

impl SwipeDismiss {
    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            state: GestureState::Idle,
            transform: ViewTransform::default(),
            threshold,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn touch_start(&mut self, y: f64) {
        if matches!(self.state, GestureState::Dragging { .. }) {
            return;
        }
        self.state = GestureState::Dragging { start_y: y };
        self.transform.transition = Some(DRAG_TRANSITION);
    }

    /// Follow the finger downwards; upward movement pins the view in place.
    pub fn touch_move(&mut self, y: f64) {
        if let GestureState::Dragging { start_y } = self.state {
            self.transform.translate_y = Some((y - start_y).max(0.0));
        }
    }

    pub fn touch_end(&mut self, y: f64) -> Option<SwipeOutcome> {
        let GestureState::Dragging { start_y } = self.state else {
            return None;
        };

        self.transform.translate_y = None;
        self.transform.transition = Some(SNAP_BACK_TRANSITION);

        if y - start_y > self.threshold {
            self.state = GestureState::Dismissed;
            Some(SwipeOutcome::Dismissed)
        } else {
            self.state = GestureState::Idle;
            Some(SwipeOutcome::SnappedBack)
        }
    }

    /// Back to idle, e.g. when the view is shown again
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.transform.translate_y = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(distance: f64) -> (SwipeDismiss, Option<SwipeOutcome>) {
        let mut swipe = SwipeDismiss::default();
        swipe.touch_start(100.0);
        swipe.touch_move(100.0 + distance / 2.0);
        swipe.touch_move(100.0 + distance);
        let outcome = swipe.touch_end(100.0 + distance);
        (swipe, outcome)
    }

    #[test]
    fn short_drag_snaps_back() {
        let (swipe, outcome) = drag(150.0);
        assert_eq!(outcome, Some(SwipeOutcome::SnappedBack));
        assert_eq!(swipe.state(), GestureState::Idle);
        assert_eq!(swipe.transform().translate_y, None);
        assert_eq!(swipe.transform().transition, Some("transform .2s"));
    }

    #[test]
    fn long_drag_dismisses() {
        let (swipe, outcome) = drag(250.0);
        assert_eq!(outcome, Some(SwipeOutcome::Dismissed));
        assert_eq!(swipe.state(), GestureState::Dismissed);
    }

    #[test]
    fn exactly_threshold_does_not_dismiss() {
        let (_, outcome) = drag(200.0);
        assert_eq!(outcome, Some(SwipeOutcome::SnappedBack));
    }

    #[test]
    fn dragging_up_is_clamped_at_zero() {
        let mut swipe = SwipeDismiss::default();
        swipe.touch_start(300.0);
        swipe.touch_move(120.0);
        assert_eq!(swipe.transform().translate_y, Some(0.0));
        assert_eq!(swipe.transform().transition, Some("transform .015s"));

        swipe.touch_move(340.0);
        assert_eq!(swipe.transform().css_transform().as_deref(), Some("translate3d(0,40px,0)"));
    }

    #[test]
    fn second_touch_start_keeps_first_origin() {
        let mut swipe = SwipeDismiss::default();
        swipe.touch_start(0.0);
        swipe.touch_start(200.0);
        assert_eq!(swipe.state(), GestureState::Dragging { start_y: 0.0 });
        assert_eq!(swipe.touch_end(260.0), Some(SwipeOutcome::Dismissed));
    }

    #[test]
    fn move_and_end_without_start_are_ignored() {
        let mut swipe = SwipeDismiss::default();
        swipe.touch_move(500.0);
        assert_eq!(swipe.transform().translate_y, None);
        assert_eq!(swipe.touch_end(500.0), None);
        assert_eq!(swipe.state(), GestureState::Idle);
    }
}
