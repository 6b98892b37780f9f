use egui::{Pos2, Rect, Vec2};

/// Scroll velocity (points per second, `+y` scrolls down) for a pointer at `pointer` inside
/// `viewport`.
///
/// Zero unless the pointer is within `margin` of the top or bottom edge; grows linearly to
/// `max_speed` at the edge itself (and beyond it).
pub(crate) fn edge_scroll_velocity(pointer: Pos2, viewport: Rect, margin: f32, max_speed: f32) -> Vec2 {
    if margin <= 0.0 || max_speed <= 0.0 || !viewport.is_positive() {
        return Vec2::ZERO;
    }
    if pointer.x < viewport.min.x || pointer.x > viewport.max.x {
        return Vec2::ZERO;
    }

    let margin = margin.min(viewport.height() * 0.5);
    let from_top = pointer.y - viewport.min.y;
    let from_bottom = viewport.max.y - pointer.y;

    let speed = |distance: f32| max_speed * ((margin - distance) / margin).clamp(0.0, 1.0);

    if from_top < margin {
        Vec2::new(0.0, -speed(from_top))
    } else if from_bottom < margin {
        Vec2::new(0.0, speed(from_bottom))
    } else {
        Vec2::ZERO
    }
}

/// Frame-driven auto-scroll while a drag is active.
///
/// The host calls [`Self::frame`] once per animation frame; the returned delta is how far to
/// scroll the form this frame. The loop stops (and forgets its clock) as soon as no drag is
/// active.
#[derive(Debug, Default)]
pub(crate) struct AutoScroller {
    last_frame: Option<f64>,
}

impl AutoScroller {
    pub(crate) fn frame(
        &mut self,
        now: f64,
        dragging: bool,
        pointer: Option<Pos2>,
        viewport: Option<Rect>,
        margin: f32,
        max_speed: f32,
    ) -> Vec2 {
        if !dragging {
            self.last_frame = None;
            return Vec2::ZERO;
        }

        let dt = self
            .last_frame
            .map(|last| (now - last).clamp(0.0, 0.1) as f32)
            .unwrap_or(0.0);
        self.last_frame = Some(now);

        let (Some(pointer), Some(viewport)) = (pointer, viewport) else {
            return Vec2::ZERO;
        };
        edge_scroll_velocity(pointer, viewport, margin, max_speed) * dt
    }

    pub(crate) fn stop(&mut self) {
        self.last_frame = None;
    }
}
