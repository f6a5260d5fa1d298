//! Bounding boxes and the "card has left its container" test.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in container coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Horizontal span with zero height.
    pub fn span(left: f64, right: f64) -> Self {
        Self::new(left, 0.0, right, 0.0)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn translate_x(&self, dx: f64) -> Self {
        Self {
            left: self.left + dx,
            right: self.right + dx,
            ..*self
        }
    }

    /// True when the two boxes share no horizontal extent. Touching edges
    /// count as disjoint. Symmetric in its arguments.
    pub fn is_horizontally_disjoint(&self, other: &Rect) -> bool {
        other.left >= self.right || other.right <= self.left
    }
}

/// Measured geometry of a card at rest and its container.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardLayout {
    pub container: Rect,
    /// Card bounds at offset zero.
    pub card: Rect,
}

impl CardLayout {
    pub fn new(container: Rect, card: Rect) -> Self {
        Self { container, card }
    }

    /// Card of `card_width` horizontally centred in a container spanning
    /// `0..container_width`.
    pub fn centered(container_width: f64, card_width: f64) -> Self {
        let left = (container_width - card_width) / 2.0;
        Self {
            container: Rect::span(0.0, container_width),
            card: Rect::span(left, left + card_width),
        }
    }

    pub fn card_at(&self, offset: f64) -> Rect {
        self.card.translate_x(offset)
    }

    /// Whether the card displaced by `offset` has fully cleared the container.
    pub fn is_clear_at(&self, offset: f64) -> bool {
        self.container.is_horizontally_disjoint(&self.card_at(offset))
    }

    /// Magnitude of the offset a fling animates to.
    pub fn fly_away_distance(&self) -> f64 {
        self.container.width() / 2.0 + self.card.width() / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disjointness_is_symmetric() {
        let samples = [
            (Rect::span(0.0, 400.0), Rect::span(300.0, 400.0)),
            (Rect::span(0.0, 400.0), Rect::span(400.0, 500.0)),
            (Rect::span(0.0, 400.0), Rect::span(-100.0, 0.0)),
            (Rect::span(0.0, 400.0), Rect::span(-100.0, 1.0)),
            (Rect::span(10.0, 20.0), Rect::span(0.0, 400.0)),
            (Rect::span(-5.0, -1.0), Rect::span(3.0, 4.0)),
        ];
        for (a, b) in samples {
            assert_eq!(
                a.is_horizontally_disjoint(&b),
                b.is_horizontally_disjoint(&a),
                "{a:?} vs {b:?}"
            );
        }
    }

    #[test]
    fn clears_only_when_no_intersection_remains() {
        // Container 0..400, card 100 wide centred on the container's left edge.
        let layout = CardLayout::new(Rect::span(0.0, 400.0), Rect::span(-50.0, 50.0));
        assert!(!layout.is_clear_at(350.0)); // 300..400
        assert!(!layout.is_clear_at(360.0)); // 310..410
        assert!(layout.is_clear_at(450.0)); // 400..500
        assert!(layout.is_clear_at(-50.0)); // -100..0
        assert!(!layout.is_clear_at(-49.0));
    }

    #[test]
    fn fly_away_distance_clears_centered_card() {
        let layout = CardLayout::centered(640.0, 448.0);
        let d = layout.fly_away_distance();
        assert_eq!(d, 544.0);
        assert!(layout.is_clear_at(d));
        assert!(layout.is_clear_at(-d));
        assert!(!layout.is_clear_at(d - 1.0));
    }
}
