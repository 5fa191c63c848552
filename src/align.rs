use serde::Deserialize;

/// Places the pattern's bounding box on the drawing surface.
pub trait Aligner {
    /// Pixel offset of the pattern's top-left corner. Offsets may be
    /// negative when the pattern is larger than the surface.
    fn offset(&self, pattern_w: f32, pattern_h: f32, surface_w: f32, surface_h: f32) -> (f32, f32);
}

/// Nine-anchor placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Alignment {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

impl Alignment {
    /// Horizontal and vertical anchor fractions (0 = start, 1 = end)
    fn anchors(self) -> (f32, f32) {
        match self {
            Self::TopLeft => (0.0, 0.0),
            Self::Top => (0.5, 0.0),
            Self::TopRight => (1.0, 0.0),
            Self::Left => (0.0, 0.5),
            Self::Center => (0.5, 0.5),
            Self::Right => (1.0, 0.5),
            Self::BottomLeft => (0.0, 1.0),
            Self::Bottom => (0.5, 1.0),
            Self::BottomRight => (1.0, 1.0),
        }
    }
}

impl Aligner for Alignment {
    fn offset(&self, pattern_w: f32, pattern_h: f32, surface_w: f32, surface_h: f32) -> (f32, f32) {
        let (ax, ay) = self.anchors();
        (
            ((surface_w - pattern_w) * ax).floor(),
            ((surface_h - pattern_h) * ay).floor(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centers_pattern() {
        assert_eq!(Alignment::Center.offset(40.0, 20.0, 100.0, 50.0), (30.0, 15.0));
    }

    #[test]
    fn corners() {
        assert_eq!(Alignment::TopLeft.offset(40.0, 20.0, 100.0, 50.0), (0.0, 0.0));
        assert_eq!(Alignment::BottomRight.offset(40.0, 20.0, 100.0, 50.0), (60.0, 30.0));
    }

    #[test]
    fn oversized_pattern_goes_negative() {
        let (x, _) = Alignment::Center.offset(120.0, 10.0, 100.0, 10.0);
        assert_eq!(x, -10.0);
    }
}
