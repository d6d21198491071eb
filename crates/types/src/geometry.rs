/// A bounding box measured relative to the top edge of the viewport.
///
/// Negative values lie above the visible area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ElementRect {
    pub top: f32,
    pub bottom: f32,
}

impl ElementRect {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn from_top(top: f32, height: f32) -> Self {
        Self {
            top,
            bottom: top + height,
        }
    }

    pub fn height(self) -> f32 {
        self.bottom - self.top
    }

    /// True when any part of the box is on screen.
    pub fn intersects(self, viewport: Viewport) -> bool {
        self.bottom > 0.0 && self.top < viewport.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub height: f32,
}

impl Viewport {
    pub fn new(height: f32) -> Self {
        Self { height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self { height: 800.0 }
    }
}
