//! Plain geometry for the viewer
//!
//! All values are in abstract gesture units. The terminal front-end converts
//! cell coordinates into these units using the configured cell size.

/// A point in gesture units
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

/// Width and height in gesture units
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn scaled(self, factor: f32) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }

    pub fn center(self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Largest size with this aspect ratio that fits inside `container`
    pub fn fit_within(self, container: Size) -> Size {
        if self.is_empty() || container.is_empty() {
            return container;
        }
        let ratio = (container.width / self.width).min(container.height / self.height);
        self.scaled(ratio)
    }
}

/// Translation of the content center relative to the container center
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub x: f32,
    pub y: f32,
}

impl Offset {
    pub const ZERO: Offset = Offset { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn scaled(self, factor: f32) -> Offset {
        Offset::new(self.x * factor, self.y * factor)
    }

    pub fn translated(self, dx: f32, dy: f32) -> Offset {
        Offset::new(self.x + dx, self.y + dy)
    }
}

/// Container and content sizes the pan offset is clamped against
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bounds {
    /// Visible area hosting the page
    pub container: Size,
    /// Page size at scale 1.0 (fitted into the container)
    pub content: Size,
}

impl Bounds {
    pub fn new(container: Size, content: Size) -> Self {
        Self { container, content }
    }

    /// Content size at scale 1.0, falling back to the container while unknown
    pub fn base_content(&self) -> Size {
        if self.content.is_empty() {
            self.container
        } else {
            self.content
        }
    }

    /// Largest absolute offset per axis at the given scale
    pub fn max_offset(&self, scale: f32) -> Offset {
        if scale <= 1.0 {
            return Offset::ZERO;
        }
        let content = self.base_content().scaled(scale);
        Offset::new(
            ((content.width - self.container.width) / 2.0).max(0.0),
            ((content.height - self.container.height) / 2.0).max(0.0),
        )
    }

    /// Clamp an offset so no gap opens between content and container edges
    pub fn clamp_offset(&self, offset: Offset, scale: f32) -> Offset {
        let max = self.max_offset(scale);
        Offset::new(
            clamp_axis(offset.x, max.x),
            clamp_axis(offset.y, max.y),
        )
    }
}

fn clamp_axis(value: f32, max: f32) -> f32 {
    if !value.is_finite() || max <= 0.0 {
        0.0
    } else {
        value.clamp(-max, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_to(b), 5.0);
        assert_eq!(a.midpoint(b), Point::new(1.5, 2.0));
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        let page = Size::new(600.0, 800.0);
        let fitted = page.fit_within(Size::new(400.0, 400.0));
        assert_eq!(fitted, Size::new(300.0, 400.0));
    }

    #[test]
    fn offset_snaps_to_zero_when_not_zoomed() {
        let bounds = Bounds::new(Size::new(400.0, 300.0), Size::new(400.0, 300.0));
        let clamped = bounds.clamp_offset(Offset::new(50.0, -20.0), 1.0);
        assert_eq!(clamped, Offset::ZERO);
        let clamped = bounds.clamp_offset(Offset::new(50.0, -20.0), 0.5);
        assert_eq!(clamped, Offset::ZERO);
    }

    #[test]
    fn offset_clamped_to_overflow_when_zoomed() {
        let bounds = Bounds::new(Size::new(400.0, 300.0), Size::new(400.0, 300.0));
        // At 2x the content is 800x600, so it can move 200 / 150 each way
        let clamped = bounds.clamp_offset(Offset::new(500.0, -500.0), 2.0);
        assert_eq!(clamped, Offset::new(200.0, -150.0));
        let inside = bounds.clamp_offset(Offset::new(10.0, 10.0), 2.0);
        assert_eq!(inside, Offset::new(10.0, 10.0));
    }

    #[test]
    fn narrow_content_cannot_pan_on_short_axis() {
        // Portrait page fitted into a wide container
        let bounds = Bounds::new(Size::new(800.0, 400.0), Size::new(300.0, 400.0));
        let clamped = bounds.clamp_offset(Offset::new(100.0, 100.0), 1.5);
        assert_eq!(clamped.x, 0.0);
        assert_eq!(clamped.y, 100.0);
    }

    #[test]
    fn non_finite_offset_is_reset() {
        let bounds = Bounds::new(Size::new(400.0, 300.0), Size::default());
        let clamped = bounds.clamp_offset(Offset::new(f32::NAN, f32::INFINITY), 2.0);
        assert_eq!(clamped, Offset::ZERO);
    }
}
