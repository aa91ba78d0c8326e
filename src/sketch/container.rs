//! The element a sketch renders into.

/// Surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Same size with each side at least one pixel, as GPU targets require.
    pub fn at_least_one(self) -> Self {
        Self {
            width: self.width.max(1),
            height: self.height.max(1),
        }
    }
}

/// Anything with a current layout size.
pub trait Container {
    /// Current (width, height) in pixels.
    fn size(&self) -> (u32, u32);

    fn dimensions(&self) -> Dimensions {
        let (width, height) = self.size();
        Dimensions { width, height }
    }
}

/// Container with a size set by the host, used for headless rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedContainer {
    width: u32,
    height: u32,
}

impl FixedContainer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Change the layout size; the sketch picks it up on its next `resize`.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl Container for FixedContainer {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
