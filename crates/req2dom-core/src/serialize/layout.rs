use crate::config::LayoutConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Next free slot of one diagram. Created per serialization call and
/// threaded through explicitly, never stored on the serializer.
#[derive(Debug, Clone)]
pub struct LayoutCursor {
    layout: LayoutConfig,
    next_y: u32,
}

impl LayoutCursor {
    #[must_use]
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            next_y: layout.origin_y,
            layout,
        }
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Height of a class box listing `rows` attributes.
    #[must_use]
    pub fn class_height(&self, rows: usize) -> u32 {
        let rows = u32::try_from(rows).unwrap_or(u32::MAX);
        self.layout
            .header_height
            .saturating_add(self.layout.row_height.saturating_mul(rows))
    }

    /// Reserves the next vertical slot for a box of the given height.
    pub fn place(&mut self, height: u32) -> Geometry {
        let geometry = Geometry {
            x: self.layout.origin_x,
            y: self.next_y,
            width: self.layout.vertex_width,
            height,
        };
        self.next_y = self
            .next_y
            .saturating_add(height)
            .saturating_add(self.layout.spacing);
        geometry
    }

    /// Geometry of the `index`-th attribute row, relative to its class box.
    #[must_use]
    pub fn row(&self, index: usize) -> Geometry {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        Geometry {
            x: 0,
            y: self
                .layout
                .header_height
                .saturating_add(self.layout.row_height.saturating_mul(index)),
            width: self.layout.vertex_width,
            height: self.layout.row_height,
        }
    }
}
