use serde::{Deserialize, Serialize};

/// BoundingBox represents an axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left of the bounding box (i.e. min-x)
    left: i32,
    /// Top of the bounding box (i.e. min-y)
    top: i32,
    /// Right of the bounding box (i.e. max-x)
    right: i32,
    /// Bottom of the bounding box (i.e. max-y)
    bottom: i32,
}

/// Center-point displacement between two observations of the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: i32,
    pub dy: i32,
}

impl Velocity {
    pub fn new(dx: i32, dy: i32) -> Velocity {
        Velocity { dx, dy }
    }

    /// Returns the euclidean magnitude of the displacement
    pub fn magnitude(&self) -> f32 {
        (self.dx as f32).hypot(self.dy as f32)
    }
}

impl BoundingBox {
    /// Returns a new BoundingBox
    ///
    /// # Parameters
    ///
    /// * `left`: Bounding box left.
    /// * `top`: Bounding box top.
    /// * `right`: Bounding box right.
    /// * `bottom`: Bounding box bottom.
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> BoundingBox {
        BoundingBox {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Returns the left of the bounding box
    pub fn left(&self) -> i32 {
        self.left
    }

    /// Returns the top of the bounding box
    pub fn top(&self) -> i32 {
        self.top
    }

    /// Returns the right of the bounding box
    pub fn right(&self) -> i32 {
        self.right
    }

    /// Returns the bottom of the bounding box
    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    /// Returns the width of the bounding box. Negative for inverted boxes.
    pub fn width(&self) -> i64 {
        self.right as i64 - self.left as i64
    }

    /// Returns the height of the bounding box. Negative for inverted boxes.
    pub fn height(&self) -> i64 {
        self.bottom as i64 - self.top as i64
    }

    /// Returns the area of the bounding box, or zero if either side is not positive.
    ///
    /// Each side is below `2^32`, so the product always fits in a `u64`.
    pub fn area(&self) -> u64 {
        let (width, height) = (self.width(), self.height());
        if width <= 0 || height <= 0 {
            0
        } else {
            width as u64 * height as u64
        }
    }

    /// Returns the integer center x of the bounding box
    pub fn center_x(&self) -> i32 {
        ((self.left as i64 + self.right as i64) / 2) as i32
    }

    /// Returns the integer center y of the bounding box
    pub fn center_y(&self) -> i32 {
        ((self.top as i64 + self.bottom as i64) / 2) as i32
    }

    /// Returns true if the box has no positive area.
    pub fn is_degenerate(&self) -> bool {
        self.area() == 0
    }

    /// Returns a copy of the bounding box moved by `(dx, dy)`. Edges saturate at the `i32` range.
    pub fn translate(&self, dx: i32, dy: i32) -> BoundingBox {
        BoundingBox::new(
            self.left.saturating_add(dx),
            self.top.saturating_add(dy),
            self.right.saturating_add(dx),
            self.bottom.saturating_add(dy),
        )
    }

    /// Returns the bounding box in top-left, bottom-right format, i.e., `(min x, min y, max x, max y)`.
    pub fn to_tlbr(&self) -> [i32; 4] {
        [self.left, self.top, self.right, self.bottom]
    }

    /// Returns the bounding box in left, top, width, height format, i.e., `(min x, min y, width, height)`.
    pub fn to_tlwh(&self) -> [i64; 4] {
        [
            self.left as i64,
            self.top as i64,
            self.width(),
            self.height(),
        ]
    }
}
