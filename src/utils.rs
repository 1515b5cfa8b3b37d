use std::fmt::{Debug, Formatter};

use cgmath::{BaseNum, Point2, Vector2};

//////////
// RECT //
//////////

/// An axis-aligned rectangular region in 2D space.  `min` is the top-left corner and `max` is the
/// (exclusive) bottom-right corner, so the y axis points downwards like it does in every image
/// format we read.
// Invariant: max.x >= min.x && max.y >= min.y
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect<S> {
    min: Point2<S>,
    max: Point2<S>,
}

impl<S: BaseNum> Rect<S> {
    /// Creates a [`Rect`] with a given size and where the minimum corner is the origin (i.e.
    /// `(0, 0)`)
    pub fn from_origin(width: S, height: S) -> Self {
        Self {
            min: Point2::new(S::zero(), S::zero()),
            max: Point2::new(width, height),
        }
    }

    pub fn from_min_size(min: Point2<S>, size: Vector2<S>) -> Self {
        Self {
            min,
            max: min + size,
        }
    }

    /// Creates a [`Rect`] from its four edges.  Inverted edges (e.g. `right < left`) collapse to
    /// an empty `Rect` sitting on the `left`/`top` edge.
    pub fn from_ltrb(left: S, top: S, right: S, bottom: S) -> Self {
        Self {
            min: Point2::new(left, top),
            max: Point2::new(partial_max(left, right), partial_max(top, bottom)),
        }
    }

    pub fn left(&self) -> S {
        self.min.x
    }

    pub fn top(&self) -> S {
        self.min.y
    }

    pub fn right(&self) -> S {
        self.max.x
    }

    pub fn bottom(&self) -> S {
        self.max.y
    }

    pub fn min(&self) -> Point2<S> {
        self.min
    }

    pub fn width(&self) -> S {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> S {
        self.max.y - self.min.y
    }

    pub fn is_empty(&self) -> bool {
        self.width() == S::zero() || self.height() == S::zero()
    }
}

impl Rect<i32> {
    /// The size of this `Rect` in pixels, or `None` if its edges are too far apart for the size
    /// to be computed without overflowing
    pub fn pixel_size(&self) -> Option<Vector2<u32>> {
        let width = self.max.x.checked_sub(self.min.x)?;
        let height = self.max.y.checked_sub(self.min.y)?;
        Some(Vector2::new(width as u32, height as u32))
    }
}

impl<S: PartialOrd + Copy> Rect<S> {
    pub fn intersection(self, other: Self) -> Self {
        let min_x = partial_max(self.min.x, other.min.x);
        let min_y = partial_max(self.min.y, other.min.y);
        let max_x = partial_min(self.max.x, other.max.x);
        let max_y = partial_min(self.max.y, other.max.y);
        Self {
            min: Point2::new(min_x, min_y),
            // Disjoint rects produce an empty (rather than inverted) intersection
            max: Point2::new(partial_max(min_x, max_x), partial_max(min_y, max_y)),
        }
    }

    /// Computes the smallest `Rect` to contain both `self` and `other`
    pub fn union(self, other: Self) -> Self {
        let min_x = partial_min(self.min.x, other.min.x);
        let min_y = partial_min(self.min.y, other.min.y);
        let max_x = partial_max(self.max.x, other.max.x);
        let max_y = partial_max(self.max.y, other.max.y);
        Self {
            min: Point2::new(min_x, min_y),
            max: Point2::new(max_x, max_y),
        }
    }

    /// Returns `true` if every point of `other` is also inside `self`
    pub fn contains(&self, other: &Self) -> bool {
        self.min.x <= other.min.x
            && self.min.y <= other.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }
}

impl<S: Debug> Debug for Rect<S> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Rect(({:?}, {:?}) - ({:?}, {:?}))",
            self.min.x, self.min.y, self.max.x, self.max.y
        )
    }
}

fn partial_max<S: PartialOrd>(x: S, y: S) -> S {
    if x < y {
        y
    } else {
        x
    }
}

fn partial_min<S: PartialOrd>(x: S, y: S) -> S {
    if x < y {
        x
    } else {
        y
    }
}
