//! # Component System
//!
//! Components are plain data with no behavior. Each component type gets its
//! own column in the world; presence of one type says nothing about another.

/// Marker trait for ECS components.
///
/// Components must be:
/// - `'static`: stored in a type-keyed registry
/// - `Default`: so copy-out reads can fall back to a default value
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Copy, Debug, Default)]
/// struct Health { current: f32, max: f32 }
///
/// impl Component for Health {}
/// ```
pub trait Component: Default + 'static {}

/// Position component for entities.
///
/// Represents a 2D position in world space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// X coordinate in world space.
    pub x: f32,
    /// Y coordinate in world space.
    pub y: f32,
}

impl Component for Position {}

impl Position {
    /// Creates a new position.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the squared distance to another position.
    ///
    /// This avoids the sqrt call for distance comparisons.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Returns the distance to another position.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Velocity component for entities.
///
/// Represents movement speed in world units per second.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity {
    /// X velocity component.
    pub x: f32,
    /// Y velocity component.
    pub y: f32,
}

impl Component for Velocity {}

impl Velocity {
    /// Creates a new velocity.
    #[inline]
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Velocity of length `speed` pointing from `from` towards `to`.
    ///
    /// Returns zero velocity when the points coincide.
    #[must_use]
    pub fn towards(from: Position, to: Position, speed: f32) -> Self {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            return Self::default();
        }
        Self::new(dx / len * speed, dy / len * speed)
    }
}
