//! Path following, proximity sensing and camera targeting.

use std::collections::VecDeque;

use tessera_shared::constants::DEFAULT_RADAR_RADIUS;
use tessera_shared::Vec2;

use crate::ecs::Tag;

/// Ordered list of points an entity walks through.
///
/// `direction` caches the normalized heading toward the front point. A zero
/// direction means "recompute on the next tick".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Waypoint {
    /// Remaining points, front first.
    pub points: VecDeque<Vec2>,
    /// Cached heading toward `points.front()`.
    pub direction: Vec2,
}

impl Waypoint {
    /// Path with a single point.
    #[must_use]
    pub fn to(point: Vec2) -> Self {
        Self::through([point])
    }

    /// Path through the given points, in order.
    #[must_use]
    pub fn through(points: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            points: points.into_iter().collect(),
            direction: Vec2::ZERO,
        }
    }

    /// Appends a point to the end of the path.
    pub fn add_point(&mut self, point: Vec2) {
        self.points.push_back(point);
    }

    /// Current target, if any.
    #[inline]
    #[must_use]
    pub fn current(&self) -> Option<Vec2> {
        self.points.front().copied()
    }

    /// Returns true once every point has been reached.
    #[inline]
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.points.is_empty()
    }
}

/// Proximity sensor. Detections are published as events by the radar system.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Radar {
    /// Detection radius.
    pub radius: f32,
    /// Primary tag a candidate must carry.
    pub target: Tag,
    /// Offset of the sensor centre from the owner's position.
    pub offset: Vec2,
}

impl Radar {
    /// Radar with the given radius, looking for enemies.
    #[must_use]
    pub const fn new(radius: f32) -> Self {
        Self {
            radius,
            target: Tag::Enemy,
            offset: Vec2::ZERO,
        }
    }

    /// Changes the target tag.
    #[must_use]
    pub const fn targeting(mut self, target: Tag) -> Self {
        self.target = target;
        self
    }

    /// Changes the sensor offset.
    #[must_use]
    pub const fn with_offset(mut self, offset: Vec2) -> Self {
        self.offset = offset;
        self
    }
}

impl Default for Radar {
    fn default() -> Self {
        Self::new(DEFAULT_RADAR_RADIUS)
    }
}

/// Marks the entity the camera keeps centred.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CameraFollow;
