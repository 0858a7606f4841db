//! Proximity detection.

use std::collections::HashMap;
use std::sync::Arc;

use tessera_core::{CoreResult, EntityId, Radar, Tag, Transform, World};
use tessera_shared::Vec2;
use tracing::trace;

use super::Scheduler;
use crate::events::{EngineEvent, EventBus};

type Candidates = HashMap<Tag, Vec<(EntityId, Vec2)>>;

/// Finds, for each [`Radar`], the first entity carrying its target tag
/// within range.
///
/// The radar's centre is its owner's position plus [`Radar::offset`]; a
/// candidate's point is its position plus the system's target offset.
/// Candidates are scanned in ascending id order, so ties go to the lowest
/// id. Detections are published as [`EngineEvent::TargetDetected`] on the
/// calling thread once every chunk is back.
#[derive(Clone)]
pub struct RadarSystem {
    bus: EventBus,
    target_offset: Vec2,
}

impl RadarSystem {
    /// Creates a system publishing to `bus`.
    #[must_use]
    pub fn new(bus: EventBus, target_offset: Vec2) -> Self {
        Self { bus, target_offset }
    }

    /// Offset added to candidate positions.
    #[inline]
    #[must_use]
    pub const fn target_offset(&self) -> Vec2 {
        self.target_offset
    }

    /// Runs every radar once.
    ///
    /// # Returns
    ///
    /// `(radar, target)` pairs in ascending radar id order, as published.
    ///
    /// # Errors
    ///
    /// Pool failures; nothing is published in that case.
    pub fn update(
        &self,
        world: &World,
        scheduler: Scheduler<'_>,
    ) -> CoreResult<Vec<(EntityId, EntityId)>> {
        let radars: Vec<(EntityId, Vec2, Radar)> = world
            .with_component::<Radar>()
            .into_iter()
            .filter_map(|id| match world.components2::<Transform, Radar>(id) {
                (Some(t), Some(radar)) => Some((id, t.position, *radar)),
                _ => None,
            })
            .collect();
        if radars.is_empty() {
            return Ok(Vec::new());
        }

        let mut candidates = Candidates::new();
        for (_, _, radar) in &radars {
            candidates.entry(radar.target).or_insert_with(|| {
                world
                    .with_tag(radar.target)
                    .into_iter()
                    .filter_map(|id| {
                        world
                            .get_component::<Transform>(id)
                            .map(|t| (id, t.position))
                    })
                    .collect()
            });
        }
        let candidates = Arc::new(candidates);

        let target_offset = self.target_offset;
        let found = scheduler.map(radars, move |(owner, position, radar)| {
            let center = position + radar.offset;
            candidates.get(&radar.target).and_then(|list| {
                list.iter()
                    .find(|(id, pos)| {
                        *id != owner && (*pos + target_offset).distance(center) <= radar.radius
                    })
                    .map(|(id, _)| (owner, *id))
            })
        })?;

        let detections: Vec<(EntityId, EntityId)> = found.into_iter().flatten().collect();
        for &(radar, target) in &detections {
            trace!(%radar, %target, "target detected");
            self.bus.publish(EngineEvent::TargetDetected { radar, target });
        }
        Ok(detections)
    }
}
