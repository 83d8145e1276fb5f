//! Attribute recompute and hand-off.
//!
//! Aggregation recomputes [`FinalAttributes`] for every dirty entity but
//! leaves the marker in place. Propagation, registered right after it,
//! pushes the fresh values into the components other systems read and only
//! then clears the marker.

use horde_core::{EntityId, System, World};

use crate::attributes::{aggregate, AttributeKind, AttributesDirty, BaseAttributes, FinalAttributes, ModifierSet};
use crate::components::{Health, Magnet, Mover};
use crate::layers::capability;

use super::collect_ids;

/// Recomputes final attributes of dirty entities.
#[derive(Default)]
pub struct AttributeAggregationSystem {
    dirty: Vec<EntityId>,
}

impl AttributeAggregationSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for AttributeAggregationSystem {
    fn name(&self) -> &'static str {
        "attribute_aggregation"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[capability::FINAL_ATTRIBUTES]
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        collect_ids::<AttributesDirty>(world, &mut self.dirty);

        for &id in &self.dirty {
            let base = world.component_or_default::<BaseAttributes>(id);
            let result = match world.get_component::<ModifierSet>(id) {
                Some(set) => aggregate(&base.0, set),
                None => aggregate(&base.0, &ModifierSet::new()),
            };
            world.set_component(id, FinalAttributes(result));
        }

        if !self.dirty.is_empty() {
            tracing::trace!(count = self.dirty.len(), "attributes recomputed");
        }
    }
}

/// Pushes final attributes into movement, health and magnet components,
/// then clears the dirty marker.
#[derive(Default)]
pub struct AttributePropagationSystem {
    dirty: Vec<EntityId>,
}

impl AttributePropagationSystem {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl System for AttributePropagationSystem {
    fn name(&self) -> &'static str {
        "attribute_propagation"
    }

    fn provides(&self) -> &'static [&'static str] {
        &[capability::PROPAGATED_ATTRIBUTES]
    }

    fn requires(&self) -> &'static [&'static str] {
        &[capability::FINAL_ATTRIBUTES]
    }

    fn update(&mut self, world: &mut World, _dt: f32) {
        collect_ids::<AttributesDirty>(world, &mut self.dirty);

        for &id in &self.dirty {
            let Some(&FinalAttributes(attrs)) = world.get_component::<FinalAttributes>(id) else {
                // Not recomputed yet; keep the marker for next frame.
                continue;
            };

            if let Some(mover) = world.get_component_mut::<Mover>(id) {
                mover.speed = attrs.get(AttributeKind::MoveSpeed);
            }
            if let Some(magnet) = world.get_component_mut::<Magnet>(id) {
                magnet.radius = attrs.get(AttributeKind::Magnet);
            }
            if let Some(health) = world.get_component_mut::<Health>(id) {
                let max = attrs.get(AttributeKind::MaxHealth).max(0.0);
                health.current = if health.max > 0.0 {
                    health.current / health.max * max
                } else {
                    max
                };
                health.max = max;
            }

            world.remove_component::<AttributesDirty>(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{apply_modifier_source, Attributes, Modifier, SourceId};
    use approx::assert_relative_eq;

    fn player(world: &mut World) -> EntityId {
        let e = world.create_entity();
        world.add_component(e, BaseAttributes(Attributes::baseline()));
        world.add_component(e, Mover { speed: 0.0 });
        world.add_component(e, Health { current: 50.0, max: 100.0 });
        world.add_component(e, Magnet { radius: 0.0 });
        world.add_component(e, AttributesDirty);
        e
    }

    fn run_pair(world: &mut World) {
        world.register_system(AttributeAggregationSystem::new());
        world.register_system(AttributePropagationSystem::new());
    }

    #[test]
    fn test_dirty_entity_recomputed_and_propagated() {
        let mut world = World::new();
        run_pair(&mut world);
        let e = player(&mut world);
        world.update(0.016);

        assert!(!world.has_component::<AttributesDirty>(e));
        assert_relative_eq!(world.component_or_default::<Mover>(e).speed, 5.0);
        assert_relative_eq!(world.component_or_default::<Magnet>(e).radius, 1.5);
        let health = world.component_or_default::<Health>(e);
        assert_relative_eq!(health.max, 100.0);
        assert_relative_eq!(health.current, 50.0);
    }

    #[test]
    fn test_health_ratio_kept_on_max_change() {
        let mut world = World::new();
        run_pair(&mut world);
        let e = player(&mut world);
        world.update(0.016);

        let source = SourceId(7);
        apply_modifier_source(
            &mut world,
            e,
            source,
            [Modifier::mul(source, AttributeKind::MaxHealth, 1.0)],
        );
        world.update(0.016);

        let health = world.component_or_default::<Health>(e);
        assert_relative_eq!(health.max, 200.0);
        assert_relative_eq!(health.current, 100.0);
    }

    #[test]
    fn test_clean_entities_untouched() {
        let mut world = World::new();
        run_pair(&mut world);
        let e = player(&mut world);
        world.update(0.016);

        world.set_component(e, Mover { speed: 42.0 });
        world.update(0.016);
        assert_relative_eq!(world.component_or_default::<Mover>(e).speed, 42.0);
    }

    #[test]
    fn test_aggregation_alone_keeps_marker() {
        let mut world = World::new();
        world.register_system(AttributeAggregationSystem::new());
        let e = player(&mut world);
        world.update(0.016);

        assert!(world.has_component::<AttributesDirty>(e));
        assert!(world.has_component::<FinalAttributes>(e));
    }
}
