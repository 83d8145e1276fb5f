//! # Attribute Modifier Aggregation
//!
//! Every character carries a [`BaseAttributes`] record and an unordered
//! [`ModifierSet`]. When either changes, the entity is marked with
//! [`AttributesDirty`] and the aggregation system recomputes its
//! [`FinalAttributes`]:
//!
//! ```text
//! final = (base + Σ additive) × (1 + Σ multiplicative)
//! ```
//!
//! Additive and multiplicative contributions are summed separately before
//! the combine, so the order modifiers were added in never matters.
//!
//! ## Sources
//!
//! Every modifier belongs to a [`SourceId`] (an item, a passive, a buff).
//! Re-applying a source replaces all of its previous modifiers, so
//! "upgrade passive X to level 3" can be re-sent any number of times.

use horde_core::{Component, EntityId, World};

// ============================================================================
// ATTRIBUTES
// ============================================================================

/// Derived character attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Maximum health.
    MaxHealth,
    /// Movement speed, world units per second.
    MoveSpeed,
    /// Damage multiplier.
    Might,
    /// Hitbox size multiplier.
    Area,
    /// Weapon interval multiplier (lower fires faster).
    Cooldown,
    /// Projectile speed multiplier.
    ProjectileSpeed,
    /// Orbit duration multiplier.
    Duration,
    /// Pickup attraction radius.
    Magnet,
    /// Flat reduction of incoming contact damage.
    Armor,
    /// Health regenerated per second.
    Recovery,
}

impl AttributeKind {
    /// Number of attribute kinds.
    pub const COUNT: usize = 10;

    /// Every kind, in record order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::MaxHealth,
        Self::MoveSpeed,
        Self::Might,
        Self::Area,
        Self::Cooldown,
        Self::ProjectileSpeed,
        Self::Duration,
        Self::Magnet,
        Self::Armor,
        Self::Recovery,
    ];

    #[inline]
    const fn index(self) -> usize {
        self as usize
    }
}

/// A full set of attribute values.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Attributes {
    values: [f32; AttributeKind::COUNT],
}

impl Attributes {
    /// Player starting values: neutral multipliers, 100 health, speed 5.
    #[must_use]
    pub fn baseline() -> Self {
        let mut attrs = Self::default();
        attrs.set(AttributeKind::MaxHealth, 100.0);
        attrs.set(AttributeKind::MoveSpeed, 5.0);
        attrs.set(AttributeKind::Might, 1.0);
        attrs.set(AttributeKind::Area, 1.0);
        attrs.set(AttributeKind::Cooldown, 1.0);
        attrs.set(AttributeKind::ProjectileSpeed, 1.0);
        attrs.set(AttributeKind::Duration, 1.0);
        attrs.set(AttributeKind::Magnet, 1.5);
        attrs
    }

    /// Value of one attribute.
    #[inline]
    #[must_use]
    pub const fn get(&self, kind: AttributeKind) -> f32 {
        self.values[kind.index()]
    }

    /// Overwrites one attribute.
    #[inline]
    pub fn set(&mut self, kind: AttributeKind, value: f32) {
        self.values[kind.index()] = value;
    }

    /// Builder-style [`Attributes::set`].
    #[inline]
    #[must_use]
    pub fn with(mut self, kind: AttributeKind, value: f32) -> Self {
        self.set(kind, value);
        self
    }
}

/// Authored attribute values. Rarely mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseAttributes(pub Attributes);

impl Default for BaseAttributes {
    fn default() -> Self {
        Self(Attributes::baseline())
    }
}

impl Component for BaseAttributes {}

/// Aggregated attribute values. Written only by the aggregation system.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FinalAttributes(pub Attributes);

impl Component for FinalAttributes {}

/// Marks an entity whose final attributes must be recomputed this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttributesDirty;

impl Component for AttributesDirty {}

// ============================================================================
// MODIFIERS
// ============================================================================

/// Identifies what granted a modifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u32);

/// How a modifier combines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierOp {
    /// Added to the base value.
    Additive,
    /// Summed into the `(1 + Σ)` factor.
    Multiplicative,
}

/// One contribution to a derived attribute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Modifier {
    /// What granted it.
    pub source: SourceId,
    /// Attribute affected.
    pub attribute: AttributeKind,
    /// Combine rule.
    pub op: ModifierOp,
    /// Amount.
    pub value: f32,
}

impl Modifier {
    /// Additive modifier.
    #[must_use]
    pub const fn add(source: SourceId, attribute: AttributeKind, value: f32) -> Self {
        Self {
            source,
            attribute,
            op: ModifierOp::Additive,
            value,
        }
    }

    /// Multiplicative modifier.
    #[must_use]
    pub const fn mul(source: SourceId, attribute: AttributeKind, value: f32) -> Self {
        Self {
            source,
            attribute,
            op: ModifierOp::Multiplicative,
            value,
        }
    }
}

/// Unordered per-entity modifier collection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifierSet {
    modifiers: Vec<Modifier>,
}

impl Component for ModifierSet {}

impl ModifierSet {
    /// Creates an empty set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            modifiers: Vec::new(),
        }
    }

    /// Replaces every modifier of `source` with `modifiers`.
    ///
    /// Each inserted modifier is stamped with `source`, whatever it carried.
    pub fn apply_source(&mut self, source: SourceId, modifiers: impl IntoIterator<Item = Modifier>) {
        self.remove_source(source);
        self.modifiers
            .extend(modifiers.into_iter().map(|m| Modifier { source, ..m }));
    }

    /// Removes every modifier of `source`. Returns how many were removed.
    pub fn remove_source(&mut self, source: SourceId) -> usize {
        let before = self.modifiers.len();
        self.modifiers.retain(|m| m.source != source);
        before - self.modifiers.len()
    }

    /// Number of modifiers.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    /// True when the set holds no modifier.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    /// Iterates over all modifiers.
    pub fn iter(&self) -> impl Iterator<Item = &Modifier> {
        self.modifiers.iter()
    }
}

// ============================================================================
// AGGREGATION
// ============================================================================

/// Computes final attributes from a base record and a modifier set.
#[must_use]
pub fn aggregate(base: &Attributes, modifiers: &ModifierSet) -> Attributes {
    let mut additive = [0.0f32; AttributeKind::COUNT];
    let mut multiplicative = [0.0f32; AttributeKind::COUNT];

    for m in modifiers.iter().filter(|m| m.op == ModifierOp::Additive) {
        additive[m.attribute.index()] += m.value;
    }
    for m in modifiers.iter().filter(|m| m.op == ModifierOp::Multiplicative) {
        multiplicative[m.attribute.index()] += m.value;
    }

    let mut result = Attributes::default();
    for kind in AttributeKind::ALL {
        let i = kind.index();
        result.set(kind, (base.get(kind) + additive[i]) * (1.0 + multiplicative[i]));
    }
    result
}

/// Replaces `source`'s modifiers on `entity` and marks it dirty.
///
/// Returns false (and changes nothing) when the entity is not live.
pub fn apply_modifier_source(
    world: &mut World,
    entity: EntityId,
    source: SourceId,
    modifiers: impl IntoIterator<Item = Modifier>,
) -> bool {
    if !world.is_alive(entity) {
        tracing::warn!(%entity, source = source.0, "modifier source applied to non-live entity");
        return false;
    }
    let mut set = world.remove_component::<ModifierSet>(entity).unwrap_or_default();
    set.apply_source(source, modifiers);
    world.add_component(entity, set);
    world.add_component(entity, AttributesDirty)
}

/// Removes `source`'s modifiers from `entity` and marks it dirty.
///
/// Returns how many modifiers were removed.
pub fn remove_modifier_source(world: &mut World, entity: EntityId, source: SourceId) -> usize {
    let removed = world
        .get_component_mut::<ModifierSet>(entity)
        .map_or(0, |set| set.remove_source(source));
    if removed > 0 {
        world.add_component(entity, AttributesDirty);
    }
    removed
}

/// Reads a final attribute, falling back to `fallback` for entities that
/// do not aggregate attributes.
#[must_use]
pub fn final_attribute(world: &World, entity: EntityId, kind: AttributeKind, fallback: f32) -> f32 {
    world
        .get_component::<FinalAttributes>(entity)
        .map_or(fallback, |f| f.0.get(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SPINACH: SourceId = SourceId(1);
    const ARMOR_RING: SourceId = SourceId(2);

    #[test]
    fn test_canonical_formula() {
        let base = Attributes::default().with(AttributeKind::MaxHealth, 100.0);
        let mut set = ModifierSet::new();
        set.apply_source(
            SPINACH,
            [
                Modifier::add(SPINACH, AttributeKind::MaxHealth, 20.0),
                Modifier::mul(SPINACH, AttributeKind::MaxHealth, 0.5),
            ],
        );

        let result = aggregate(&base, &set);
        assert_relative_eq!(result.get(AttributeKind::MaxHealth), 180.0);
    }

    #[test]
    fn test_order_does_not_matter() {
        let base = Attributes::default().with(AttributeKind::Might, 1.0);
        let a = Modifier::mul(SPINACH, AttributeKind::Might, 0.1);
        let b = Modifier::add(ARMOR_RING, AttributeKind::Might, 0.5);
        let c = Modifier::mul(ARMOR_RING, AttributeKind::Might, 0.2);

        let mut forward = ModifierSet::new();
        forward.apply_source(SPINACH, [a]);
        forward.apply_source(ARMOR_RING, [b, c]);

        let mut reverse = ModifierSet::new();
        reverse.apply_source(ARMOR_RING, [c, b]);
        reverse.apply_source(SPINACH, [a]);

        let expected = (1.0 + 0.5) * (1.0 + 0.1 + 0.2);
        assert_relative_eq!(aggregate(&base, &forward).get(AttributeKind::Might), expected);
        assert_relative_eq!(aggregate(&base, &reverse).get(AttributeKind::Might), expected);
    }

    #[test]
    fn test_reapplying_source_is_idempotent() {
        let base = Attributes::default().with(AttributeKind::Armor, 1.0);
        let mut set = ModifierSet::new();

        set.apply_source(SPINACH, [Modifier::add(SPINACH, AttributeKind::Armor, 5.0)]);
        let once = aggregate(&base, &set);
        set.apply_source(SPINACH, [Modifier::add(SPINACH, AttributeKind::Armor, 5.0)]);
        let twice = aggregate(&base, &set);

        assert_eq!(set.len(), 1);
        assert_relative_eq!(once.get(AttributeKind::Armor), 6.0);
        assert_relative_eq!(twice.get(AttributeKind::Armor), 6.0);
    }

    #[test]
    fn test_reapply_replaces_only_that_source() {
        let mut set = ModifierSet::new();
        set.apply_source(SPINACH, [Modifier::add(SPINACH, AttributeKind::Might, 0.1)]);
        set.apply_source(ARMOR_RING, [Modifier::add(ARMOR_RING, AttributeKind::Armor, 1.0)]);
        set.apply_source(
            SPINACH,
            [
                Modifier::add(SPINACH, AttributeKind::Might, 0.2),
                Modifier::mul(SPINACH, AttributeKind::Area, 0.1),
            ],
        );

        assert_eq!(set.len(), 3);
        assert_eq!(set.iter().filter(|m| m.source == ARMOR_RING).count(), 1);
        assert_eq!(set.remove_source(SPINACH), 2);
        assert_eq!(set.remove_source(SPINACH), 0);
    }

    #[test]
    fn test_apply_stamps_source() {
        let mut set = ModifierSet::new();
        set.apply_source(SPINACH, [Modifier::add(ARMOR_RING, AttributeKind::Armor, 1.0)]);
        assert!(set.iter().all(|m| m.source == SPINACH));
    }

    #[test]
    fn test_apply_modifier_source_marks_dirty() {
        let mut world = World::new();
        let e = world.create_entity();

        assert!(apply_modifier_source(
            &mut world,
            e,
            SPINACH,
            [Modifier::mul(SPINACH, AttributeKind::Might, 0.1)]
        ));
        assert!(world.has_component::<AttributesDirty>(e));
        assert_eq!(world.get_component::<ModifierSet>(e).map(ModifierSet::len), Some(1));

        let ghost = EntityId::from_raw(999);
        assert!(!apply_modifier_source(&mut world, ghost, SPINACH, []));
    }

    #[test]
    fn test_remove_modifier_source_marks_dirty() {
        let mut world = World::new();
        let e = world.create_entity();
        apply_modifier_source(&mut world, e, SPINACH, [Modifier::add(SPINACH, AttributeKind::Armor, 1.0)]);
        world.remove_component::<AttributesDirty>(e);

        assert_eq!(remove_modifier_source(&mut world, e, SPINACH), 1);
        assert!(world.has_component::<AttributesDirty>(e));
    }

    #[test]
    fn test_final_attribute_fallback() {
        let mut world = World::new();
        let e = world.create_entity();
        assert_relative_eq!(final_attribute(&world, e, AttributeKind::Might, 1.0), 1.0);

        world.add_component(e, FinalAttributes(Attributes::default().with(AttributeKind::Might, 2.0)));
        assert_relative_eq!(final_attribute(&world, e, AttributeKind::Might, 1.0), 2.0);
    }
}
