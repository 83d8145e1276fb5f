//! # ECS World
//!
//! The central container for entities, component columns, systems and
//! services.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │ World                                                     │
//! │  allocator        monotonic ids, never reused             │
//! │  states           id -> Dead | Alive | PendingDestroy     │
//! │  storages         TypeId -> Box<dyn ErasedStorage>        │
//! │  systems          ordered list, run every update()        │
//! │  services         capability TypeId -> Box<dyn Any>       │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frame Lifecycle
//!
//! `update(dt)` runs every system in registration order, then flushes the
//! destruction queue. An entity destroyed mid-frame keeps all of its
//! components until that flush, so systems iterating a column never see it
//! vanish under them.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;

use super::component::Component;
use super::entity::{EntityAllocator, EntityId};
use super::storage::{ComponentStorage, ErasedStorage};
use super::system::{validate_order, System, SystemEntry};
use crate::error::CoreResult;

/// Lifecycle state of an entity slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum EntityState {
    /// Never allocated, or already flushed.
    #[default]
    Dead,
    /// Live and not queued for removal.
    Alive,
    /// Live until the end of the current frame.
    PendingDestroy,
}

/// Per-frame summary returned by [`World::update`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frame number that just completed (first frame is 0).
    pub frame: u64,
    /// Systems that ran this frame.
    pub systems_run: usize,
    /// Entities removed by the end-of-frame flush.
    pub destroyed: usize,
}

/// The ECS World - container for all simulation state.
///
/// # Example
///
/// ```rust,ignore
/// let mut world = World::new();
///
/// let e = world.create_entity();
/// world.add_component(e, Position::new(1.0, 2.0));
/// world.destroy_entity(e);
/// assert!(world.has_component::<Position>(e)); // still there this frame
/// world.update(0.016);
/// assert!(!world.has_component::<Position>(e));
/// ```
pub struct World {
    allocator: EntityAllocator,
    /// Entity state, indexed by `EntityId::index()`.
    states: Vec<EntityState>,
    /// Number of live entities (including pending destruction).
    live_count: usize,
    /// Ids queued by `destroy_entity` this frame.
    pending_destroy: Vec<EntityId>,
    /// One column per component type, created on demand.
    storages: HashMap<TypeId, Box<dyn ErasedStorage>>,
    /// Ordered system list.
    systems: Vec<SystemEntry>,
    /// Capability-keyed singletons.
    services: HashMap<TypeId, Box<dyn Any>>,
    /// Frames completed so far.
    frame: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            states: vec![EntityState::Dead],
            live_count: 0,
            pending_destroy: Vec::new(),
            storages: HashMap::new(),
            systems: Vec::new(),
            services: HashMap::new(),
            frame: 0,
        }
    }

    // =========================================================================
    // Entities
    // =========================================================================

    /// Creates a new entity and adds it to the live set.
    pub fn create_entity(&mut self) -> EntityId {
        let id = self.allocator.allocate();
        if id.index() >= self.states.len() {
            self.states.resize(id.index() + 1, EntityState::Dead);
        }
        self.states[id.index()] = EntityState::Alive;
        self.live_count += 1;
        id
    }

    #[inline]
    fn state(&self, id: EntityId) -> EntityState {
        self.states.get(id.index()).copied().unwrap_or_default()
    }

    /// Queues an entity for removal at the end of the current frame.
    ///
    /// Destroying the same entity twice in a frame is harmless. Destroying a
    /// dead or unknown id is ignored.
    pub fn destroy_entity(&mut self, id: EntityId) {
        match self.state(id) {
            EntityState::Alive => {
                self.states[id.index()] = EntityState::PendingDestroy;
                self.pending_destroy.push(id);
            }
            EntityState::PendingDestroy => {}
            EntityState::Dead => {
                tracing::trace!(entity = %id, "destroy of non-live entity ignored");
            }
        }
    }

    /// Checks if an entity is live (pending destruction still counts).
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.state(id) != EntityState::Dead
    }

    /// Checks if an entity was destroyed this frame and awaits the flush.
    #[inline]
    #[must_use]
    pub fn is_pending_destroy(&self, id: EntityId) -> bool {
        self.state(id) == EntityState::PendingDestroy
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Number of entities ever created, including destroyed ones.
    #[inline]
    #[must_use]
    pub const fn created_count(&self) -> u32 {
        self.allocator.allocated()
    }

    /// Iterates over all live entity ids in ascending order.
    pub fn live_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s != EntityState::Dead)
            .filter_map(|(idx, _)| u32::try_from(idx).ok().map(EntityId::from_raw))
    }

    /// Frames completed so far.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    // =========================================================================
    // Components
    // =========================================================================

    /// Returns the column for `T`, if one was ever created.
    #[must_use]
    pub fn storage<T: Component>(&self) -> Option<&ComponentStorage<T>> {
        self.storages
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref::<ComponentStorage<T>>())
    }

    /// Returns the column for `T`, creating it on first use.
    pub fn storage_mut<T: Component>(&mut self) -> &mut ComponentStorage<T> {
        self.storages
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStorage::<T>::new()))
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .expect("component storage registered under a foreign TypeId")
    }

    /// Adds (or overwrites) a component.
    ///
    /// Writes to a non-live entity are logged and ignored; returns whether
    /// the write was accepted.
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> bool {
        if !self.is_alive(id) {
            tracing::warn!(
                entity = %id,
                component = type_name::<T>(),
                "component write to non-live entity ignored"
            );
            return false;
        }
        self.storage_mut::<T>().insert(id, component);
        true
    }

    /// Writes a modified copy back. Same rules as [`World::add_component`].
    pub fn set_component<T: Component>(&mut self, id: EntityId, component: T) -> bool {
        self.add_component(id, component)
    }

    /// Removes a component, returning it. No-op when absent.
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<ComponentStorage<T>>())
            .and_then(|s| s.remove(id))
    }

    /// Checks whether the entity has a `T`.
    #[inline]
    #[must_use]
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.storage::<T>().is_some_and(|s| s.contains(id))
    }

    /// Gets a reference to the entity's `T`.
    #[inline]
    #[must_use]
    pub fn get_component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.storage::<T>().and_then(|s| s.get(id))
    }

    /// Gets a mutable reference to the entity's `T`.
    #[inline]
    pub fn get_component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.storages
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut::<ComponentStorage<T>>())
            .and_then(|s| s.get_mut(id))
    }

    /// Copies the entity's `T` out, or the type default when absent.
    #[inline]
    #[must_use]
    pub fn component_or_default<T: Component + Clone>(&self, id: EntityId) -> T {
        self.get_component::<T>(id).cloned().unwrap_or_default()
    }

    /// Number of component columns created so far.
    #[inline]
    #[must_use]
    pub fn storage_count(&self) -> usize {
        self.storages.len()
    }

    // =========================================================================
    // Systems
    // =========================================================================

    /// Appends a system to the frame list.
    ///
    /// Every call adds a new entry, including further instances of a type
    /// already registered. Systems added during `update` start running on
    /// the next frame.
    pub fn register_system<S: System>(&mut self, system: S) {
        tracing::debug!(system = system.name(), "system registered");
        self.systems.push(SystemEntry::new(system));
    }

    /// Names of the registered systems, in execution order.
    #[must_use]
    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|e| e.system.name()).collect()
    }

    /// Checks the provide-before-require ordering contract.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ScheduleViolation` naming the first system that
    /// consumes a capability no earlier system provides.
    pub fn validate_schedule(&self) -> CoreResult<()> {
        validate_order(&self.systems)
    }

    /// Advances the simulation by one frame.
    ///
    /// Runs every system in registration order, then removes every entity
    /// destroyed during the frame from the live set and from all columns.
    /// A negative or non-finite `dt` is treated as zero.
    pub fn update(&mut self, dt: f32) -> FrameStats {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            tracing::warn!(dt, "invalid delta time clamped to zero");
            0.0
        };

        let mut running = std::mem::take(&mut self.systems);
        for entry in &mut running {
            entry.system.update(self, dt);
        }
        let systems_run = running.len();
        let added = std::mem::replace(&mut self.systems, running);
        self.systems.extend(added);

        let destroyed = self.flush_destroyed();
        let stats = FrameStats {
            frame: self.frame,
            systems_run,
            destroyed,
        };
        self.frame += 1;
        stats
    }

    fn flush_destroyed(&mut self) -> usize {
        let mut pending = std::mem::take(&mut self.pending_destroy);
        let mut destroyed = 0;

        for &id in &pending {
            if self.state(id) != EntityState::PendingDestroy {
                continue;
            }
            self.states[id.index()] = EntityState::Dead;
            self.live_count -= 1;
            for storage in self.storages.values_mut() {
                storage.remove_entity(id);
            }
            destroyed += 1;
        }

        // Reuse the queue allocation next frame.
        pending.clear();
        self.pending_destroy = pending;

        if destroyed > 0 {
            tracing::trace!(destroyed, frame = self.frame, "destruction flush");
        }
        destroyed
    }

    // =========================================================================
    // Services
    // =========================================================================

    /// Registers a singleton under its capability type `T`.
    ///
    /// Trait-object capabilities are registered boxed, e.g.
    /// `world.register_service::<Box<dyn Sink>>(Box::new(impl))`.
    /// Registering the same capability twice replaces the previous instance.
    pub fn register_service<T: 'static>(&mut self, service: T) {
        if self
            .services
            .insert(TypeId::of::<T>(), Box::new(service))
            .is_some()
        {
            tracing::debug!(service = type_name::<T>(), "service replaced");
        }
    }

    /// Looks up the service registered for capability `T`.
    #[must_use]
    pub fn try_service<T: 'static>(&self) -> Option<&T> {
        self.services
            .get(&TypeId::of::<T>())
            .and_then(|s| s.downcast_ref::<T>())
    }

    /// Looks up the service registered for capability `T`, mutably.
    pub fn try_service_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.services
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.downcast_mut::<T>())
    }

    /// Removes a service, taking ownership.
    ///
    /// Use this for the extract/reinsert pattern when a system needs the
    /// service and component access at the same time.
    pub fn take_service<T: 'static>(&mut self) -> Option<T> {
        self.services
            .remove(&TypeId::of::<T>())
            .and_then(|s| s.downcast::<T>().ok())
            .map(|b| *b)
    }

    /// Checks whether capability `T` has a registered service.
    #[must_use]
    pub fn has_service<T: 'static>(&self) -> bool {
        self.services.contains_key(&TypeId::of::<T>())
    }
}
