//! # Systems and the Ordering Contract
//!
//! A system is a unit of per-frame logic that reads and writes components
//! through the [`World`]. Systems run strictly one after another, in the
//! order they were registered. There is no automatic dependency resolution.
//!
//! ## Ordering Contract
//!
//! The registration order is a manually curated contract. Systems can
//! *declare* what they produce and consume for a frame, using free-form
//! capability labels (for example `"index:hostiles"`), and
//! [`World::validate_schedule`] checks that every consumer is registered
//! after a producer of each label it needs:
//!
//! ```text
//! IndexBuilder<Hostiles>   provides ["index:hostiles"]
//! WeaponFire               requires ["index:hostiles"]   // must come later
//! ```
//!
//! Declarations are optional; a system that declares nothing is never
//! flagged.

use super::world::World;
use crate::error::{CoreError, CoreResult};

/// A unit of per-frame logic.
pub trait System: 'static {
    /// Short, stable name for logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Runs the system for one frame.
    fn update(&mut self, world: &mut World, dt: f32);

    /// Capabilities this system makes valid for later systems this frame.
    fn provides(&self) -> &'static [&'static str] {
        &[]
    }

    /// Capabilities that must be provided by an earlier system this frame.
    fn requires(&self) -> &'static [&'static str] {
        &[]
    }
}

/// A registered system.
pub(crate) struct SystemEntry {
    pub(crate) system: Box<dyn System>,
}

impl SystemEntry {
    pub(crate) fn new<S: System>(system: S) -> Self {
        Self {
            system: Box::new(system),
        }
    }
}

/// Checks the provide-before-require rule over an ordered system list.
pub(crate) fn validate_order(systems: &[SystemEntry]) -> CoreResult<()> {
    let mut provided: Vec<&'static str> = Vec::new();

    for entry in systems {
        for &capability in entry.system.requires() {
            if !provided.contains(&capability) {
                return Err(CoreError::ScheduleViolation {
                    consumer: entry.system.name(),
                    capability,
                });
            }
        }
        provided.extend_from_slice(entry.system.provides());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Builder;
    impl System for Builder {
        fn name(&self) -> &'static str {
            "builder"
        }
        fn update(&mut self, _world: &mut World, _dt: f32) {}
        fn provides(&self) -> &'static [&'static str] {
            &["index:test"]
        }
    }

    struct Consumer;
    impl System for Consumer {
        fn name(&self) -> &'static str {
            "consumer"
        }
        fn update(&mut self, _world: &mut World, _dt: f32) {}
        fn requires(&self) -> &'static [&'static str] {
            &["index:test"]
        }
    }

    #[test]
    fn test_builder_before_consumer_is_valid() {
        let list = vec![SystemEntry::new(Builder), SystemEntry::new(Consumer)];
        assert!(validate_order(&list).is_ok());
    }

    #[test]
    fn test_consumer_before_builder_is_rejected() {
        let list = vec![SystemEntry::new(Consumer), SystemEntry::new(Builder)];
        assert_eq!(
            validate_order(&list),
            Err(CoreError::ScheduleViolation {
                consumer: "consumer",
                capability: "index:test",
            })
        );
    }
}
