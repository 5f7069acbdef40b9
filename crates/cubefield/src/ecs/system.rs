//! # System: Prioritized Logic Units With Three Phases
//!
//! A system is an object that declares which components it cares about and
//! gets three hooks per frame: `pre_update`, `update`, `post_update`. Each
//! hook receives `&mut World` and the frame's delta time.
//!
//! ## Ordering
//!
//! Every system has a signed priority; lower runs earlier. The schedule is
//! stable-sorted on registration, so systems sharing a priority keep the order
//! they were added in.
//!
//! ```text
//! frame:
//!   InputSystem (-100)   pre → update → post
//!   PlayerController(-50) pre → update → post
//!   MovementSystem (0)   pre → update → post
//!   ...
//!   RenderSystem (100)   pre → update → post
//! ```
//!
//! All three phases of one system run before the next system starts. Disabled
//! systems get no calls at all.
//!
//! ## Typed Handles
//!
//! [`World::add_system`](super::world::World::add_system) returns a
//! [`SystemHandle<S>`]. Looking a system up through its handle is a position
//! scan plus one downcast to the concrete type the handle remembers, so there
//! is no "find the first system that happens to be a `T`" search.
//!
//! ## Comparison
//!
//! - **bevy_ecs**: systems are functions with injected parameters, ordering is
//!   declared with labels and `before`/`after` constraints.
//! - **Ours**: explicit integer priorities and object systems. Enough for a
//!   fixed pipeline of half a dozen stages.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

use super::component::ComponentMask;
use super::world::World;

/// Upcast helper so a `dyn System` can be downcast to its concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of per-frame logic run by the [`World`].
///
/// Only [`update`](Self::update) and
/// [`required_components`](Self::required_components) are mandatory.
pub trait System: AsAny {
    /// Components an entity must carry for this system to care about it.
    /// Called once, at registration.
    fn required_components(&self) -> ComponentMask;

    /// Lower runs earlier. Read once, at registration.
    fn priority(&self) -> i32 {
        0
    }

    /// Short name used in diagnostics and logs.
    fn name(&self) -> &'static str {
        short_type_name(std::any::type_name::<Self>())
    }

    fn pre_update(&mut self, _world: &mut World, _dt: f32) {}

    fn update(&mut self, world: &mut World, dt: f32);

    fn post_update(&mut self, _world: &mut World, _dt: f32) {}
}

/// Untyped id of a registered system. Unique for the lifetime of a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SystemId(pub(crate) u32);

/// Typed handle returned by `World::add_system`.
pub struct SystemHandle<S> {
    id: SystemId,
    _marker: PhantomData<fn() -> S>,
}

impl<S> SystemHandle<S> {
    pub(crate) fn new(id: SystemId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    pub fn id(&self) -> SystemId {
        self.id
    }
}

impl<S> Clone for SystemHandle<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for SystemHandle<S> {}

impl<S> PartialEq for SystemHandle<S> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<S> fmt::Debug for SystemHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SystemHandle<{}>({})", short_type_name(std::any::type_name::<S>()), self.id.0)
    }
}

/// A registered system plus the bookkeeping the schedule keeps about it.
pub struct SystemEntry {
    pub(crate) id: SystemId,
    pub(crate) system: Box<dyn System>,
    priority: i32,
    enabled: bool,
    required: ComponentMask,
}

impl SystemEntry {
    pub(crate) fn new(id: SystemId, system: Box<dyn System>) -> Self {
        let priority = system.priority();
        let required = system.required_components();
        Self {
            id,
            system,
            priority,
            enabled: true,
            required,
        }
    }

    pub fn id(&self) -> SystemId {
        self.id
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn required_components(&self) -> ComponentMask {
        self.required
    }

    pub fn name(&self) -> &'static str {
        self.system.name()
    }

    /// `true` if this system is enabled, requires something, and `mask`
    /// carries all of it.
    pub fn matches_entity(&self, mask: ComponentMask) -> bool {
        self.enabled && !self.required.is_empty() && mask.is_superset_of(self.required)
    }

    pub(crate) fn downcast_ref<S: System>(&self) -> Option<&S> {
        (*self.system).as_any().downcast_ref::<S>()
    }

    pub(crate) fn downcast_mut<S: System>(&mut self) -> Option<&mut S> {
        (*self.system).as_any_mut().downcast_mut::<S>()
    }
}

/// Per-system timing recorded during a single frame.
#[cfg(feature = "diagnostics")]
#[derive(Clone, Debug)]
pub struct SystemTiming {
    pub name: &'static str,
    pub duration_us: f64,
}

/// Priority-ordered list of systems.
#[derive(Default)]
pub struct Schedule {
    entries: Vec<SystemEntry>,
    /// Per-system timings from the most recent `run()` call.
    #[cfg(feature = "diagnostics")]
    pub(crate) timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, keeping the list stable-sorted by priority.
    pub(crate) fn insert(&mut self, entry: SystemEntry) {
        self.entries.push(entry);
        // `sort_by_key` is stable: equal priorities keep insertion order.
        self.entries.sort_by_key(SystemEntry::priority);
    }

    /// Move every entry of `other` into this schedule.
    pub(crate) fn merge(&mut self, other: Schedule) {
        for entry in other.entries {
            self.insert(entry);
        }
    }

    pub(crate) fn get(&self, id: SystemId) -> Option<&SystemEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: SystemId) -> Option<&mut SystemEntry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub(crate) fn remove(&mut self, id: SystemId) -> Option<SystemEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    pub fn entries(&self) -> impl Iterator<Item = &SystemEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        #[cfg(feature = "diagnostics")]
        self.timings.clear();
    }

    /// Run every enabled system's three phases, in priority order.
    pub(crate) fn run(&mut self, world: &mut World, dt: f32) {
        #[cfg(feature = "diagnostics")]
        self.timings.clear();

        for entry in self.entries.iter_mut().filter(|e| e.enabled) {
            #[cfg(feature = "diagnostics")]
            let start = std::time::Instant::now();

            entry.system.pre_update(world, dt);
            entry.system.update(world, dt);
            entry.system.post_update(world, dt);

            #[cfg(feature = "diagnostics")]
            self.timings.push(SystemTiming {
                name: entry.system.name(),
                duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
            });
        }
    }
}

/// Strip the module path and generic arguments from a type name
/// (`cubefield::systems::movement::MovementSystem` → `MovementSystem`).
pub(crate) fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Position;

    struct Probe;

    impl System for Probe {
        fn required_components(&self) -> ComponentMask {
            ComponentMask::of::<(Position,)>()
        }

        fn priority(&self) -> i32 {
            7
        }

        fn update(&mut self, _world: &mut World, _dt: f32) {}
    }

    struct Nothing;

    impl System for Nothing {
        fn required_components(&self) -> ComponentMask {
            ComponentMask::EMPTY
        }

        fn update(&mut self, _world: &mut World, _dt: f32) {}
    }

    #[test]
    fn short_names() {
        assert_eq!(short_type_name("a::b::MovementSystem"), "MovementSystem");
        assert_eq!(short_type_name("a::Wrapper<b::Inner>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn entry_reads_priority_and_mask_once() {
        let entry = SystemEntry::new(SystemId(0), Box::new(Probe));
        assert_eq!(entry.priority(), 7);
        assert_eq!(entry.required_components(), ComponentMask::of::<(Position,)>());
        assert_eq!(entry.name(), "Probe");
        assert!(entry.is_enabled());
    }

    #[test]
    fn matches_entity_rules() {
        let mut entry = SystemEntry::new(SystemId(0), Box::new(Probe));
        let has = ComponentMask::of::<(Position,)>();
        assert!(entry.matches_entity(has));
        assert!(!entry.matches_entity(ComponentMask::EMPTY));
        entry.set_enabled(false);
        assert!(!entry.matches_entity(has));

        let empty = SystemEntry::new(SystemId(1), Box::new(Nothing));
        assert!(!empty.matches_entity(has));
    }

    #[test]
    fn downcast_to_concrete_type() {
        let mut entry = SystemEntry::new(SystemId(0), Box::new(Probe));
        assert!(entry.downcast_ref::<Probe>().is_some());
        assert!(entry.downcast_mut::<Nothing>().is_none());
    }

    #[test]
    fn insert_keeps_stable_priority_order() {
        let mut schedule = Schedule::new();
        schedule.insert(SystemEntry::new(SystemId(0), Box::new(Probe)));
        schedule.insert(SystemEntry::new(SystemId(1), Box::new(Nothing)));
        schedule.insert(SystemEntry::new(SystemId(2), Box::new(Nothing)));
        let ids: Vec<_> = schedule.entries().map(|e| e.id().0).collect();
        assert_eq!(ids, vec![1, 2, 0]);

        assert!(schedule.remove(SystemId(2)).is_some());
        assert!(schedule.remove(SystemId(2)).is_none());
        assert_eq!(schedule.len(), 2);
    }
}
