//! Bounded pools of pre-instantiated flying objects.
//!
//! Spawning never allocates scene objects at runtime: every flyer is a
//! clone made at preload (toasters) or on first use of a variant (toasts),
//! cycled round-robin by a monotonically advancing cursor. Acquisition is
//! O(1) and total: it never blocks and never fails.
//!
//! Handles are generational. Acquiring a slot bumps its generation, so
//! deferred lifecycle tasks holding a stale [`SlotHandle`] see the mismatch
//! and turn into no-ops instead of touching the slot's new occupant. If the
//! previous occupant was still mid-flight when its slot comes around again,
//! the acquire reports it so the engine can interrupt that flight.

use crate::error::AssetError;
use crate::params::{ObjectKind, ToastShade};
use crate::scene::{AssetProvider, Template, FLAP_CLIP, SCENE_NAME, TOASTER_TEMPLATE};

/// Number of toaster clones instantiated at preload.
pub const TOASTER_POOL_SIZE: usize = 30;

/// Generational reference to one pool slot.
///
/// Valid only while the slot's generation matches; check with
/// [`ObjectPool::is_current`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SlotHandle {
    /// Which pool the slot belongs to.
    pub kind: ObjectKind,
    /// Slot index within its pool.
    pub index: usize,
    /// Generation the handle was issued at.
    pub generation: u32,
}

/// Result of acquiring a slot.
#[derive(Clone, Debug)]
pub struct Acquired {
    /// Handle for this occupancy of the slot.
    pub handle: SlotHandle,
    /// Scene-graph name of the slot's clone.
    pub name: String,
    /// True when the slot's previous occupant had not finished its flight;
    /// the caller must interrupt it before reuse.
    pub interrupted: bool,
    /// True on the slot's first acquisition; the clone still needs its
    /// collision shapes generated.
    pub needs_collision_shapes: bool,
}

#[derive(Debug)]
struct Slot {
    name: String,
    generation: u32,
    in_flight: bool,
    shapes_generated: bool,
}

/// Fixed-capacity ring buffers of flyer clones, one per object kind.
#[derive(Debug)]
pub struct ObjectPool {
    toast_templates: [Option<Template>; 3],
    groups: [Vec<Slot>; 4],
    cursors: [usize; 4],
}

impl ObjectPool {
    /// Load the toaster template and instantiate the toaster pool.
    ///
    /// Fails if the toaster template is missing or carries no wing-flap
    /// clip; callers treat that as fatal. Toast pools stay empty until
    /// their shade is first requested.
    pub fn preload(assets: &mut dyn AssetProvider) -> Result<Self, AssetError> {
        let toaster_template = assets.load_template(TOASTER_TEMPLATE, SCENE_NAME)?;
        if !toaster_template.has_clip(FLAP_CLIP) {
            return Err(AssetError::MissingClip {
                template: toaster_template.name.clone(),
            });
        }

        let toaster_slots = (0..TOASTER_POOL_SIZE)
            .map(|i| Slot {
                name: format!("{}.{}", TOASTER_TEMPLATE, i),
                generation: 0,
                in_flight: false,
                shapes_generated: false,
            })
            .collect();

        Ok(Self {
            toast_templates: [None, None, None],
            groups: [toaster_slots, Vec::new(), Vec::new(), Vec::new()],
            cursors: [0; 4],
        })
    }

    /// Make sure the template for a toast shade is loaded.
    ///
    /// Lazy by design: a shade the user never selects is never loaded.
    pub fn ensure_toast_template(
        &mut self,
        assets: &mut dyn AssetProvider,
        shade: ToastShade,
    ) -> Result<(), AssetError> {
        let group = ObjectKind::Toast(shade).slot_group() - 1;
        if self.toast_templates[group].is_none() {
            let template = assets.load_template(shade.template_name(), SCENE_NAME)?;
            self.toast_templates[group] = Some(template);
        }
        Ok(())
    }

    /// Whether the template for this kind is available.
    pub fn has_template(&self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Toaster => true,
            ObjectKind::Toast(shade) => {
                self.toast_templates[ObjectKind::Toast(shade).slot_group() - 1].is_some()
            }
        }
    }

    /// Take the next slot for `kind` in round-robin order.
    ///
    /// Never fails. Toast pools grow one clone at a time on demand, up to
    /// [`TOASTER_POOL_SIZE`], then wrap like the toaster pool.
    pub fn acquire(&mut self, kind: ObjectKind) -> Acquired {
        let group = kind.slot_group();
        let slots = &mut self.groups[group];

        if slots.is_empty() || (slots.len() < TOASTER_POOL_SIZE && slots.iter().all(|s| s.in_flight))
        {
            let prefix = match kind {
                ObjectKind::Toaster => TOASTER_TEMPLATE,
                ObjectKind::Toast(shade) => shade.template_name(),
            };
            slots.push(Slot {
                name: format!("{}.{}", prefix, slots.len()),
                generation: 0,
                in_flight: false,
                shapes_generated: false,
            });
            // Point the cursor at the fresh slot.
            self.cursors[group] = slots.len() - 1;
        }

        let index = self.cursors[group] % slots.len();
        self.cursors[group] = self.cursors[group].wrapping_add(1);

        let slot = &mut slots[index];
        let interrupted = slot.in_flight;
        let needs_collision_shapes = !slot.shapes_generated;
        slot.generation = slot.generation.wrapping_add(1);
        slot.in_flight = true;
        slot.shapes_generated = true;

        Acquired {
            handle: SlotHandle {
                kind,
                index,
                generation: slot.generation,
            },
            name: slot.name.clone(),
            interrupted,
            needs_collision_shapes,
        }
    }

    /// Whether the handle still refers to the slot's current occupancy.
    pub fn is_current(&self, handle: &SlotHandle) -> bool {
        self.groups[handle.kind.slot_group()]
            .get(handle.index)
            .map(|s| s.generation == handle.generation && s.in_flight)
            .unwrap_or(false)
    }

    /// Scene-graph name for a handle, if it is still current.
    pub fn name_of(&self, handle: &SlotHandle) -> Option<&str> {
        let slot = self.groups[handle.kind.slot_group()].get(handle.index)?;
        (slot.generation == handle.generation).then(|| slot.name.as_str())
    }

    /// Mark a flight finished, freeing the slot for quiet reuse.
    ///
    /// Returns false (and does nothing) when the handle is stale.
    pub fn release(&mut self, handle: &SlotHandle) -> bool {
        let slot = match self.groups[handle.kind.slot_group()].get_mut(handle.index) {
            Some(s) => s,
            None => return false,
        };
        if slot.generation != handle.generation || !slot.in_flight {
            return false;
        }
        slot.in_flight = false;
        true
    }

    /// Number of slots currently marked in flight, across all pools.
    pub fn in_flight_slots(&self) -> usize {
        self.groups
            .iter()
            .map(|g| g.iter().filter(|s| s.in_flight).count())
            .sum()
    }
}
