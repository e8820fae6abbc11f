//! Per-instance slot storage and the process-wide memory map.
//!
//! Storage is attached the first time the host reports an instance and
//! detached exactly once, on that instance's unmount signal. Both slot
//! sequences are append-only in length while the instance lives; entries are
//! only ever replaced in place. If a later render pass declares fewer slots
//! than an earlier one, the trailing slots stay behind as stale garbage
//! until unmount; the store never shrinks and never compacts.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use rustc_hash::FxHashMap;

use crate::equality::{DepsKey, ExactEq};
use crate::lifecycle::HostInstance;
use crate::HookError;

/// Identity of a host instance: the address of its shared allocation.
/// The core never constructs or destroys the host object itself.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct InstanceId(usize);

impl InstanceId {
    pub(crate) fn of(instance: &Rc<dyn HostInstance>) -> Self {
        Self(Rc::as_ptr(instance) as *const () as usize)
    }
}

pub(crate) type Cleanup = Box<dyn FnOnce()>;
pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Cleanup>>;

/// One effect slot.
///
/// `deps == None` means "always dirty": the record is re-armed on every
/// render pass. `dirty` starts true and is cleared when the action runs;
/// while a record is dirty its action is installed. A flushed action leaves
/// `None` behind until a later pass with a changed key installs a new one.
pub(crate) struct EffectRecord {
    pub(crate) action: Option<EffectFn>,
    pub(crate) deps: Option<DepsKey>,
    pub(crate) dirty: bool,
    pub(crate) cleanup: Option<Cleanup>,
}

/// Slot storage for one instance.
///
/// The `Weak` host handle lets setters reach `request_rerender` long after
/// the render pass that created them, without keeping the host alive.
/// `generation` identifies this attachment: a handle that re-registers after
/// unmount gets fresh storage under a new generation, so setters captured
/// against the old incarnation can tell they no longer apply.
pub(crate) struct InstanceMemory {
    pub(crate) generation: u64,
    pub(crate) host: Weak<dyn HostInstance>,
    pub(crate) states: Vec<Box<dyn ExactEq>>,
    pub(crate) effects: Vec<EffectRecord>,
}

thread_local! {
    static MEMORY: RefCell<FxHashMap<InstanceId, InstanceMemory>> =
        RefCell::new(FxHashMap::default());
    static NEXT_GENERATION: Cell<u64> = Cell::new(1);
}

/// Attaches slot storage for `id` if absent. An instance that already has
/// storage keeps its slots untouched.
pub(crate) fn register(id: InstanceId, host: Weak<dyn HostInstance>) {
    MEMORY.with(|map| {
        map.borrow_mut().entry(id).or_insert_with(|| {
            let generation = NEXT_GENERATION.with(|next| {
                let generation = next.get();
                next.set(generation + 1);
                generation
            });
            log::trace!("attaching slot storage for {id:?} (generation {generation})");
            InstanceMemory {
                generation,
                host,
                states: Vec::new(),
                effects: Vec::new(),
            }
        });
    });
}

/// Destroys the slot storage for `id`. Idempotent.
pub(crate) fn release(id: InstanceId) {
    MEMORY.with(|map| {
        if map.borrow_mut().remove(&id).is_some() {
            log::trace!("released slot storage for {id:?}");
        }
    });
}

pub(crate) fn contains(id: InstanceId) -> bool {
    MEMORY.with(|map| map.borrow().contains_key(&id))
}

/// Runs `f` against the instance's storage. The map stays borrowed for the
/// duration of `f`, so `f` must not call back into host code.
pub(crate) fn with_memory<R>(
    id: InstanceId,
    f: impl FnOnce(&mut InstanceMemory) -> R,
) -> Result<R, HookError> {
    MEMORY.with(|map| {
        let mut map = map.borrow_mut();
        let memory = map
            .get_mut(&id)
            .ok_or(HookError::OutsideExecutionContext)?;
        Ok(f(memory))
    })
}
