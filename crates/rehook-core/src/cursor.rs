//! The execution cursor: exclusive binding of slot access to one instance.
//!
//! A single thread-local cursor tracks which instance currently owns slot
//! access, the next state and effect slot indices, and whether a render
//! pass is active. The slot primitives are called with no explicit context
//! argument, so the cursor is the implicit context scoped to "the call
//! stack currently inside one instance's render", the same mechanism the
//! render primitives of the host-facing API rely on.

use std::cell::RefCell;

use crate::memory::{self, InstanceId};
use crate::HookError;

#[derive(Default)]
struct Cursor {
    locked: Option<InstanceId>,
    state_index: usize,
    effect_index: usize,
    rendering: bool,
}

thread_local! {
    static CURSOR: RefCell<Cursor> = RefCell::new(Cursor::default());
}

/// Takes the sole lock for `id` and resets both slot indices. Overlapping
/// acquisition is a programming error on the caller's side; it is not
/// detected here, the previous binding is simply replaced.
pub(crate) fn lock(id: InstanceId) {
    CURSOR.with(|cursor| {
        let mut cursor = cursor.borrow_mut();
        cursor.locked = Some(id);
        cursor.state_index = 0;
        cursor.effect_index = 0;
    });
}

/// Idempotent; safe to call with no lock held.
pub(crate) fn unlock() {
    CURSOR.with(|cursor| cursor.borrow_mut().locked = None);
}

pub(crate) fn begin_render() {
    CURSOR.with(|cursor| cursor.borrow_mut().rendering = true);
}

pub(crate) fn end_render() {
    CURSOR.with(|cursor| cursor.borrow_mut().rendering = false);
}

pub(crate) fn is_rendering() -> bool {
    CURSOR.with(|cursor| cursor.borrow().rendering)
}

/// True while `id` itself is inside an active render pass.
pub(crate) fn is_rendering_instance(id: InstanceId) -> bool {
    CURSOR.with(|cursor| {
        let cursor = cursor.borrow();
        cursor.rendering && cursor.locked == Some(id)
    })
}

/// The locked instance, verified to still have slot storage.
pub(crate) fn guard() -> Result<InstanceId, HookError> {
    let id = CURSOR
        .with(|cursor| cursor.borrow().locked)
        .ok_or(HookError::OutsideExecutionContext)?;
    if !memory::contains(id) {
        return Err(HookError::OutsideExecutionContext);
    }
    Ok(id)
}

pub(crate) fn next_state_slot() -> usize {
    CURSOR.with(|cursor| {
        let mut cursor = cursor.borrow_mut();
        let slot = cursor.state_index;
        cursor.state_index += 1;
        slot
    })
}

pub(crate) fn next_effect_slot() -> usize {
    CURSOR.with(|cursor| {
        let mut cursor = cursor.borrow_mut();
        let slot = cursor.effect_index;
        cursor.effect_index += 1;
        slot
    })
}

/// Runs `f` with the lock held for `id`, releasing it when `f` returns.
pub(crate) fn run_locked<R>(id: InstanceId, f: impl FnOnce() -> R) -> R {
    lock(id);
    let result = f();
    unlock();
    result
}
