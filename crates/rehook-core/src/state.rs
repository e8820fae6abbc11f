//! The state slot primitive.

use crate::cursor;
use crate::equality::ExactEq;
use crate::memory::{self, InstanceId};
use crate::HookError;

/// Declares (or revisits) the next state slot of the currently rendering
/// instance and returns its value together with a setter.
///
/// `default` seeds the slot on the first pass and is ignored on every later
/// pass. Must be called during an active render pass, in the same order on
/// every pass (never conditionally, never in loops of varying length). The
/// returned setter may be invoked at any time, including outside a render.
///
/// # Panics
/// Panics on a slot type mismatch, which only happens when the caller broke
/// the call-order contract.
pub fn use_state<T>(default: T) -> Result<(T, StateSetter<T>), HookError>
where
    T: ExactEq + Clone,
{
    let id = cursor::guard()?;
    if !cursor::is_rendering() {
        return Err(HookError::NotRendering);
    }
    let slot = cursor::next_state_slot();
    let (value, generation) = memory::with_memory(id, |memory| {
        if slot == memory.states.len() {
            memory.states.push(Box::new(default));
        }
        let value = memory.states[slot]
            .as_any()
            .downcast_ref::<T>()
            .expect("state slot type mismatch")
            .clone();
        (value, memory.generation)
    })?;
    let setter = StateSetter {
        instance: id,
        generation,
        slot,
        read: value.clone(),
    };
    Ok((value, setter))
}

/// Writes into the slot captured at creation time, regardless of where the
/// cursor has moved since.
pub struct StateSetter<T> {
    instance: InstanceId,
    generation: u64,
    slot: usize,
    read: T,
}

impl<T: ExactEq> StateSetter<T> {
    /// Stores `value` in the slot and, when the owning instance is not
    /// currently inside a render pass, requests a re-render from the host.
    ///
    /// A value exact-equal to the one read when this setter was created is a
    /// complete no-op: no store mutation, no re-render. In-render updates
    /// mutate the store silently; the render in progress is responsible for
    /// producing consistent output from the new value. After the instance
    /// unmounts the setter does nothing, even if the same handle has since
    /// been re-initialized: the setter writes only into the incarnation of
    /// the storage it was created against.
    pub fn set(&self, value: T) {
        if value.exact_eq(self.read.as_any()) {
            return;
        }
        let host = memory::with_memory(self.instance, |memory| {
            if memory.generation != self.generation {
                return None;
            }
            memory.states[self.slot] = Box::new(value);
            Some(memory.host.clone())
        });
        let Ok(Some(host)) = host else {
            return;
        };
        if cursor::is_rendering_instance(self.instance) {
            return;
        }
        if let Some(host) = host.upgrade() {
            host.request_rerender();
        }
    }
}

impl<T: Clone> Clone for StateSetter<T> {
    fn clone(&self) -> Self {
        Self {
            instance: self.instance,
            generation: self.generation,
            slot: self.slot,
            read: self.read.clone(),
        }
    }
}
