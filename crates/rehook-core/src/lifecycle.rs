//! Adapter between the host framework's lifecycle signals and the runtime.
//!
//! The host owns tree reconciliation, commit scheduling, and instance
//! creation; this module is only the wiring that maps its signals onto the
//! cursor, the memory store, and the effect scheduler. One entry point per
//! signal, always for a given bound instance.

use std::rc::Rc;

use crate::cursor;
use crate::effect;
use crate::memory::{self, InstanceId};
use crate::HookError;

/// The one capability the runtime needs from a host component instance.
pub trait HostInstance {
    /// Schedule another render of this instance. Synchronous hosts may
    /// re-enter the runtime from here; the call carries no return value.
    fn request_rerender(&self);
}

/// First lifecycle signal for an instance: attaches slot storage if absent.
/// Idempotent; an already-initialized instance keeps its slots.
pub fn on_init(instance: &Rc<dyn HostInstance>) {
    memory::register(InstanceId::of(instance), Rc::downgrade(instance));
}

/// Post-mount signal: flushes dirty effects under the instance's lock.
pub fn on_post_mount(instance: &Rc<dyn HostInstance>) -> Result<(), HookError> {
    flush_under_lock(instance)
}

/// Post-update signal: identical to post-mount.
pub fn on_post_update(instance: &Rc<dyn HostInstance>) -> Result<(), HookError> {
    flush_under_lock(instance)
}

fn flush_under_lock(instance: &Rc<dyn HostInstance>) -> Result<(), HookError> {
    let id = InstanceId::of(instance);
    cursor::run_locked(id, || effect::flush(id))
}

/// Pre-unmount signal: runs every registered cleanup in slot order, then
/// destroys the instance's slot storage. Later slot operations on this
/// instance fail with [`HookError::OutsideExecutionContext`].
pub fn on_pre_unmount(instance: &Rc<dyn HostInstance>) -> Result<(), HookError> {
    let id = InstanceId::of(instance);
    cursor::run_locked(id, || {
        effect::flush_cleanups(id)?;
        memory::release(id);
        Ok(())
    })
}

/// Runs `body` (the component function) under the instance's lock with the
/// rendering flag set, returning its value unchanged. Lock and flag are
/// released when `body` returns.
pub fn on_render_invoke<R>(instance: &Rc<dyn HostInstance>, body: impl FnOnce() -> R) -> R {
    let id = InstanceId::of(instance);
    cursor::run_locked(id, || {
        cursor::begin_render();
        let result = body();
        cursor::end_render();
        result
    })
}

/// Ends the render phase and releases the execution lock at the host's true
/// commit point. Consuming the handle is the release; `unlock` itself is
/// idempotent, so a stray extra release elsewhere is harmless.
#[must_use = "dropping a RenderRelease without calling release() leaves the execution lock held"]
pub struct RenderRelease {
    _private: (),
}

impl RenderRelease {
    pub fn release(self) {
        cursor::end_render();
        cursor::unlock();
    }
}

/// Like [`on_render_invoke`], for hosts that post-process the render result
/// before committing: the lock and rendering flag stay held after `body`
/// returns, until the [`RenderRelease`] passed to `body` is released.
pub fn on_render_invoke_deferred<R>(
    instance: &Rc<dyn HostInstance>,
    body: impl FnOnce(RenderRelease) -> R,
) -> R {
    let id = InstanceId::of(instance);
    cursor::lock(id);
    cursor::begin_render();
    body(RenderRelease { _private: () })
}
