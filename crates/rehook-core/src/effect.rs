//! Effect slots: declaration, dependency diffing, flush, and unmount cleanup.

use crate::cursor;
use crate::equality::{shallow_eq, DepsKey};
use crate::memory::{self, Cleanup, EffectFn, EffectRecord, InstanceId};
use crate::HookError;

/// Handed to an effect action so it can register its cleanup.
#[derive(Clone, Copy, Debug, Default)]
pub struct EffectScope;

/// What an effect action hands back: optionally, a cleanup that runs before
/// the action is re-applied and once more on unmount.
#[derive(Default)]
pub struct EffectResult {
    cleanup: Option<Cleanup>,
}

impl EffectScope {
    pub fn on_cleanup(&self, cleanup: impl FnOnce() + 'static) -> EffectResult {
        EffectResult {
            cleanup: Some(Box::new(cleanup)),
        }
    }
}

impl EffectResult {
    fn into_cleanup(self) -> Option<Cleanup> {
        self.cleanup
    }
}

/// Declares (or revisits) the next effect slot of the currently locked
/// instance. Nothing executes here; execution is deferred to the flush that
/// follows the next mount or update signal.
///
/// `deps == None` re-arms the effect on every pass. A key that differs from
/// the stored one by shallow comparison (length mismatch counts as
/// different) marks the record dirty and installs the new action and key.
/// A shallow-equal key leaves the record fully untouched: the previously
/// installed closure stays in place, so callers must not rely on the latest
/// closure being the one that would run.
pub fn use_effect<F>(action: F, deps: Option<DepsKey>) -> Result<(), HookError>
where
    F: FnOnce(EffectScope) -> EffectResult + 'static,
{
    let id = cursor::guard()?;
    let slot = cursor::next_effect_slot();
    let action: EffectFn = Box::new(move || action(EffectScope).into_cleanup());
    memory::with_memory(id, move |memory| {
        if slot == memory.effects.len() {
            memory.effects.push(EffectRecord {
                action: Some(action),
                deps,
                dirty: true,
                cleanup: None,
            });
            return;
        }
        let record = &mut memory.effects[slot];
        let changed = match (&record.deps, &deps) {
            (Some(stored), Some(next)) => !shallow_eq(stored, next),
            _ => true,
        };
        if changed {
            record.dirty = true;
            record.action = Some(action);
            record.deps = deps;
        }
    })
}

/// Runs every dirty record in slot order: the prior cleanup first, then the
/// action, whose returned cleanup is stored for the next run. Clean records
/// are skipped entirely. A panic inside an action or cleanup propagates to
/// the caller and aborts the rest of the pass; effects applied before the
/// failing slot stay applied.
pub(crate) fn flush(id: InstanceId) -> Result<(), HookError> {
    cursor::guard()?;
    let mut slot = 0;
    loop {
        // Borrow the store only long enough to claim the next dirty record;
        // the action runs with no borrow held so it may re-enter the runtime.
        let claimed = memory::with_memory(id, |memory| {
            while slot < memory.effects.len() {
                let record = &mut memory.effects[slot];
                if record.dirty {
                    record.dirty = false;
                    return Some((record.cleanup.take(), record.action.take()));
                }
                slot += 1;
            }
            None
        })?;
        let Some((cleanup, action)) = claimed else {
            return Ok(());
        };
        log::trace!("flushing effect slot {slot} for {id:?}");
        if let Some(cleanup) = cleanup {
            cleanup();
        }
        let next_cleanup = action.and_then(|action| action());
        memory::with_memory(id, |memory| {
            memory.effects[slot].cleanup = next_cleanup;
        })?;
        slot += 1;
    }
}

/// Runs every stored cleanup in slot order, regardless of dirtiness, without
/// re-running any action. Invoked once, on the unmount signal, before the
/// storage is destroyed.
pub(crate) fn flush_cleanups(id: InstanceId) -> Result<(), HookError> {
    cursor::guard()?;
    let mut slot = 0;
    loop {
        let cleanup = memory::with_memory(id, |memory| {
            while slot < memory.effects.len() {
                if let Some(cleanup) = memory.effects[slot].cleanup.take() {
                    return Some(cleanup);
                }
                slot += 1;
            }
            None
        })?;
        let Some(cleanup) = cleanup else {
            return Ok(());
        };
        cleanup();
        slot += 1;
    }
}
