//! Slot-based state and effect runtime for replayed component functions.
//!
//! A component function is re-invoked from scratch on every render; this
//! crate gives that replay the illusion of persistent local variables
//! ([`use_state`]) and of run-once-until-inputs-change side effects
//! ([`use_effect`]). Storage is positional: the Nth slot-declaring call of a
//! pass always resolves to the Nth slot, so slot-declaring calls must happen
//! in the same order on every pass, never conditionally and never in loops of
//! varying length. Trailing slots left over by a shorter pass are never
//! reclaimed before unmount.
//!
//! The host framework stays outside the crate. It drives the runtime through
//! the lifecycle adapter ([`on_init`], [`on_post_mount`], [`on_post_update`],
//! [`on_pre_unmount`], [`on_render_invoke`]) and provides each instance's
//! [`HostInstance::request_rerender`]. Everything is single-threaded,
//! synchronous, and non-yielding; exactly one instance may hold the
//! execution lock at a time.

mod cursor;
mod effect;
pub mod equality;
mod lifecycle;
mod memory;
mod state;

pub use effect::{use_effect, EffectResult, EffectScope};
pub use equality::{shallow_eq, DepsKey, ExactEq};
pub use lifecycle::{
    on_init, on_post_mount, on_post_update, on_pre_unmount, on_render_invoke,
    on_render_invoke_deferred, HostInstance, RenderRelease,
};
pub use state::{use_state, StateSetter};

use std::fmt;

/// Errors surfaced by the slot primitives and the lifecycle adapter.
/// Every fault is synchronous, fatal to the caller, and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookError {
    /// A slot operation ran with no lock held, or the locked instance no
    /// longer has slot storage.
    OutsideExecutionContext,
    /// A state primitive ran outside an active render pass.
    NotRendering,
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookError::OutsideExecutionContext => {
                write!(f, "slot access outside of a component execution context")
            }
            HookError::NotRendering => {
                write!(
                    f,
                    "state slots may only be declared during an active render pass"
                )
            }
        }
    }
}

impl std::error::Error for HookError {}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/equality_tests.rs"]
mod equality_tests;
