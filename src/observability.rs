//! Structured logging shims.
//!
//! All events go through `tracing` under the single target `"tessera"`,
//! carrying a snake_case `event` field and a `component` naming the
//! subsystem (`"catalog"`, `"layer"`). The crate never installs a global
//! subscriber; embedding applications configure one themselves, e.g. with
//! `tracing_subscriber`.
//!
//! Use `%` for `Display` fields and `?` for `Debug` fields. Only the
//! levels the crate emits have shims; add more as call sites appear.

/// Target for all tessera log events.
pub(crate) const TESSERA_TARGET: &str = "tessera";

/// Info-level event, e.g. a completed layer write:
///
/// ```ignore
/// log_info!(
///     component = "layer",
///     event = "layer_written",
///     layer = %id,
///     records = rows.len(),
/// );
/// ```
macro_rules! log_info {
    ($($field:tt)*) => {
        ::tracing::info!(target: $crate::observability::TESSERA_TARGET, $($field)*)
    };
}

/// Debug-level event.
macro_rules! log_debug {
    ($($field:tt)*) => {
        ::tracing::debug!(target: $crate::observability::TESSERA_TARGET, $($field)*)
    };
}

/// Warn-level event.
macro_rules! log_warn {
    ($($field:tt)*) => {
        ::tracing::warn!(target: $crate::observability::TESSERA_TARGET, $($field)*)
    };
}

pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
