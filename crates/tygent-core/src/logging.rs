//! Structured tracing macros for the Tygent engine.
//!
//! Each macro targets one subsystem so consumers can filter per target
//! (e.g. `RUST_LOG=tygent::scheduler=debug`). When the `no-trace` feature
//! is enabled, all macros compile to nothing for zero overhead in
//! benchmark builds.

// ---- With tracing enabled (default) ----

/// Trace DAG construction and validation events.
#[cfg(not(feature = "no-trace"))]
#[macro_export]
macro_rules! tygent_dag {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "tygent::dag", $($arg)*)
    }
}

/// Trace scheduler-level events (wave planning, frontier updates).
#[cfg(not(feature = "no-trace"))]
#[macro_export]
macro_rules! tygent_sched {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "tygent::scheduler", $($arg)*)
    }
}

/// Trace node dispatch and completion.
#[cfg(not(feature = "no-trace"))]
#[macro_export]
macro_rules! tygent_node {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "tygent::nodes", $($arg)*)
    }
}

/// Trace model requests and responses.
#[cfg(not(feature = "no-trace"))]
#[macro_export]
macro_rules! tygent_model {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "tygent::model", $($arg)*)
    }
}

/// Trace shared memory reads, staged writes, and wave commits.
#[cfg(not(feature = "no-trace"))]
#[macro_export]
macro_rules! tygent_mem {
    ($level:ident, $($arg:tt)*) => {
        tracing::$level!(target: "tygent::memory", $($arg)*)
    }
}

// ---- With tracing disabled (no-trace feature) ----

/// Trace DAG construction events - compiles to nothing when no-trace is enabled.
#[cfg(feature = "no-trace")]
#[macro_export]
macro_rules! tygent_dag {
    ($level:ident, $($arg:tt)*) => {};
}

/// Trace scheduler-level events - compiles to nothing when no-trace is enabled.
#[cfg(feature = "no-trace")]
#[macro_export]
macro_rules! tygent_sched {
    ($level:ident, $($arg:tt)*) => {};
}

/// Trace node dispatch/completion - compiles to nothing when no-trace is enabled.
#[cfg(feature = "no-trace")]
#[macro_export]
macro_rules! tygent_node {
    ($level:ident, $($arg:tt)*) => {};
}

/// Trace model requests and responses - compiles to nothing when no-trace is enabled.
#[cfg(feature = "no-trace")]
#[macro_export]
macro_rules! tygent_model {
    ($level:ident, $($arg:tt)*) => {};
}

/// Trace shared memory activity - compiles to nothing when no-trace is enabled.
#[cfg(feature = "no-trace")]
#[macro_export]
macro_rules! tygent_mem {
    ($level:ident, $($arg:tt)*) => {};
}
