//! Workbasket: a client-side controller for queue-resident work items on a
//! remote business-process engine.
//!
//! The engine owns every task. This crate discovers what the engine exposes,
//! reads queues and steps, and drives tasks through the engine's optimistic
//! concurrency protocol: lock with the current version token, stage
//! validated changes, commit or abort, and find the task again once the
//! engine has moved it.
//!
//! # Architecture
//!
//! Workbasket follows hexagonal architecture principles:
//!
//! - **Domain**: Wire-shaped values and validation with no transport code
//! - **Ports**: Async trait interfaces for the engine, discovery and directory
//! - **Adapters**: REST implementations over [`rest::RestClient`] and
//!   in-memory implementations for tests
//!
//! # Modules
//!
//! - [`catalog`]: Appspace, queue and template discovery; directory lookup
//! - [`task`]: Task lifecycle control, relocation and workflow launch
//! - [`rest`]: Authenticated HTTP transport
//! - [`config`]: Session settings
//! - [`telemetry`]: Tracing subscriber setup

pub mod catalog;
pub mod config;
pub mod rest;
pub mod task;
pub mod telemetry;
