//! Application-level orchestration.
//!
//! This module owns the run lifecycle (start/pause/reset), the configuration lock
//! and statistics sampling. UI/CLI layers talk to it through [`ControlCommand`]s and
//! receive [`crate::model::SortEvent`]s back.

mod controller;

pub(crate) use controller::{run_controller, ControlCommand, Controller, SPEED_MAX, SPEED_MIN};
