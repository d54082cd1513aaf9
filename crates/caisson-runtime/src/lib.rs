//! Container launch orchestration for the Caisson runtime.
//!
//! The [`supervisor`] clones the [`launcher`] into fresh mount and PID
//! namespaces and blocks until it exits; the launcher stages the overlay
//! filesystem described by a [`container::Container`] and execs into the
//! requested command.

#![allow(unsafe_code)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod container;
pub mod launcher;
pub mod supervisor;
