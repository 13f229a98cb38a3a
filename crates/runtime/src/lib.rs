//! Runtime utilities for bridgescope.
#![allow(missing_docs)]

pub mod health;
pub mod shutdown;
