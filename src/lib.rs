#![doc(test(attr(deny(warnings))))]

//! Registration Core drives a conference registration form: field
//! dependencies, activity selection with schedule conflicts and a running
//! total, and inline validation gating submission. The form talks to its
//! display through [`form::PresentationSurface`], so the same core backs the
//! terminal shell and headless tests.

pub mod cli;
pub mod config;
pub mod errors;
pub mod form;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Registration Core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
