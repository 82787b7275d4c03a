#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless Bunny Hop presentation layer.
//!
//! The [`Animator`] stands in for the animated character: it receives
//! dispatched actions and streams frame-granular positions back to the world.
//! A [`Session`] wires the world and all systems together and drives them with
//! simulated frame time.

mod animator;
mod report;
mod session;

pub use animator::Animator;
pub use report::RunReport;
pub use session::Session;
