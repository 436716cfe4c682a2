//=========================================================================
// Cyber Café Simulation — Library Root
//
// This crate defines the public API surface of the café simulation.
//
// Responsibilities:
// - Expose the runtime facade (`Cafe`, `CafeBuilder`)
// - Expose the pages a visitor moves through (`pages`)
// - Expose the simulation components for direct use and testing (`core`)
//
// Typical usage:
// ```no_run
// use cybercafe_sim::CafeBuilder;
//
// fn main() {
//     CafeBuilder::new().build().run();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains the simulation components and runtime plumbing.
// `pages` contains the screens registered in the runtime.
//
pub mod core;
pub mod pages;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `cafe` defines the runtime entry point and builder.
//
mod cafe;

//--- Public Exports ------------------------------------------------------

pub use cafe::{Cafe, CafeBuilder};
