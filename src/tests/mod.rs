//! Internal test modules - whitebox tests with crate access
//!
//! Engine-level scenarios driven through `test_harness::RevealHarness`, plus
//! property tests that need crate-private constructors.


// Whitebox property tests
mod engine_properties;
