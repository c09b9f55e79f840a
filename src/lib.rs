// THEORY:
// This file is the main entry point for the `shift_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the
// public API that will be exposed to external consumers (like the CLI
// binary shipped in this package).
//
// The primary goal is to export the `DiffPipeline` and its associated data
// structures (`DiffConfig`, `DiffReport`, `MatchPair`) as the clean,
// high-level interface for the block-matching engine, together with the
// report consumers (`emitter`, `overlay`). The building blocks live in
// `core_modules` and stay available for callers that want to drive the
// grid and chunk machinery directly.

pub mod core_modules;
pub mod emitter;
pub mod overlay;
pub mod parallel_pipeline;
pub mod pipeline;
