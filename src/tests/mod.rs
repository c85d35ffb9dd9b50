//! Integration suites exercising the kernel end to end.

mod archive_roundtrip;
mod canonical_laws;
mod fuzz;
mod handle_surface;
mod normal_forms;
mod rewrite_pipeline;
