//! End-to-end tests exercising the public surface: write a dataset,
//! catalog it, and read regions back through the full plan.

mod end_to_end;
mod spacetime;
