//! Arithmetic over lane-arena slots.
//!
//! Every operation here runs directly on the lanes addressed by the slots
//! involved — no allocation on the hot path. Where an operation has both an
//! in-place and an out-of-place form, the out-of-place form is safe to call
//! with `out` aliasing an input unless documented otherwise; the two
//! structurally alias-unsafe operations (cross product, matrix multiply)
//! panic when handed an aliasing output.

pub mod color;
pub mod matrix;
pub mod vector;
