//! Material optimization for rebar fabrication: splice planning for
//! continuous bar runs and one-dimensional cutting-stock optimization over
//! new stock and reusable yard offcuts.
//!
//! The pipeline is a single synchronous [`solver::Solver::solve`] call:
//! runs are split into stock-length pieces with laps placed inside
//! code-permitted zones, the resulting pieces plus fixed pieces become cut
//! requests, and a Monte Carlo-driven best-fit-decreasing packer turns the
//! requests into cutting patterns, a procurement list, and waste metrics.

pub mod error;
pub mod packing;
pub mod project;
pub mod render;
pub mod rules;
pub mod solver;
pub mod splice;
pub mod types;
