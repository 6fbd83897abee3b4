//! Course grade calculator: letter-grade resolution, pass/fail verdicts,
//! final-exam projections, and term GPA.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
