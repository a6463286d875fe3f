pub mod engine;
pub mod geo;
pub mod policy;
pub mod timesheet;
