pub mod analyze;
pub mod catches;
pub mod forecast;
pub mod status;
