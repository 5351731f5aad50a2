pub mod catches;
pub mod forecast;
pub mod vision;
