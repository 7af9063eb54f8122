pub mod gate;
pub mod queries;
