pub mod risk;
pub mod stage;
