pub mod generation;
pub mod health;
