pub mod controller;
pub mod input;
pub mod round;
