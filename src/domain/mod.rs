pub mod entity;
pub mod generator;
pub mod physics;
pub mod rules;
