//! # Cubefield: ECS Cube Demo With a Physics Bridge
//!
//! A small entity-component-system, a fixed pipeline of gameplay systems, and
//! a bridge that keeps ECS transforms in step with a Rapier simulation.
//!
//! Start with `use cubefield::prelude::*` and either drive a [`World`](ecs::World)
//! yourself or run the whole demo through [`App`](app::App).

pub mod app;
pub mod components;
pub mod config;
pub mod ecs;
pub mod input;
pub mod math;
pub mod physics;
pub mod prelude;
pub mod render;
pub mod systems;
pub mod time;
