#![doc = include_str!("../README.md")]

mod config;
mod dispatcher;
mod error;
mod gate;
mod lifecycle;
mod merger;

pub use crate::config::*;
pub use crate::dispatcher::*;
pub use crate::error::*;
pub use crate::gate::*;
pub use crate::lifecycle::*;
pub use crate::merger::*;
