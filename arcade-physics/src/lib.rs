pub mod geometry;
mod error;
pub use error::*;
mod config;
pub use config::*;
mod body;
pub use body::*;
mod collision;
pub use collision::*;
mod world;
pub use world::*;

pub(crate) fn default<T: Default>() -> T {
    T::default()
}
