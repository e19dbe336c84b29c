pub mod item;
pub mod maintenance;

pub use item::*;
pub use maintenance::*;
