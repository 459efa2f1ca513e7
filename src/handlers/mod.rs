// handlers/mod.rs - JSON controllers
//
// `resources` holds the generic actions; each resource module only names its
// record class, permitted attributes and lookup data.
pub mod home;
pub mod jobs;
pub mod resources;
pub mod time_periods;

pub use resources::{Action, ResourcesController};
