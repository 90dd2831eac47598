pub mod archive;
pub mod cli;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

pub use archive::AutoArchiver;
pub use config::Config;
pub use models::{Group, GroupFilter, GroupStatus, SectionData, Template};
pub use store::Store;
pub use utils::Profile;
