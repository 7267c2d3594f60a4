pub mod aggregate;
pub mod cache;
pub mod core_api;
pub mod extract;
pub mod job;
pub mod name_map;
pub mod record;
pub mod settings;
pub mod text;

mod persist;
