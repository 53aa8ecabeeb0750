pub mod audit;
pub mod checksum;
pub mod core_api;
pub mod image;
pub mod layout;
pub mod reader;
pub mod section;
