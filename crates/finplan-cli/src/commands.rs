pub mod replay;
pub mod version;
