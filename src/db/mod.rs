pub mod connection;
pub mod inbox_file;
pub mod migrations;
pub mod records;

pub use inbox_file::TextLines;
pub use records::*;
