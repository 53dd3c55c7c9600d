mod command_result;
pub mod find;
pub mod helper;
pub mod init;
pub mod trans;

pub use command_result::*;
