//! Command implementations that do more than call into the library.

pub mod init;
