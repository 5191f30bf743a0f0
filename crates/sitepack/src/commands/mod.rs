pub mod build;
pub mod command;
pub mod init;
pub mod watch;
