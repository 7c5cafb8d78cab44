pub mod command_exec;
pub mod private_file;
pub mod random;
