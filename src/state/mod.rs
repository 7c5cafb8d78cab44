pub mod io;
pub mod types;

pub use io::{FilesystemStateStore, load_state, save_state, state_file_path};
pub use types::{Aws, Bosh, BoshInitState, KeyPair, Stack, State};

#[cfg(test)]
mod tests;
