pub mod compile;
pub mod init;
pub mod tree;

pub use compile::{compile, CompileArgs};
pub use init::{init, InitArgs};
pub use tree::{tree, TreeArgs};
