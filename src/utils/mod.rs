pub mod fs;
pub mod shell;
