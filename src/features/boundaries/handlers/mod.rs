mod boundary_handler;

pub use boundary_handler::*;
