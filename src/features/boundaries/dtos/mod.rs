mod boundary_dto;

pub use boundary_dto::*;
