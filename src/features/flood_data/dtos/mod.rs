mod flood_data_dto;

pub use flood_data_dto::*;
