mod flood_data_handler;

pub use flood_data_handler::*;
