mod flood_data;

pub use flood_data::*;
