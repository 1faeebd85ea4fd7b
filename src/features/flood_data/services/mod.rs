mod flood_data_service;

pub use flood_data_service::FloodDataService;
