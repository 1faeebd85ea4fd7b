//! BNPB (national disaster agency) ArcGIS statistics client

mod client;

pub use client::{count, BnpbClient, BnpbQuery, HousingDamage, InfrastructureDamage};
