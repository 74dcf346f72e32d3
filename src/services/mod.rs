pub mod calendar;
pub mod extras;
pub mod filter_engine;
pub mod pricing;
pub mod ticket;
pub mod travel_api;
