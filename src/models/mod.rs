pub mod account;
pub mod booking;
pub mod flight;
pub mod hotel;
pub mod search;
