pub mod auth;
pub mod bookings;
pub mod calendar;
pub mod flights;
pub mod health;
pub mod hotels;
pub mod pricing;
