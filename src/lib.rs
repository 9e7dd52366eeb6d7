//! Reverse-geocode a map center into city, area and state, and list the open
//! food requests of a food-sharing service next to it.

pub mod address;
pub mod config;
pub mod food;
pub mod geocode;
pub mod record;
pub mod session;
pub mod view;
#[cfg(test)]
mod test_support;
