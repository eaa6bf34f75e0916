pub mod booking;
pub mod business;
pub mod conference;
pub mod context;
pub mod envelope;
pub mod hints;
