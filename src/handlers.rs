pub mod calculator;
pub mod payments;
pub mod profile;
pub mod quotes;
pub mod settings;
pub mod status;
pub mod webhook;
