pub mod calculator;
pub mod payment;
pub mod profile;
pub mod quote;
pub mod settings;
pub mod subscription;
