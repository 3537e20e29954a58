pub mod payment_gateway;
pub mod payment_service;
pub mod pricing;
pub mod profile_service;
pub mod quote_service;
pub mod subscription_service;
pub mod webhook_signature;
pub mod webhook_worker;
