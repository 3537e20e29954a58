pub mod profile_repo;
pub use profile_repo::ProfileRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod subscription_repo;
pub use subscription_repo::SubscriptionRepository;
