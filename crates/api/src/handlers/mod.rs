pub mod auth;
pub mod domains;
pub mod iap;
pub mod images;
pub mod insights;
pub mod legal;
pub mod onboarding;
pub mod plans;
pub mod subscriptions;
pub mod users;
