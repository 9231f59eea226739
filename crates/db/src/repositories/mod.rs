//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod domain_answer_repo;
pub mod domain_question_repo;
pub mod image_repo;
pub mod insight_repo;
pub mod onboarding_answer_repo;
pub mod onboarding_question_repo;
pub mod onboarding_session_repo;
pub mod refresh_token_repo;
pub mod subscription_repo;
pub mod user_repo;

pub use domain_answer_repo::DomainAnswerRepo;
pub use domain_question_repo::DomainQuestionRepo;
pub use image_repo::ImageRepo;
pub use insight_repo::InsightRepo;
pub use onboarding_answer_repo::OnboardingAnswerRepo;
pub use onboarding_question_repo::OnboardingQuestionRepo;
pub use onboarding_session_repo::OnboardingSessionRepo;
pub use refresh_token_repo::RefreshTokenRepo;
pub use subscription_repo::SubscriptionRepo;
pub use user_repo::UserRepo;
