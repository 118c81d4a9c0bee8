//! Store entities and their create/update payloads

pub mod activation;
pub mod auth_session;
pub mod daily_active_user;
pub mod email_verification;
pub mod user;

// Re-export for convenience
pub use activation::{Activation, NewActivation, UpdateActivation};
pub use auth_session::{AuthSession, NewAuthSession, UpdateAuthSession};
pub use daily_active_user::{DailyActiveUser, NewDailyActiveUser, UpdateDailyActiveUser, date_key};
pub use email_verification::{EmailVerification, NewEmailVerification, UpdateEmailVerification};
pub use user::{NewUser, UpdateUser, User};
