//! Authentication core: password credentials, bearer tokens and password resets.

mod credentials;
pub mod notifier;
mod reset;
mod token;

pub use credentials::Credentials;
pub use notifier::{LogNotifier, NotifyError, ResetNotifier, SmtpNotifier, notifier_from_env};
pub use reset::ResetFlow;
pub use token::{Claims, IssuedToken, TokenError, TokenIssuer};
