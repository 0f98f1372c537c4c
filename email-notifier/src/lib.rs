pub mod notification;
pub mod smtp_notifier;

pub use notification::{compose_body, compose_subject};
pub use smtp_notifier::{SmtpConfig, SmtpNotifier};
