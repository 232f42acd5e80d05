pub mod log;
pub mod smtp;

pub use self::log::LogNotifier;
pub use self::smtp::SmtpNotifier;
