pub mod mailer;
pub mod razorpay;

pub use mailer::{MemoryMailer, SmtpOtpMailer};
pub use razorpay::{MockGateway, RazorpayClient};
