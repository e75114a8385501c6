//! Impls - ports の実装（開発用）
//!
//! 本番の送信（WhatsApp Cloud API など）は別クレートで MessageSender を実装する。

pub mod log_sender;

pub use self::log_sender::TracingSender;
