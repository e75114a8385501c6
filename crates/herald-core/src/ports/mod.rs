//! Ports - 抽象化レイヤー
//!
//! 外部システム（メッセージ送信、時刻、ID 生成）へのインターフェース。

pub mod clock;
pub mod handler;
pub mod id_generator;
pub mod sender;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::handler::{FnHandler, ItemHandler, handler_fn};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::sender::MessageSender;
