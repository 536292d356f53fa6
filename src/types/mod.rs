//! 类型模块：与厂商无关的会话数据类型。
//!
//! # Types Module
//!
//! Provider-neutral conversation types. Adapters translate these into each
//! provider's wire shape.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | One turn with role and text content |
//! | [`MessageRole`] | `user` or `assistant` |
//! | [`ConversationPayload`] | Ordered turns plus optional system instruction |

pub mod message;

pub use message::{ConversationPayload, Message, MessageRole};
