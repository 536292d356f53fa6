pub mod redact;

pub use redact::scrub;
