pub mod fs;
pub(crate) mod redact;
