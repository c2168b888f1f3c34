//! Codec configuration.

/// What `decode` hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Views that decode each attribute on first access.
    #[default]
    Lazy,
    /// Fully materialized immutable objects, detached from the generic tree.
    Eager,
}

/// Options fixed for the lifetime of a registry, across schema generations.
#[derive(Debug, Clone, Default)]
pub struct CodecOptions {
    pub decode_mode: DecodeMode,
}

impl CodecOptions {
    pub fn eager() -> Self {
        Self {
            decode_mode: DecodeMode::Eager,
        }
    }
}
