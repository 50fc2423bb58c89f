//! Per-model-family capability flags.
//!
//! Some chat templates reject a system role or insist on strict user/assistant
//! alternation; callers shape their messages from these flags.
//!
//! ```rust
//! use tprotocol::{ModelFlags, model_flags};
//!
//! let flags = model_flags("gemma2");
//! assert!(flags.contains(ModelFlags::NO_SYSTEM_ROLE));
//! assert!(!flags.contains(ModelFlags::TOOL_RESPONSE));
//! assert_eq!(model_flags("phi3"), ModelFlags::DEFAULT);
//! ```

use std::fmt::{Debug, Formatter};
use std::ops::{BitOr, BitOrAssign};

/// Metadata key under which the model family is reported.
pub const MODEL_TYPE_FIELD: &str = "tether.model_type";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ModelFlags(u8);

impl ModelFlags {
    pub const DEFAULT: Self = Self(0);
    /// The chat template has no system role.
    pub const NO_SYSTEM_ROLE: Self = Self(1);
    /// Roles must alternate strictly between user and assistant.
    pub const USER_ASSISTANT_ALT: Self = Self(1 << 1);
    /// Tool results go back as `tool` role messages.
    pub const TOOL_RESPONSE: Self = Self(1 << 2);

    pub const fn bits(&self) -> u8 {
        self.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl BitOr for ModelFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        self.union(rhs)
    }
}

impl BitOrAssign for ModelFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.union(rhs);
    }
}

impl Debug for ModelFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names = [
            (Self::NO_SYSTEM_ROLE, "NO_SYSTEM_ROLE"),
            (Self::USER_ASSISTANT_ALT, "USER_ASSISTANT_ALT"),
            (Self::TOOL_RESPONSE, "TOOL_RESPONSE"),
        ]
        .into_iter()
        .filter(|(flag, _)| self.contains(*flag))
        .map(|(_, name)| name)
        .collect::<Vec<_>>();

        if names.is_empty() {
            f.write_str("ModelFlags(DEFAULT)")
        } else {
            write!(f, "ModelFlags({})", names.join(" | "))
        }
    }
}

const STRICT_CHAT: ModelFlags = ModelFlags::NO_SYSTEM_ROLE.union(ModelFlags::USER_ASSISTANT_ALT);

// Llama accepts tool-role messages poorly; it gets assistant-style responses.
const FLAGS_LOOKUP: &[(&str, ModelFlags)] = &[
    ("llama", STRICT_CHAT),
    ("gemma", STRICT_CHAT),
    ("gemma2", STRICT_CHAT),
    ("mixtral", STRICT_CHAT),
    ("mistral", STRICT_CHAT),
];

/// Flags for a model family, [`ModelFlags::DEFAULT`] when the family is unknown.
pub fn model_flags(model_type: &str) -> ModelFlags {
    FLAGS_LOOKUP
        .iter()
        .find(|(name, _)| *name == model_type)
        .map(|(_, flags)| *flags)
        .unwrap_or(ModelFlags::DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_families_get_strict_chat_flags() {
        for family in ["llama", "gemma", "gemma2", "mixtral", "mistral"] {
            let flags = model_flags(family);
            assert!(flags.contains(ModelFlags::NO_SYSTEM_ROLE), "{family}");
            assert!(flags.contains(ModelFlags::USER_ASSISTANT_ALT), "{family}");
            assert!(!flags.contains(ModelFlags::TOOL_RESPONSE), "{family}");
        }
    }

    #[test]
    fn unknown_family_defaults_to_empty() {
        let flags = model_flags("qwen2");
        assert!(flags.is_empty());
        assert_eq!(format!("{flags:?}"), "ModelFlags(DEFAULT)");
    }

    #[test]
    fn bit_operations_compose() {
        let mut flags = ModelFlags::TOOL_RESPONSE;
        flags |= ModelFlags::NO_SYSTEM_ROLE;

        assert!(flags.contains(ModelFlags::TOOL_RESPONSE | ModelFlags::NO_SYSTEM_ROLE));
        assert!(!flags.contains(ModelFlags::USER_ASSISTANT_ALT));
        assert_eq!(format!("{flags:?}"), "ModelFlags(NO_SYSTEM_ROLE | TOOL_RESPONSE)");
    }
}
