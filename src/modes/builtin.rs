//! Fixed built-in assistant modes.
//!
//! The six built-in modes are a pre-seeded, immutable set identified by
//! well-known ids. [`builtin_prompt`] looks up the system prompt for an id;
//! [`general_prompt`] is the fallback used when an id resolves to neither a
//! built-in nor a custom mode.

// ---------------------------------------------------------------------------
// BuiltinMode
// ---------------------------------------------------------------------------

/// One entry of the built-in mode table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinMode {
    /// Well-known id (`"general"`, `"code"`, …).
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub system_prompt: &'static str,
    /// Display hint: hex color.
    pub color: &'static str,
    /// Display hint: icon name.
    pub icon: &'static str,
}

// ---------------------------------------------------------------------------
// Static mode definitions
// ---------------------------------------------------------------------------

/// Id of the fallback mode.
pub const GENERAL_MODE_ID: &str = "general";

static BUILTIN_MODES: &[BuiltinMode] = &[
    BuiltinMode {
        id: "general",
        name: "General",
        description: "Everyday questions and conversation",
        system_prompt: "You are a helpful, friendly AI assistant. Provide clear, concise \
                        answers to user questions.",
        color: "#8b5cf6",
        icon: "MessageCircle",
    },
    BuiltinMode {
        id: "code",
        name: "Code",
        description: "Programming help and debugging",
        system_prompt: "You are an expert programming assistant. Help with code, debugging, \
                        algorithms, and best practices. Provide code examples when helpful.",
        color: "#06b6d4",
        icon: "Code",
    },
    BuiltinMode {
        id: "creative",
        name: "Creative",
        description: "Writing, brainstorming and ideation",
        system_prompt: "You are a creative AI assistant specializing in writing, \
                        brainstorming, and creative problem-solving. Be imaginative and \
                        inspiring.",
        color: "#f59e0b",
        icon: "Lightbulb",
    },
    BuiltinMode {
        id: "analyst",
        name: "Analyst",
        description: "Analytical and data-driven thinking",
        system_prompt: "You are a data analyst and strategic thinker. Provide analytical \
                        insights, break down complex problems, and offer data-driven \
                        recommendations.",
        color: "#10b981",
        icon: "TrendingUp",
    },
    BuiltinMode {
        id: "health",
        name: "Health",
        description: "Wellness and lifestyle guidance",
        system_prompt: "You are a health and wellness assistant. Provide general health \
                        information, wellness tips, and lifestyle suggestions. Always remind \
                        users to consult healthcare professionals for medical advice.",
        color: "#ef4444",
        icon: "Heart",
    },
    BuiltinMode {
        id: "learning",
        name: "Learning",
        description: "Step-by-step tutoring",
        system_prompt: "You are an educational tutor. Explain concepts clearly, provide \
                        examples, and help users learn new topics step by step.",
        color: "#3b82f6",
        icon: "BookOpen",
    },
];

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// The ordered built-in mode table (always 6 entries).
pub fn builtin_modes() -> &'static [BuiltinMode] {
    BUILTIN_MODES
}

/// System prompt for a built-in mode id, or `None` when the id is unknown.
pub fn builtin_prompt(id: &str) -> Option<&'static str> {
    BUILTIN_MODES
        .iter()
        .find(|m| m.id == id)
        .map(|m| m.system_prompt)
}

/// The `general` system prompt — the resolution fallback of last resort.
pub fn general_prompt() -> &'static str {
    builtin_prompt(GENERAL_MODE_ID).expect("general mode is always present")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_six_fixed_entries_in_order() {
        let ids: Vec<_> = builtin_modes().iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            ["general", "code", "creative", "analyst", "health", "learning"]
        );
    }

    #[test]
    fn prompt_lookup_finds_known_ids() {
        assert!(builtin_prompt("code").unwrap().contains("programming"));
        assert!(builtin_prompt("health").unwrap().contains("healthcare professionals"));
    }

    #[test]
    fn prompt_lookup_unknown_id_is_none() {
        assert!(builtin_prompt("poetry").is_none());
        assert!(builtin_prompt("").is_none());
    }

    #[test]
    fn general_prompt_is_the_general_entry() {
        assert_eq!(general_prompt(), builtin_prompt("general").unwrap());
        assert!(general_prompt().contains("helpful, friendly"));
    }

    #[test]
    fn display_hints_are_populated() {
        for mode in builtin_modes() {
            assert!(mode.color.starts_with('#'));
            assert!(!mode.icon.is_empty());
            assert!(!mode.description.is_empty());
        }
    }
}
