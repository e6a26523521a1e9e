//! Color themes.

pub const DEFAULT_THEME: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub key: &'static str,
    pub name: &'static str,
    pub primary: &'static str,
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
}

/// In toggle order.
pub const THEMES: &[Theme] = &[
    Theme {
        key: "dark",
        name: "Midnight Obsidian",
        primary: "#6366f1",
        background: "#0a0a0b",
        surface: "#1a1a1b",
        text: "#ffffff",
        accent: "#f59e0b",
    },
    Theme {
        key: "light",
        name: "Arctic White",
        primary: "#3b82f6",
        background: "#ffffff",
        surface: "#f8fafc",
        text: "#1e293b",
        accent: "#f59e0b",
    },
    Theme {
        key: "ocean",
        name: "Ocean Depths",
        primary: "#0ea5e9",
        background: "#0c1222",
        surface: "#1e293b",
        text: "#f1f5f9",
        accent: "#06b6d4",
    },
    Theme {
        key: "sakura",
        name: "Sakura Dreams",
        primary: "#ec4899",
        background: "#fdf2f8",
        surface: "#fce7f3",
        text: "#831843",
        accent: "#8b5cf6",
    },
];

pub fn find_theme(key: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|theme| theme.key == key)
}

pub fn default_theme() -> &'static Theme {
    &THEMES[0]
}

/// The theme after `key` in toggle order, wrapping around. Unknown keys
/// restart the cycle.
pub fn next_theme(key: &str) -> &'static Theme {
    let index = THEMES.iter().position(|theme| theme.key == key);
    match index {
        Some(i) => &THEMES[(i + 1) % THEMES.len()],
        None => default_theme(),
    }
}
