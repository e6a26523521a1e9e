//! Static catalog of UI languages.

/// Short key of the language every section must fully cover.
pub const DEFAULT_LANGUAGE: &str = "en";

/// A selectable UI language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    /// Short key indexing the translation table (`"en"`).
    pub key: &'static str,
    /// Locale tag handed to text-to-speech (`"en-US"`).
    pub code: &'static str,
    /// English name of the language.
    pub display_name: &'static str,
    /// Name of the language in that language.
    pub native_name: &'static str,
    /// Flag glyph shown next to the name.
    pub flag: &'static str,
}

pub const LANGUAGES: &[Language] = &[
    Language {
        key: "en",
        code: "en-US",
        display_name: "English",
        native_name: "English",
        flag: "🇺🇸",
    },
    Language {
        key: "hi",
        code: "hi-IN",
        display_name: "Hindi",
        native_name: "हिन्दी",
        flag: "🇮🇳",
    },
    Language {
        key: "fr",
        code: "fr-FR",
        display_name: "French",
        native_name: "Français",
        flag: "🇫🇷",
    },
    Language {
        key: "de",
        code: "de-DE",
        display_name: "German",
        native_name: "Deutsch",
        flag: "🇩🇪",
    },
    Language {
        key: "es",
        code: "es-ES",
        display_name: "Spanish",
        native_name: "Español",
        flag: "🇪🇸",
    },
    Language {
        key: "ur",
        code: "ur-PK",
        display_name: "Urdu",
        native_name: "اردو",
        flag: "🇵🇰",
    },
    Language {
        key: "ko",
        code: "ko-KR",
        display_name: "Korean",
        native_name: "한국어",
        flag: "🇰🇷",
    },
    Language {
        key: "zh",
        code: "zh-CN",
        display_name: "Chinese",
        native_name: "中文",
        flag: "🇨🇳",
    },
    Language {
        key: "ja",
        code: "ja-JP",
        display_name: "Japanese",
        native_name: "日本語",
        flag: "🇯🇵",
    },
];

/// Look up a language by its short key.
pub fn find_language(key: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|lang| lang.key == key)
}

/// The default (English) catalog entry.
pub fn default_language() -> &'static Language {
    &LANGUAGES[0]
}
