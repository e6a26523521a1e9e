//! Application state shared by every screen: current language, current theme
//! and the translation table, persisted through a [`KeyValueStore`].
//!
//! In-memory state always changes first; a store that cannot be written only
//! costs persistence, never the change itself.

pub mod store;
pub mod theme;

use thiserror::Error;

use crate::i18n::{self, Language, Section, TranslationTable, Translator};

pub use store::{FileStore, KeyValueStore, MemoryStore};
pub use theme::{THEMES, Theme, find_theme};

pub const LANGUAGE_KEY: &str = "repair_ai.language";
pub const THEME_KEY: &str = "repair_ai.theme";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("unknown language '{0}'")]
    UnknownLanguage(String),
    #[error("unknown theme '{0}'")]
    UnknownTheme(String),
}

pub struct AppContext {
    store: Box<dyn KeyValueStore>,
    table: TranslationTable,
    language: &'static Language,
    theme: &'static Theme,
}

impl AppContext {
    /// Restore language and theme from `store`. Unknown or unreadable values
    /// leave the defaults (`en`, `dark`) in place.
    pub fn load(store: impl KeyValueStore + 'static, table: TranslationTable) -> Self {
        let language = read_key(&store, LANGUAGE_KEY)
            .and_then(|key| i18n::find_language(&key))
            .unwrap_or_else(i18n::catalog::default_language);
        let theme = read_key(&store, THEME_KEY)
            .and_then(|key| theme::find_theme(&key))
            .unwrap_or_else(theme::default_theme);

        Self {
            store: Box::new(store),
            table,
            language,
            theme,
        }
    }

    pub fn language(&self) -> &'static Language {
        self.language
    }

    pub fn theme(&self) -> &'static Theme {
        self.theme
    }

    pub fn table(&self) -> &TranslationTable {
        &self.table
    }

    pub fn set_language(&mut self, key: &str) -> Result<&'static Language, ContextError> {
        let language =
            i18n::find_language(key).ok_or_else(|| ContextError::UnknownLanguage(key.to_string()))?;
        self.language = language;
        self.persist(LANGUAGE_KEY, language.key);
        Ok(language)
    }

    pub fn set_theme(&mut self, key: &str) -> Result<&'static Theme, ContextError> {
        let theme =
            theme::find_theme(key).ok_or_else(|| ContextError::UnknownTheme(key.to_string()))?;
        self.theme = theme;
        self.persist(THEME_KEY, theme.key);
        Ok(theme)
    }

    /// Advance to the next theme: dark → light → ocean → sakura → dark.
    pub fn toggle_theme(&mut self) -> &'static Theme {
        let next = theme::next_theme(self.theme.key);
        self.theme = next;
        self.persist(THEME_KEY, next.key);
        next
    }

    pub fn translator(&self) -> Translator<'_> {
        Translator::new(&self.table, self.language.key)
    }

    pub fn t(&self, key_path: &str, section: Section) -> String {
        self.translator().t(key_path, section)
    }

    pub fn t_list(&self, key_path: &str, section: Section) -> Vec<String> {
        self.translator().t_list(key_path, section)
    }

    fn persist(&self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value) {
            eprintln!("[repair-ai] failed to save {key}: {err:#}");
        }
    }
}

fn read_key(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key) {
        Ok(value) => value,
        Err(err) => {
            eprintln!("[repair-ai] failed to load {key}: {err:#}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Store whose every operation fails.
    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("disk on fire")
        }

        fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("disk on fire")
        }
    }

    fn table() -> TranslationTable {
        TranslationTable::builtin().unwrap()
    }

    #[test]
    fn defaults_on_empty_store() {
        let ctx = AppContext::load(MemoryStore::new(), table());
        assert_eq!(ctx.language().key, "en");
        assert_eq!(ctx.theme().key, "dark");
    }

    #[test]
    fn restores_stored_values() {
        let store = MemoryStore::new();
        store.set(LANGUAGE_KEY, "hi").unwrap();
        store.set(THEME_KEY, "sakura").unwrap();

        let ctx = AppContext::load(store, table());
        assert_eq!(ctx.language().key, "hi");
        assert_eq!(ctx.theme().name, "Sakura Dreams");
    }

    #[test]
    fn ignores_unknown_stored_values() {
        let store = MemoryStore::new();
        store.set(LANGUAGE_KEY, "klingon").unwrap();
        store.set(THEME_KEY, "neon").unwrap();

        let ctx = AppContext::load(store, table());
        assert_eq!(ctx.language().key, "en");
        assert_eq!(ctx.theme().key, "dark");
    }

    #[test]
    fn unknown_language_is_rejected_without_change() {
        let mut ctx = AppContext::load(MemoryStore::new(), table());
        ctx.set_language("fr").unwrap();

        let err = ctx.set_language("xx").unwrap_err();
        assert_eq!(err, ContextError::UnknownLanguage("xx".into()));
        assert_eq!(ctx.language().key, "fr");
    }

    #[test]
    fn broken_store_keeps_in_memory_changes() {
        let mut ctx = AppContext::load(BrokenStore, table());
        assert_eq!(ctx.language().key, "en");

        ctx.set_language("de").unwrap();
        assert_eq!(ctx.language().key, "de");
        assert_eq!(ctx.toggle_theme().key, "light");
    }

    #[test]
    fn toggle_cycles_through_all_themes() {
        let mut ctx = AppContext::load(MemoryStore::new(), table());
        let keys: Vec<&str> = (0..4).map(|_| ctx.toggle_theme().key).collect();
        assert_eq!(keys, vec!["light", "ocean", "sakura", "dark"]);
        assert!(ctx.set_theme("mauve").is_err());
    }

    #[test]
    fn translates_with_current_language() {
        let mut ctx = AppContext::load(MemoryStore::new(), table());
        assert_eq!(ctx.t("subtitle", Section::Home), "Your Exotic AI Repair Assistant");
        ctx.set_language("fr").unwrap();
        assert_eq!(ctx.translator().language(), "fr");
        assert_eq!(
            ctx.t("subtitle", Section::Home),
            "Votre Assistant de Réparation IA Exotique"
        );
        // Missing in French, so English comes back.
        assert_eq!(
            ctx.t("stats.title", Section::Home),
            ctx.table().resolve("stats.title", Section::Home, "en")
        );
    }
}
