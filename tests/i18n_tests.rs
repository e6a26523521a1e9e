/// Translation and UI state tests over the built-in string table.
use repair_ai::context::{AppContext, FileStore, KeyValueStore, LANGUAGE_KEY, THEME_KEY};
use repair_ai::i18n::{LANGUAGES, Section, TranslationTable};

const ENGLISH_KEYS: &[(Section, &str)] = &[
    (Section::Home, "title"),
    (Section::Home, "subtitle"),
    (Section::Home, "askCard.title"),
    (Section::Home, "detectCard.description"),
    (Section::Home, "features.neural.title"),
    (Section::Home, "stats.accuracy"),
    (Section::Home, "status.offline"),
    (Section::Ask, "placeholder"),
    (Section::Ask, "lowConfidence"),
    (Section::Detect, "button"),
    (Section::Detect, "emptyInput"),
];

fn table() -> TranslationTable {
    TranslationTable::builtin().unwrap()
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[test]
fn every_catalog_language_resolves_every_english_key() {
    let table = table();
    for language in LANGUAGES {
        for &(section, key) in ENGLISH_KEYS {
            let value = table.resolve(key, section, language.key);
            assert_ne!(value, key, "{}: {section}.{key} unresolved", language.key);
            assert!(!value.is_empty());
        }
    }
}

#[test]
fn missing_translation_falls_back_to_english() {
    let table = table();
    assert_eq!(
        table.resolve("stats.title", Section::Home, "hi"),
        table.resolve("stats.title", Section::Home, "en")
    );
    assert_eq!(
        table.resolve("button", Section::Ask, "ja"),
        "Get Answer"
    );
}

#[test]
fn own_translation_wins() {
    let table = table();
    assert_eq!(table.resolve("askCard.title", Section::Home, "es"), "Hacer Pregunta");
    assert_eq!(table.resolve("button", Section::Detect, "fr"), "Détecter les Anomalies");
}

#[test]
fn unknown_key_comes_back_verbatim() {
    let table = table();
    assert_eq!(
        table.resolve("nonexistent.key", Section::Ask, "hi"),
        "nonexistent.key"
    );
}

#[test]
fn resolution_is_idempotent() {
    let table = table();
    for language in ["en", "hi", "ko", "xx"] {
        for &(section, key) in ENGLISH_KEYS {
            assert_eq!(
                table.resolve(key, section, language),
                table.resolve(key, section, language)
            );
        }
    }
}

#[test]
fn how_to_instructions_are_a_list() {
    let table = table();
    let steps = table.resolve_list("howTo.instructions", Section::Home, "zh");
    assert_eq!(steps.len(), 4);
    assert!(steps[0].contains("Ask a Question"));
}

#[test]
fn english_is_fully_covered() {
    let table = table();
    for section in Section::ALL {
        let (translated, total) = table.coverage(section, "en");
        assert_eq!(translated, total);
        assert!(total > 0);
    }
}

// ---------------------------------------------------------------------------
// Persisted state
// ---------------------------------------------------------------------------

#[test]
fn language_and_theme_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut ctx = AppContext::load(FileStore::new(&path), table());
    ctx.set_language("ko").unwrap();
    ctx.set_theme("ocean").unwrap();
    drop(ctx);

    let ctx = AppContext::load(FileStore::new(&path), table());
    assert_eq!(ctx.language().key, "ko");
    assert_eq!(ctx.theme().name, "Ocean Depths");
    assert_eq!(ctx.t("askCard.title", Section::Home), "질문하기");
}

#[test]
fn invalid_stored_language_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("state.json"));
    store.set(LANGUAGE_KEY, "tlh").unwrap();
    store.set(THEME_KEY, "light").unwrap();

    let ctx = AppContext::load(store, table());
    assert_eq!(ctx.language().key, "en");
    assert_eq!(ctx.theme().key, "light");
}

#[test]
fn corrupt_state_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut ctx = AppContext::load(FileStore::new(&path), table());
    assert_eq!(ctx.language().key, "en");
    assert_eq!(ctx.theme().key, "dark");

    // The write fails too, but the in-memory switch still happens.
    ctx.set_language("de").unwrap();
    assert_eq!(ctx.language().key, "de");
}

#[test]
fn theme_toggle_persists_each_step() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let mut ctx = AppContext::load(FileStore::new(&path), table());
    ctx.toggle_theme();
    ctx.toggle_theme();

    let stored = FileStore::new(&path).get(THEME_KEY).unwrap();
    assert_eq!(stored.as_deref(), Some("ocean"));
}
