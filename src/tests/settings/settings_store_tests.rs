use super::*;
use crate::store::MemoryStore;

fn raw(pairs: &[(&str, &str)]) -> RawSettings {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn fresh_store_uses_defaults() {
    let store = SettingsStore::new(MemoryStore::new());
    let cur = store.current();
    assert_eq!(cur.language, "en");
    assert_eq!(cur, Settings::default());
}

#[test]
fn save_then_current_round_trips() {
    let mut store = SettingsStore::new(MemoryStore::new());
    store.save(&raw(&[("LLM_MODEL", "gpt-4")])).unwrap();
    let cur = store.current();
    assert_eq!(cur.llm_model, "gpt-4");
    assert_eq!(cur.agent, "MonologueAgent");
}

#[test]
fn save_ignores_unknown_keys_and_empty_values() {
    let mut store = SettingsStore::new(MemoryStore::new());
    store.save(&raw(&[("LANGUAGE", "fr")])).unwrap();
    let before = store.current();

    store
        .save(&raw(&[("UNKNOWN_KEY", "x"), ("LANGUAGE", "")]))
        .unwrap();

    assert_eq!(store.current(), before);
    assert_eq!(store.backend().get("UNKNOWN_KEY"), None);
}

#[test]
fn diff_reports_only_changed_recognized_keys() {
    let store = SettingsStore::new(MemoryStore::new());
    let d = store.diff(&raw(&[
        ("LLM_MODEL", "gpt-3.5-turbo"),
        ("AGENT", "OtherAgent"),
        ("LANGUAGE", "en"),
        ("UNKNOWN_KEY", "whatever"),
    ]));
    let expected: SettingsPatch = [(SettingKey::Agent, "OtherAgent".to_string())]
        .into_iter()
        .collect();
    assert_eq!(d, expected);
}

#[test]
fn diff_compares_unset_keys_against_defaults() {
    let store = SettingsStore::new(MemoryStore::new());
    assert!(store.diff(&raw(&[("LANGUAGE", "en")])).is_empty());
}

#[test]
fn pending_changes_skip_empty_values() {
    let store = SettingsStore::new(MemoryStore::new());
    let candidate = raw(&[("LLM_MODEL", ""), ("LANGUAGE", "de")]);

    assert_eq!(store.diff(&candidate).len(), 2);
    let expected: SettingsPatch = [(SettingKey::Language, "de".to_string())]
        .into_iter()
        .collect();
    assert_eq!(store.pending_changes(&candidate), expected);
}

#[test]
fn diff_has_no_side_effects() {
    let store = SettingsStore::new(MemoryStore::new());
    let _ = store.diff(&raw(&[("AGENT", "OtherAgent")]));
    assert_eq!(store.current().agent, "MonologueAgent");
}

#[test]
fn reinitialize_only_for_model_or_agent() {
    let lang: SettingsPatch = [(SettingKey::Language, "de".to_string())]
        .into_iter()
        .collect();
    assert!(!requires_reinitialize(&lang));

    let model: SettingsPatch = [(SettingKey::LlmModel, "gpt-4".to_string())]
        .into_iter()
        .collect();
    assert!(requires_reinitialize(&model));
}

#[test]
fn empty_stored_value_falls_back_to_default() {
    let mut kv = MemoryStore::new();
    kv.set("AGENT", "").unwrap();
    let store = SettingsStore::new(kv);
    assert_eq!(store.current().agent, "MonologueAgent");
}

#[test]
fn parse_assignments_splits_on_first_equals() {
    let parsed = parse_assignments(["LLM_MODEL=gpt-4", "X=a=b"]).unwrap();
    assert_eq!(parsed["LLM_MODEL"], "gpt-4");
    assert_eq!(parsed["X"], "a=b");
    assert!(parse_assignments(["nope"]).is_err());
}

#[test]
fn settings_serialize_with_storage_keys() {
    let v = serde_json::to_value(Settings::default()).unwrap();
    assert_eq!(
        v,
        serde_json::json!({
            "LLM_MODEL": "gpt-3.5-turbo",
            "AGENT": "MonologueAgent",
            "LANGUAGE": "en"
        })
    );
}
