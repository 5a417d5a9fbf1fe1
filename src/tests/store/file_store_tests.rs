use super::*;

#[test]
fn missing_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::open(dir.path().join("nope/settings.json"));
    assert_eq!(store.get("LANGUAGE"), None);
}

#[test]
fn set_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("agentdesk/settings.json");

    let mut store = FileStore::open(&path);
    store.set("LLM_MODEL", "gpt-4").unwrap();
    store.set("LLM_MODEL", "gpt-4o").unwrap();

    let reopened = FileStore::open(&path);
    assert_eq!(reopened.get("LLM_MODEL").as_deref(), Some("gpt-4o"));
    assert!(path.exists());
}

#[test]
fn corrupt_file_reads_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, b"{not json").unwrap();

    let store = FileStore::open(&path);
    assert_eq!(store.get("AGENT"), None);
}

#[test]
fn foreign_keys_survive_rewrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, br#"{"THEME":"dark","COUNT":3}"#).unwrap();

    let mut store = FileStore::open(&path);
    store.set("AGENT", "CodeActAgent").unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["THEME"], "dark");
    assert_eq!(raw["AGENT"], "CodeActAgent");
    assert_eq!(raw["COUNT"], 3);
}

#[test]
fn non_string_values_are_invisible_but_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("settings.json");
    std::fs::write(&path, br#"{"LANGUAGE":7,"NESTED":{"a":[1,2]},"FLAG":true}"#).unwrap();

    let mut store = FileStore::open(&path);
    assert_eq!(store.get("LANGUAGE"), None);
    store.set("AGENT", "CodeActAgent").unwrap();
    store.set("LLM_MODEL", "gpt-4o").unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["LANGUAGE"], 7);
    assert_eq!(raw["NESTED"]["a"][1], 2);
    assert_eq!(raw["FLAG"], true);
    assert_eq!(raw["LLM_MODEL"], "gpt-4o");

    let reopened = FileStore::open(&path);
    assert_eq!(reopened.get("AGENT").as_deref(), Some("CodeActAgent"));
}
