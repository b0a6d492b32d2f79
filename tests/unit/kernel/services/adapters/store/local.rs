use super::*;
use tempfile::tempdir;

fn doc(raw: &str) -> DocPath {
    DocPath::parse(raw).unwrap()
}

fn fixture() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("docs/guides")).unwrap();
    fs::write(root.join("README.md"), "# Readme").unwrap();
    fs::write(root.join("CLAUDE.md"), "# Claude").unwrap();
    fs::write(root.join("NOTES.md"), "root notes").unwrap();
    fs::write(root.join("docs/quick-start.md"), "# Quick start").unwrap();
    fs::write(root.join("docs/guides/diagrams.md"), "# Diagrams").unwrap();
    fs::write(root.join("docs/guides/image.png"), "png").unwrap();
    fs::write(root.join("docs/AUTH_FLOWS.md"), "flows").unwrap();
    dir
}

#[test]
fn test_docs_prefixed_paths_resolve_under_root() {
    let dir = fixture();
    let store = LocalDocStore::new(dir.path());
    assert_eq!(store.read(&doc("docs/quick-start.md")).unwrap(), "# Quick start");
    assert_eq!(store.read(&doc("/docs/guides/diagrams")).unwrap(), "# Diagrams");
}

#[test]
fn test_whitelisted_root_files() {
    let dir = fixture();
    let store = LocalDocStore::new(dir.path());
    assert_eq!(store.read(&doc("README.md")).unwrap(), "# Readme");
    assert_eq!(store.resolve(&doc("CLAUDE")), dir.path().join("CLAUDE.md"));
}

#[test]
fn test_bare_paths_try_docs_then_root() {
    let dir = fixture();
    let store = LocalDocStore::new(dir.path());
    assert_eq!(store.read(&doc("quick-start")).unwrap(), "# Quick start");
    assert_eq!(store.read(&doc("NOTES.md")).unwrap(), "root notes");
    assert_eq!(
        store.resolve(&doc("missing.md")),
        dir.path().join("docs").join("missing.md")
    );
}

#[test]
fn test_missing_document_is_not_found() {
    let dir = fixture();
    let store = LocalDocStore::new(dir.path());
    let err = store.read(&doc("docs/does-not-exist.md")).unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn test_directory_is_not_a_file() {
    let dir = fixture();
    fs::create_dir_all(dir.path().join("docs/folder.md")).unwrap();
    let store = LocalDocStore::new(dir.path());
    assert!(matches!(
        store.read(&doc("docs/folder.md")),
        Err(StoreError::NotAFile(_))
    ));
}

#[test]
fn test_write_creates_parent_directories() {
    let dir = fixture();
    let store = LocalDocStore::new(dir.path());
    let path = doc("docs/new/deep/page.md");
    store.write(&path, "fresh").unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("docs/new/deep/page.md")).unwrap(),
        "fresh"
    );
    assert_eq!(store.read(&path).unwrap(), "fresh");
}

#[test]
fn test_list_categorizes_root_and_docs() {
    let dir = fixture();
    let store = LocalDocStore::new(dir.path());
    let entries = store.list().unwrap();

    let root: Vec<&str> = entries
        .iter()
        .filter(|e| e.category == DocCategory::Root)
        .map(|e| e.path.as_str())
        .collect();
    assert_eq!(root, vec!["README.md", "CLAUDE.md"]);

    let docs: Vec<&str> = entries
        .iter()
        .filter(|e| e.category == DocCategory::Docs)
        .map(|e| e.path.as_str())
        .collect();
    assert!(docs.contains(&"docs/quick-start.md"));
    assert!(docs.contains(&"docs/guides/diagrams.md"));
    assert!(!docs.iter().any(|p| p.contains("image")));
    assert!(!docs.contains(&"NOTES.md"));
}

#[test]
fn test_delete_refuses_protected_files() {
    let dir = fixture();
    let store = LocalDocStore::new(dir.path());
    assert!(matches!(
        store.delete(&doc("README.md")),
        Err(StoreError::Protected(_))
    ));
    assert!(matches!(
        store.delete(&doc("docs/AUTH_FLOWS.md")),
        Err(StoreError::Protected(_))
    ));
    assert!(dir.path().join("README.md").exists());

    store.delete(&doc("docs/quick-start.md")).unwrap();
    assert!(!dir.path().join("docs/quick-start.md").exists());
    assert!(store.delete(&doc("docs/quick-start.md")).unwrap_err().is_not_found());
}

#[test]
fn test_static_lookup_reads_served_copy() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("docs")).unwrap();
    fs::write(dir.path().join("docs/a.md"), "static a").unwrap();
    let lookup = LocalStaticLookup::new(dir.path());
    assert_eq!(lookup.lookup(&doc("docs/a.md")).unwrap(), "static a");
    assert!(lookup.lookup(&doc("docs/b.md")).unwrap_err().is_not_found());
}

#[cfg(unix)]
#[test]
fn test_symlinks_cannot_leave_the_root() {
    let dir = fixture();
    let outside = tempdir().unwrap();
    fs::write(outside.path().join("secret.md"), "TOP SECRET").unwrap();
    std::os::unix::fs::symlink(outside.path(), dir.path().join("docs/link")).unwrap();
    std::os::unix::fs::symlink(
        outside.path().join("secret.md"),
        dir.path().join("docs/alias.md"),
    )
    .unwrap();
    let store = LocalDocStore::new(dir.path());

    assert!(matches!(
        store.read(&doc("docs/link/secret.md")),
        Err(StoreError::OutsideRoot(_))
    ));
    assert!(matches!(
        store.read(&doc("docs/alias.md")),
        Err(StoreError::OutsideRoot(_))
    ));
    assert!(matches!(
        store.write(&doc("docs/link/planted.md"), "x"),
        Err(StoreError::OutsideRoot(_))
    ));
    assert!(!outside.path().join("planted.md").exists());
    assert!(matches!(
        store.delete(&doc("docs/link/secret.md")),
        Err(StoreError::OutsideRoot(_))
    ));
    assert!(outside.path().join("secret.md").exists());

    let lookup = LocalStaticLookup::new(dir.path());
    assert!(matches!(
        lookup.lookup(&doc("docs/link/secret.md")),
        Err(StoreError::OutsideRoot(_))
    ));
}

#[cfg(unix)]
#[test]
fn test_symlinks_within_the_root_are_followed() {
    let dir = fixture();
    std::os::unix::fs::symlink(
        dir.path().join("docs/guides"),
        dir.path().join("docs/shortcut"),
    )
    .unwrap();
    let store = LocalDocStore::new(dir.path());
    assert_eq!(store.read(&doc("docs/shortcut/diagrams.md")).unwrap(), "# Diagrams");
    store.write(&doc("docs/shortcut/new/page.md"), "new").unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("docs/guides/new/page.md")).unwrap(),
        "new"
    );
}
