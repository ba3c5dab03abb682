//! Full publish lifecycle against an in-memory page store.

use std::fs;
use std::path::Path;

use confpub_confluence::MockPageStore;
use confpub_publisher::{
    PathToPageMap, PublishConfig, PublishReport, Publisher, SECTION_BODY,
};
use confpub_site::Site;
use pretty_assertions::assert_eq;

const SPACE: &str = "DOCS";
const PARENT_ID: u64 = 42;

fn write(root: &Path, rel: &str, content: &[u8]) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn site_fixture(root: &Path) -> Site {
    write(
        root,
        "mkdocs.yml",
        b"site_name: Handbook\nnav:\n  - Home: index.md\n  - Guides:\n      - Install: guides/install.md\n",
    );
    write(
        root,
        "docs/index.md",
        b"# Welcome\n\nStart with [installing](guides/install.md).\n",
    );
    write(
        root,
        "docs/guides/install.md",
        b"# Install\n\n![Diagram](diagram.png)\n\n```json\n{\"debug\": true}\n```\n",
    );
    write(root, "docs/guides/diagram.png", b"\x89PNG");
    Site::load(&root.join("mkdocs.yml")).unwrap()
}

fn config(dry_run: bool) -> PublishConfig {
    PublishConfig {
        prefix: "Docs-".to_owned(),
        space_key: SPACE.to_owned(),
        parent_page_id: PARENT_ID,
        dry_run,
        upload_attachments: true,
    }
}

/// Drive the hooks the way a site build does.
fn publish(site: &Site, store: &MockPageStore, dry_run: bool) -> (PublishReport, PathToPageMap) {
    let mut publisher = Publisher::new(config(dry_run));
    publisher.on_config(Some(store));
    publisher.on_nav(site.nav());
    for page in site.pages() {
        let html = site.render(page).unwrap();
        publisher.on_page_content(page, &html);
        publisher.on_post_page(page);
    }
    (publisher.on_post_build(), publisher.pages().clone())
}

#[test]
fn test_publish_two_level_site() {
    let temp = tempfile::tempdir().unwrap();
    let site = site_fixture(temp.path());
    let store = MockPageStore::new();

    let (report, pages) = publish(&site, &store, false);

    let guides = store.page_titled("Docs-Guides").unwrap();
    assert_eq!(guides.body, SECTION_BODY);
    assert_eq!(guides.parent_id, Some(PARENT_ID));

    let install = store.page_titled("Docs-Install").unwrap();
    assert_eq!(install.parent_id, Some(guides.id));
    assert_eq!(install.version, 2);
    assert!(install
        .body
        .contains("<ac:image><ri:attachment ri:filename=\"diagram.png\" /></ac:image>"));
    assert!(install
        .body
        .contains("<ac:parameter ac:name=\"language\">yaml</ac:parameter>"));
    assert_eq!(store.attachments_of(install.id), ["diagram.png"]);

    let home = store.page_titled("Docs-Home").unwrap();
    assert!(home.body.contains(
        "<ac:link><ri:page ri:content-title=\"Docs-Install\" /><ac:link-body>installing</ac:link-body></ac:link>"
    ));

    assert_eq!(pages.len(), 2);
    assert_eq!(pages["guides/install.md"].id, install.id);
    assert_eq!(report.pages_created, 3);
    assert_eq!(report.pages_updated, 2);
    assert_eq!(report.attachments_uploaded, 1);
    assert!(!report.has_failures());
}

#[test]
fn test_republish_reuses_pages_and_attachments() {
    let temp = tempfile::tempdir().unwrap();
    let site = site_fixture(temp.path());
    let store = MockPageStore::new();

    let (_, first) = publish(&site, &store, false);
    let (report, second) = publish(&site, &store, false);

    assert_eq!(second, first);
    assert_eq!(store.pages().len(), 3);
    assert_eq!(report.pages_created, 0);
    assert_eq!(report.pages_reused, 3);
    assert_eq!(report.attachments_uploaded, 0);
    assert_eq!(report.attachments_existing, 1);
    assert_eq!(store.page_titled("Docs-Install").unwrap().version, 3);
}

#[test]
fn test_dry_run_leaves_remote_untouched() {
    let temp = tempfile::tempdir().unwrap();
    let site = site_fixture(temp.path());
    let store = MockPageStore::new();

    let (report, pages) = publish(&site, &store, true);

    assert!(store.pages().is_empty());
    assert!(pages.is_empty());
    assert_eq!(report.pages_converted, 2);
    assert_eq!(report.pages_updated, 0);
}

#[test]
fn test_missing_image_is_dropped_not_attached() {
    let temp = tempfile::tempdir().unwrap();
    let site = site_fixture(temp.path());
    fs::remove_file(temp.path().join("docs/guides/diagram.png")).unwrap();
    let store = MockPageStore::new();

    let (report, _) = publish(&site, &store, false);

    let install = store.page_titled("Docs-Install").unwrap();
    assert!(!install.body.contains("ri:attachment"));
    assert!(store.attachments_of(install.id).is_empty());
    assert_eq!(report.attachments_failed, 0);
}
