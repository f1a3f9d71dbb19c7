use std::fs;
use std::path::Path;

use tagatom::build::{build_site, Error};
use tagatom::config::{Config, PROJECT_FILE};
use tempfile::TempDir;

const PROJECT: &str = "title: Example
site_root: https://example.org/
author:
  name: Jane
";

const LAYOUT: &str = r#"---
title: Posts tagged
---
<feed xmlns="http://www.w3.org/2005/Atom"><title>{{ .page.title }} {{ .page.tag }}</title>{{ range .posts }}<entry><id>{{ .url }}</id></entry>{{ end }}</feed>
"#;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn project(layout: Option<&str>) -> TempDir {
    let dir = TempDir::new().unwrap();
    write(&dir.path().join(PROJECT_FILE), PROJECT);
    write(
        &dir.path().join("_posts").join("post1.md"),
        "---\ntitle: One\ndate: 2021-01-01\ntags: [go]\n---\nfirst",
    );
    write(
        &dir.path().join("_posts").join("post2.md"),
        "---\ntitle: Two\ndate: 2021-02-01\ntags: [go, rust, C++]\n---\nsecond",
    );
    write(
        &dir.path().join("_posts").join("post3.md"),
        "---\ntitle: Three\ndate: 2021-03-01\n---\nuntagged",
    );
    if let Some(layout) = layout {
        write(&dir.path().join("_layouts").join("atom.html"), layout);
    }
    dir
}

#[test]
fn test_build_site() {
    let project = project(Some(LAYOUT));
    let out = TempDir::new().unwrap();
    let config = Config::from_directory(project.path(), out.path()).unwrap();

    assert_eq!(3, build_site(&config).unwrap());

    let go = fs::read_to_string(out.path().join("tag/go/feed.xml")).unwrap();
    assert_eq!(
        "<feed xmlns=\"http://www.w3.org/2005/Atom\"><title>Posts tagged go</title>\
         <entry><id>https://example.org/posts/post2.html</id></entry>\
         <entry><id>https://example.org/posts/post1.html</id></entry></feed>\n",
        go
    );

    let rust = fs::read_to_string(out.path().join("tag/rust/feed.xml")).unwrap();
    assert!(rust.contains("<title>Posts tagged rust</title>"));
    assert!(rust.contains("post2.html"));
    assert!(!rust.contains("post1.html"));

    let cpp = fs::read_to_string(out.path().join("tag/C++/feed.xml")).unwrap();
    assert!(cpp.contains("<title>Posts tagged C++</title>"));

    let tags: Vec<_> = fs::read_dir(out.path().join("tag")).unwrap().collect();
    assert_eq!(3, tags.len());
}

#[test]
fn test_build_site_builtin_feed() {
    let project = project(Some("---\ntitle: Posts tagged\n---\n"));
    let out = TempDir::new().unwrap();
    let config = Config::from_directory(project.path(), out.path()).unwrap();

    assert_eq!(3, build_site(&config).unwrap());

    let go = fs::read_to_string(out.path().join("tag/go/feed.xml")).unwrap();
    assert!(go.contains("Posts tagged: go"));
    assert!(go.contains("https://example.org/tag/go/feed.xml"));
    assert!(go.contains("https://example.org/posts/post1.html"));
    assert!(go.contains("Jane"));
}

#[test]
fn test_build_site_removes_stale_feeds() {
    let project = project(Some(LAYOUT));
    let out = TempDir::new().unwrap();
    write(&out.path().join("tag/stale/feed.xml"), "old");
    let config = Config::from_directory(project.path(), out.path()).unwrap();

    build_site(&config).unwrap();

    assert!(!out.path().join("tag/stale").exists());
}

#[test]
fn test_build_site_keeps_other_tag_files() {
    let project = project(Some(LAYOUT));
    let out = TempDir::new().unwrap();
    write(&out.path().join("tag/go/index.html"), "go posts");
    write(&out.path().join("tag/python/index.html"), "python posts");
    let config = Config::from_directory(project.path(), out.path()).unwrap();

    build_site(&config).unwrap();

    assert_eq!(
        "go posts",
        fs::read_to_string(out.path().join("tag/go/index.html")).unwrap()
    );
    assert!(out.path().join("tag/go/feed.xml").exists());
    assert!(out.path().join("tag/python/index.html").exists());
}

#[test]
fn test_build_site_date_from_file_name() {
    let project = project(Some(LAYOUT));
    write(
        &project.path().join("_posts").join("2021-06-01-undated.md"),
        "---\ntitle: Undated\ntags: [go]\n---\nnewest",
    );
    let out = TempDir::new().unwrap();
    let config = Config::from_directory(project.path(), out.path()).unwrap();

    build_site(&config).unwrap();

    let go = fs::read_to_string(out.path().join("tag/go/feed.xml")).unwrap();
    let newest = go.find("2021-06-01-undated.html").unwrap();
    let oldest = go.find("post1.html").unwrap();
    assert!(newest < oldest);
}

#[test]
fn test_build_site_missing_layout() {
    let project = project(None);
    let out = TempDir::new().unwrap();
    let config = Config::from_directory(project.path(), out.path()).unwrap();

    match build_site(&config) {
        Err(Error::Layout(_)) => {}
        Err(e) => panic!("unexpected error: {}", e),
        Ok(n) => panic!("expected a layout error, wrote {} feeds", n),
    }
    assert!(!out.path().join("tag").exists());
}

#[test]
fn test_build_site_disabled() {
    let project = project(None);
    write(
        &project.path().join(PROJECT_FILE),
        &format!("{}tag_feeds:\n  enabled: false\n", PROJECT),
    );
    let out = TempDir::new().unwrap();
    let config = Config::from_directory(project.path(), out.path()).unwrap();

    assert_eq!(0, build_site(&config).unwrap());
}
