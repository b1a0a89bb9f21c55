//! End-to-end brewing through the public API with in-process compilers.

use std::fs;
use std::path::Path;
use std::time::Duration;

use cielo::build::{BuildSession, Orchestrator, SessionOptions, Stages};
use cielo::imports::{ImportResolver, ImportSymbolTable};
use cielo::preprocess::Preprocessor;
use cielo::source::{Classifier, display_name};
use cielo::stages::{ScriptCompiler, StageError, TemplateCompiler};
use cielo::watcher::WatchDriver;
use tempfile::TempDir;

struct UpperScript;

impl ScriptCompiler for UpperScript {
    fn compile(&self, text: &str, source: &Path) -> Result<String, StageError> {
        if text.contains("@@broken") {
            return Err(StageError::Compile {
                command: "upper".to_string(),
                message: "unexpected @@".to_string(),
                original: text.to_string(),
            });
        }
        Ok(format!("// {}\n{}", display_name(source), text.to_uppercase()))
    }
}

struct WrapTemplate;

impl TemplateCompiler for WrapTemplate {
    fn compile(&self, text: &str, display_name: &str) -> Result<String, StageError> {
        Ok(format!("<script>/* {display_name} */</script>\n{text}"))
    }
}

fn orchestrator(root: &Path, options: SessionOptions) -> Orchestrator {
    let stages = Stages {
        preprocessor: Preprocessor::new().include_dirs([root.join("include")]),
        resolver: ImportResolver::new(ImportSymbolTable::from_pairs([
            ("say", "import {say} from 'utils'"),
            ("writable", "import {writable} from 'svelte/store'"),
        ])),
        script: Box::new(UpperScript),
        template: Box::new(WrapTemplate),
    };
    Orchestrator::new(
        Classifier::all(root),
        stages,
        root.join("stores"),
        BuildSession::new(options),
    )
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[tokio::test]
async fn test_scan_once_builds_every_kind() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "include/header.cielo", "say 'header'\n");
    write(root, "_app.cielo", "#include header.cielo\nsay 'hi'\n");
    write(root, "lib/util.coffee", "x = 1\n");
    write(root, "_Card.starbucks", "<p>card</p>\n");
    write(root, "stores/_prefs.json5", "{theme: 'dark'}\n");
    write(root, "config.json5", "{ignored: 'yes'}\n");
    write(root, "node_modules/pkg/dep.coffee", "y = 2\n");
    write(root, ".hidden/secret.cielo", "say 'no'\n");
    write(root, "README.md", "# readme\n");

    let mut orch = orchestrator(root, SessionOptions::default());
    WatchDriver::builder()
        .root(root)
        .build()
        .unwrap()
        .run(&mut orch)
        .await
        .unwrap();

    let coffee = read(root, "_app.coffee");
    assert!(coffee.starts_with("import {say} from 'utils'\n\nsay 'header'\nsay 'hi'\n"));
    let js = read(root, "app.js");
    assert!(js.starts_with("// _app.coffee\nIMPORT {SAY} FROM 'UTILS'"));

    assert!(read(root, "lib/util.js").contains("X = 1"));
    assert!(read(root, "Card.svelte").starts_with("<script>/* _Card.starbucks */</script>"));
    assert_eq!(
        read(root, "stores/prefs.js"),
        "export const prefs = {\n  \"theme\": \"dark\"\n};\n"
    );

    assert!(!root.join("config.js").exists());
    assert!(!root.join("node_modules/pkg/dep.js").exists());
    assert!(!root.join(".hidden/secret.coffee").exists());

    // The include file is a macro script of its own and is brewed too
    assert!(root.join("include/header.js").exists());
    let counters = orch.finish().await;
    assert_eq!(counters.processed, 7);
    assert_eq!(counters.executed, 0);
}

#[tokio::test]
async fn test_second_scan_is_incremental() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "a.coffee", "a = 1\n");
    write(root, "b.coffee", "b = 2\n");

    let mut first = orchestrator(root, SessionOptions::default());
    WatchDriver::builder().root(root).build().unwrap().run(&mut first).await.unwrap();
    assert_eq!(first.finish().await.processed, 2);

    let mut second = orchestrator(root, SessionOptions::default());
    WatchDriver::builder().root(root).build().unwrap().run(&mut second).await.unwrap();
    assert_eq!(second.finish().await.processed, 0);

    let forced = SessionOptions {
        force: true,
        ..SessionOptions::default()
    };
    let mut third = orchestrator(root, forced);
    WatchDriver::builder().root(root).build().unwrap().run(&mut third).await.unwrap();
    assert_eq!(third.finish().await.processed, 2);
}

#[tokio::test]
async fn test_failed_file_does_not_stop_the_scan() {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "a_bad.coffee", "@@broken\n");
    write(root, "b_good.coffee", "ok = true\n");

    let mut orch = orchestrator(root, SessionOptions::default());
    WatchDriver::builder().root(root).build().unwrap().run(&mut orch).await.unwrap();

    assert!(!root.join("a_bad.js").exists());
    assert!(root.join("b_good.js").exists());
    assert_eq!(orch.finish().await.processed, 1);
}

async fn wait_for(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    false
}

#[tokio::test]
async fn test_watch_mode_rebuilds_and_cascades() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(&root, "_main.coffee", "v = 1\n");

    let options = SessionOptions {
        watch: true,
        ..SessionOptions::default()
    };
    let mut orch = orchestrator(&root, options);
    let driver = WatchDriver::builder().root(&root).watch(true).build().unwrap();

    let edit_root = root.clone();
    let shutdown = async move {
        let artifact = edit_root.join("main.js");
        assert!(wait_for(|| artifact.exists()).await);

        tokio::time::sleep(Duration::from_millis(1100)).await;
        fs::write(edit_root.join("_main.coffee"), "v = 2\n").unwrap();
        assert!(
            wait_for(|| fs::read_to_string(&artifact)
                .map(|s| s.contains("V = 2"))
                .unwrap_or(false))
            .await
        );

        fs::remove_file(edit_root.join("_main.coffee")).unwrap();
        assert!(wait_for(|| !artifact.exists()).await);
    };

    driver.run_until(&mut orch, shutdown).await.unwrap();
    assert!(orch.finish().await.processed >= 2);
}

#[tokio::test]
async fn test_watch_mode_removing_macro_script_keeps_compiled_output() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write(&root, "_a.cielo", "v = 1\n");

    let options = SessionOptions {
        watch: true,
        ..SessionOptions::default()
    };
    let mut orch = orchestrator(&root, options);
    let driver = WatchDriver::builder().root(&root).watch(true).build().unwrap();

    let edit_root = root.clone();
    let shutdown = async move {
        let coffee = edit_root.join("_a.coffee");
        let artifact = edit_root.join("a.js");
        assert!(wait_for(|| artifact.exists()).await);

        fs::remove_file(edit_root.join("_a.cielo")).unwrap();
        assert!(wait_for(|| !coffee.exists()).await);

        // Give the intermediate's own removal event time to arrive
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(artifact.exists());
    };

    driver.run_until(&mut orch, shutdown).await.unwrap();
    assert!(root.join("a.js").exists());
}
