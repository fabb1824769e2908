use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn help_lists_every_subcommand() {
    let mut cmd = Command::cargo_bin("llm-mend").expect("Binary exists");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("fix")
                .and(predicate::str::contains("pack"))
                .and(predicate::str::contains("unpack")),
        );
}

#[test]
fn pack_then_unpack_round_trips_a_directory() {
    let src = tempdir().expect("temp src dir");
    fs::create_dir_all(src.path().join("nested")).unwrap();
    fs::write(src.path().join("lib.rs"), "pub mod nested;\n").unwrap();
    fs::write(src.path().join("nested/mod.rs"), "pub fn hello() {}").unwrap();
    fs::write(src.path().join("README.md"), "skipped").unwrap();

    let work = tempdir().expect("temp work dir");
    let bundle = work.path().join("bundle.txt");
    let out = work.path().join("restored");

    Command::cargo_bin("llm-mend")
        .unwrap()
        .args(["pack", "--dir"])
        .arg(src.path())
        .arg("--output")
        .arg(&bundle)
        .assert()
        .success();

    let text = fs::read_to_string(&bundle).unwrap();
    assert!(text.contains("// File: lib.rs"));
    assert!(text.contains("// File: nested/mod.rs"));
    assert!(!text.contains("skipped"));

    Command::cargo_bin("llm-mend")
        .unwrap()
        .args(["unpack", "--input"])
        .arg(&bundle)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied content to:"));

    assert_eq!(fs::read_to_string(out.join("lib.rs")).unwrap(), "pub mod nested;\n");
    assert_eq!(
        fs::read_to_string(out.join("nested/mod.rs")).unwrap(),
        "pub fn hello() {}"
    );
    assert!(!out.join("README.md").exists());
}

#[test]
fn unpack_refuses_bundles_that_escape_the_output_dir() {
    let work = tempdir().unwrap();
    let bundle = work.path().join("evil.txt");
    fs::write(&bundle, "// File: ../outside.rs\nfn oops() {}\n").unwrap();

    Command::cargo_bin("llm-mend")
        .unwrap()
        .args(["unpack", "--input"])
        .arg(&bundle)
        .arg("--output-dir")
        .arg(work.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsafe path"));

    assert!(!work.path().join("outside.rs").exists());
}

#[test]
fn fix_without_api_key_fails_before_touching_files() {
    let work = tempdir().unwrap();
    let file = work.path().join("main.rs");
    fs::write(&file, "fn main(){}").unwrap();

    Command::cargo_bin("llm-mend")
        .unwrap()
        .current_dir(work.path())
        .env_remove("OPENAI_API_KEY")
        .args(["fix", "--dir"])
        .arg(work.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));

    assert_eq!(fs::read_to_string(&file).unwrap(), "fn main(){}");
}

#[test]
fn fix_rejects_zero_concurrency_flag() {
    Command::cargo_bin("llm-mend")
        .unwrap()
        .args(["fix", "--max-concurrency", "0"])
        .assert()
        .failure();
}

use std::sync::{Arc, Mutex};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{layer::Context, Layer, Registry};

/// Custom Layer to collect emitted event messages.
struct EventCollector {
    events: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for EventCollector
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        use std::fmt::Write as FmtWrite;
        let mut msg = String::new();
        let _ = write!(&mut msg, "{:?}", event);
        self.events.lock().unwrap().push(msg);
    }
}

#[tokio::test]
async fn emits_trace_initialised_event() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let collector = EventCollector {
        events: events.clone(),
    };
    let subscriber = Registry::default().with(collector);
    let _guard = tracing::subscriber::set_default(subscriber);

    use llm_mend::cli::{run, Cli, Commands};

    // A missing config file fails the run, but only after tracing starts.
    let cli = Cli {
        command: Commands::Fix {
            config: Some(std::path::PathBuf::from("dummy.yaml")),
            dir: None,
            suffix: None,
            max_concurrency: None,
        },
    };

    let result = run(cli).await;
    assert!(result.is_err());

    let event_msgs = events.lock().unwrap();
    assert!(
        event_msgs.iter().any(|msg| msg.contains("trace_initialised")),
        "Expected a 'trace_initialised' trace event, got: {:?}",
        event_msgs
    );
}
