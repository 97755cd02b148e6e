use anyhow::{Context, Result};
use log::{debug, info};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::{env, fs, process};
use textweave_config::Config;
use textweave_engine::{Cmd, Document, DocumentSchema};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("textweave-cli");

    let (document_path, script_path) = match args.as_slice() {
        [_, command, document, script] if command == "replay" => {
            (PathBuf::from(document), PathBuf::from(script))
        }
        _ => {
            eprintln!("Usage: {program} replay <document.json> <script.json>");
            process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => Config::default(),
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            eprintln!("Fix or remove {}", Config::config_path().display());
            process::exit(1);
        }
    };

    // RUST_LOG wins over the configured filter
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_filter.as_str()),
    )
    .init();

    let output = replay(
        &config,
        &config.resolve(&document_path),
        &config.resolve(&script_path),
    )?;
    print!("{output}");

    Ok(())
}

fn schema(config: &Config) -> DocumentSchema {
    DocumentSchema::default()
        .with_default_text_type(config.default_text_type.as_str())
        .with_unsplittable_annotation_types(config.unsplittable_annotation_types.iter().cloned())
}

/// Load a document, apply every command of a script to it and render the
/// result. Each command is its own transaction; the first failing command
/// aborts the replay.
fn replay(config: &Config, document_path: &Path, script_path: &Path) -> Result<String> {
    let document = fs::read(document_path)
        .with_context(|| format!("Failed to read document {}", document_path.display()))?;
    let mut doc = Document::from_json(schema(config), &document)
        .with_context(|| format!("Failed to load document {}", document_path.display()))?;

    let script = fs::read(script_path)
        .with_context(|| format!("Failed to read script {}", script_path.display()))?;
    let script: Vec<Cmd> = serde_json::from_slice(&script)
        .with_context(|| format!("Failed to parse script {}", script_path.display()))?;

    info!(
        "Replaying {} commands against {}",
        script.len(),
        document_path.display()
    );
    for (index, cmd) in script.into_iter().enumerate() {
        let patch = doc
            .apply(cmd)
            .with_context(|| format!("Command {} failed", index + 1))?;
        debug!(
            "command {}: {} operations, version {}",
            index + 1,
            patch.operations.len(),
            patch.version
        );
    }

    render(&doc)
}

fn render(doc: &Document) -> Result<String> {
    let mut out = String::new();
    for container in doc.containers() {
        writeln!(out, "== {} ==", container.id)?;
        out.push_str(&doc.render(&container.id));
    }
    writeln!(out, "selection: {}", serde_json::to_string(doc.selection())?)?;
    writeln!(out, "version: {}", doc.version())?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const DOCUMENT: &str = r#"{
        "nodes": [{"id": "p1", "type": "paragraph", "content": "hello world"}],
        "annotations": [
            {"id": "b", "type": "strong", "path": ["p1", "content"], "start": 6, "end": 11},
            {"id": "l", "type": "link", "path": ["p1", "content"], "start": 3, "end": 8}
        ],
        "containers": [{"id": "body", "nodes": ["p1"]}]
    }"#;

    fn write_inputs(dir: &TempDir, script: &str) -> (PathBuf, PathBuf) {
        let document_path = dir.path().join("document.json");
        let script_path = dir.path().join("script.json");
        fs::write(&document_path, DOCUMENT).unwrap();
        fs::write(&script_path, script).unwrap();
        (document_path, script_path)
    }

    #[test]
    fn test_replay_renders_every_container() {
        let dir = TempDir::new().unwrap();
        let (document_path, script_path) = write_inputs(
            &dir,
            r#"[{"cmd": "insert_text", "text": " there",
                 "selection": {"type": "property", "path": ["p1", "content"],
                               "start_offset": 5, "container_id": "body"}}]"#,
        );

        let output = replay(&Config::default(), &document_path, &script_path).unwrap();

        let expected = concat!(
            "== body ==\n",
            "p1 [paragraph] \"hello there world\"\n",
            "  link l [3, 14) \"lo there wo\"\n",
            "  strong b [12, 17) \"world\"\n",
        );
        assert!(output.starts_with(expected), "{output}");
        assert!(output.ends_with("version: 1\n"), "{output}");
    }

    #[test]
    fn test_replay_uses_configured_schema() {
        let dir = TempDir::new().unwrap();
        let (document_path, script_path) = write_inputs(
            &dir,
            r#"[{"cmd": "break_node", "node_id": "p1", "container_id": "body",
                 "coordinate": {"path": ["p1", "content"], "offset": 5}}]"#,
        );
        let config = Config {
            unsplittable_annotation_types: vec!["link".to_string()],
            ..Config::default()
        };

        let output = replay(&config, &document_path, &script_path).unwrap();

        // the link straddling the break is truncated, not copied
        assert_eq!(output.matches("link").count(), 1);
        assert!(output.contains("  link l [3, 5) \"lo\"\n"), "{output}");
    }

    #[test]
    fn test_failing_command_is_reported_with_its_position() {
        let dir = TempDir::new().unwrap();
        let (document_path, script_path) = write_inputs(
            &dir,
            r#"[{"cmd": "set_selection", "selection": {"type": "none"}},
                {"cmd": "insert_text", "text": "x"}]"#,
        );

        let err = replay(&Config::default(), &document_path, &script_path).unwrap_err();

        assert_eq!(err.to_string(), "Command 2 failed");
    }
}
