use crate::{
    error::{TargetError, UploadError},
    execution::{Uploader, run, state::PipelineState},
};
use async_trait::async_trait;
use connectors::{
    destination::DataWriter, error::WriteError, file::csv::error::FileError, source::DataSource,
};
use engine_config::{
    config::{ConfigFile, InputConfig, InputFieldConfig, TargetConfig, TargetFieldConfig},
    layout::{InputKind, Layout},
    loader::{ConfigLoader, ConfigType},
    options::RunOptions,
};
use engine_core::{
    connectors::{destination::Destination, source::Source},
    hooks::{HookError, HookMetadata, ProcessorHook},
    state::Checkpoint,
};
use model::{
    core::value::Value,
    records::{batch::SourceBatch, row::RowData},
};
use std::{
    collections::HashMap,
    error::Error,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};
use tracing_test::traced_test;

struct VecSource {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    batch_size: usize,
    next: usize,
}

impl VecSource {
    fn new(rows: usize, batch_size: usize) -> Self {
        VecSource {
            header: vec!["id".into(), "name".into()],
            rows: (1..=rows)
                .map(|i| vec![i.to_string(), format!("user{i}")])
                .collect(),
            batch_size,
            next: 0,
        }
    }
}

impl DataSource for VecSource {
    type Error = FileError;

    fn header(&self) -> &[String] {
        &self.header
    }

    fn next_batch(&mut self) -> Result<Option<SourceBatch>, FileError> {
        if self.next >= self.rows.len() {
            return Ok(None);
        }
        let end = (self.next + self.batch_size).min(self.rows.len());
        let batch = SourceBatch::new(self.next, self.rows[self.next..end].to_vec());
        self.next = end;
        Ok(Some(batch))
    }
}

/// Records every written batch; fails on the listed call numbers (0-based).
#[derive(Clone, Default)]
struct RecordingWriter {
    batches: Arc<Mutex<Vec<Vec<RowData>>>>,
    fail_on: Vec<usize>,
    calls: Arc<Mutex<usize>>,
}

impl RecordingWriter {
    fn failing_on(calls: &[usize]) -> Self {
        RecordingWriter {
            fail_on: calls.to_vec(),
            ..Default::default()
        }
    }

    fn sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().iter().map(Vec::len).collect()
    }

    fn first_ids(&self) -> Vec<String> {
        self.batches
            .lock()
            .unwrap()
            .iter()
            .map(|b| b[0].get_value("id").to_string())
            .collect()
    }
}

#[async_trait]
impl DataWriter for RecordingWriter {
    async fn write(&self, rows: &[RowData]) -> Result<(), WriteError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            *calls - 1
        };
        if self.fail_on.contains(&call) {
            return Err(WriteError::Write("connection reset".into()));
        }
        self.batches.lock().unwrap().push(rows.to_vec());
        Ok(())
    }
}

fn config(batch_size: usize, target_ids: &[&str]) -> ConfigFile {
    ConfigFile {
        batch_size: Some(batch_size),
        delay: Some(0),
        input: InputConfig {
            fields: vec![InputFieldConfig::named("id"), InputFieldConfig::named("name")],
            ..Default::default()
        },
        targets: target_ids
            .iter()
            .map(|id| TargetConfig {
                id: Some(id.to_string()),
                name: "shop".into(),
                data_name: "users".into(),
                fields: vec![
                    TargetFieldConfig {
                        data_type: Some("integer".into()),
                        ..TargetFieldConfig::named("id")
                    },
                    TargetFieldConfig::named("name"),
                ],
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn options(dir: &Path) -> RunOptions {
    RunOptions::new("config.yaml", "input.csv").with_checkpoint_path(dir.join(".checkpoint"))
}

fn uploader(
    opts: RunOptions,
    rows: usize,
    batch_size: usize,
    writers: &[(&str, RecordingWriter)],
    hook: Option<Arc<dyn ProcessorHook>>,
) -> Uploader {
    let ids: Vec<&str> = writers.iter().map(|(id, _)| *id).collect();
    let source = Source::new(
        "memory",
        InputKind::Csv,
        Box::new(VecSource::new(rows, batch_size)),
    );
    let layout: Layout = config(batch_size, &ids)
        .prepare()
        .unwrap()
        .materialize(source.header())
        .unwrap();
    let destinations = layout
        .targets
        .iter()
        .zip(writers)
        .map(|(target, (_, writer))| Destination::new(target.clone(), Box::new(writer.clone())))
        .collect();

    Uploader::from_parts(opts, layout, source, destinations, hook).unwrap()
}

fn read_checkpoint(path: &Path) -> Checkpoint {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[traced_test]
#[tokio::test]
async fn uploads_every_batch_without_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let writer = RecordingWriter::default();
    let mut up = uploader(options(dir.path()), 3, 2, &[("t1", writer.clone())], None);

    let summary = up.run().await.unwrap();

    assert_eq!(writer.sizes(), vec![2, 1]);
    assert_eq!(summary.rows_read, 3);
    assert_eq!(summary.target("t1").unwrap().rows_written, 3);
    assert_eq!(up.state(), PipelineState::Completed);
    assert!(!dir.path().join(".checkpoint").exists());
    assert!(logs_contain("[Target ID: t1] successfully uploaded line 1 to 2"));
    assert!(logs_contain("[Target ID: t1] successfully uploaded line 3 to 3"));
}

#[tokio::test]
async fn resolves_typed_values_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let writer = RecordingWriter::default();
    let mut up = uploader(options(dir.path()), 2, 5, &[("t1", writer.clone())], None);

    up.run().await.unwrap();

    let batches = writer.batches.lock().unwrap();
    let row = &batches[0][1];
    assert_eq!(row.entity, "t1");
    assert_eq!(row.get_value("id"), Value::Int(2));
    assert_eq!(
        row.get_value("name"),
        Value::String("user2".into())
    );
}

#[traced_test]
#[tokio::test]
async fn failure_saves_checkpoint_and_names_target() {
    let dir = tempfile::tempdir().unwrap();
    let checkpoint_path = dir.path().join(".checkpoint");
    let t1 = RecordingWriter::default();
    let t2 = RecordingWriter::failing_on(&[1]);
    let mut up = uploader(
        options(dir.path()),
        5,
        2,
        &[("t1", t1.clone()), ("t2", t2.clone())],
        None,
    );

    let err = up.run().await.unwrap_err();

    assert!(matches!(&err, UploadError::Target { target_id, .. } if target_id == "t2"));
    assert!(err.to_string().starts_with("[Target ID: t2] error: "));
    assert_eq!(up.state(), PipelineState::Failed);
    // t1 finished batch 2 before t2 failed on it; batch 3 was never read.
    assert_eq!(t1.sizes(), vec![2, 2]);
    assert_eq!(t2.sizes(), vec![2]);

    let saved = read_checkpoint(&checkpoint_path);
    assert_eq!(saved.progress("t1"), 2);
    assert_eq!(saved.progress("t2"), 2);
    assert_eq!(saved.batch_size, 2);
    assert!(saved.error.contains("connection reset"));
    assert!(saved.timestamp.is_some());
}

#[traced_test]
#[tokio::test]
async fn resume_skips_batches_per_target() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(".checkpoint");
    let mut saved = Checkpoint::new("config.yaml", "input.csv", 2, ["t1", "t2"]);
    saved.set_progress("t1", 4);
    saved.set_progress("t2", 2);
    saved.save(&path, &"[Target ID: t2] error: boom").unwrap();

    let t1 = RecordingWriter::default();
    let t2 = RecordingWriter::default();
    let mut up = uploader(
        options(dir.path()).with_resume(true),
        5,
        2,
        &[("t1", t1.clone()), ("t2", t2.clone())],
        None,
    );
    assert!(up.checkpoint().is_loaded());

    let summary = up.run().await.unwrap();

    // The batch a target had started is attempted again.
    assert_eq!(t1.first_ids(), vec!["5"]);
    assert_eq!(t2.first_ids(), vec!["3", "5"]);
    assert_eq!(summary.target("t1").unwrap().batches_skipped, 2);
    assert_eq!(summary.target("t2").unwrap().batches_skipped, 1);
    assert!(logs_contain(
        "[Target ID: t1] line 3 to 4 already processed in previous session"
    ));
}

#[tokio::test]
async fn resume_after_failure_continues_where_it_stopped() {
    let dir = tempfile::tempdir().unwrap();
    let first = RecordingWriter::failing_on(&[1]);
    let mut up = uploader(options(dir.path()), 4, 2, &[("t1", first)], None);
    up.run().await.unwrap_err();

    let second = RecordingWriter::default();
    let mut up = uploader(
        options(dir.path()).with_resume(true),
        4,
        2,
        &[("t1", second.clone())],
        None,
    );
    up.run().await.unwrap();

    assert_eq!(second.first_ids(), vec!["3"]);
}

#[tokio::test]
async fn resume_without_checkpoint_starts_over() {
    let dir = tempfile::tempdir().unwrap();
    let writer = RecordingWriter::default();
    let mut up = uploader(
        options(dir.path()).with_resume(true),
        3,
        2,
        &[("t1", writer.clone())],
        None,
    );
    assert!(!up.checkpoint().is_loaded());

    up.run().await.unwrap();
    assert_eq!(writer.sizes(), vec![2, 1]);
}

#[tokio::test]
async fn cannot_run_twice() {
    let dir = tempfile::tempdir().unwrap();
    let mut up = uploader(
        options(dir.path()),
        1,
        1,
        &[("t1", RecordingWriter::default())],
        None,
    );
    up.run().await.unwrap();

    let err = up.run().await.unwrap_err();
    assert!(matches!(err, UploadError::InvalidState(PipelineState::Completed)));
}

#[derive(Default)]
struct CountingHook {
    events: Mutex<Vec<String>>,
    fail_prepare_at: Option<usize>,
    fail_clean_up: bool,
}

impl ProcessorHook for CountingHook {
    fn prepare_batch(
        &self,
        meta: &HookMetadata,
        batch_index: usize,
        batch_size: usize,
    ) -> Result<(), HookError> {
        self.events
            .lock()
            .unwrap()
            .push(format!("prepare {} {batch_index} {batch_size}", meta.target_id));
        if self.fail_prepare_at == Some(batch_index) {
            return Err("not ready".into());
        }
        Ok(())
    }

    fn clean_up_batch(
        &self,
        meta: &HookMetadata,
        batch_index: usize,
        _batch_size: usize,
        batch_error: Option<&(dyn Error + 'static)>,
    ) -> Result<(), HookError> {
        let outcome = batch_error.map_or("ok".to_string(), |e| e.to_string());
        self.events
            .lock()
            .unwrap()
            .push(format!("clean {} {batch_index} {outcome}", meta.target_id));
        if self.fail_clean_up {
            return Err("cleanup failed".into());
        }
        Ok(())
    }
}

#[tokio::test]
async fn hooks_wrap_each_batch_and_see_write_errors() {
    let dir = tempfile::tempdir().unwrap();
    let hook = Arc::new(CountingHook::default());
    let mut up = uploader(
        options(dir.path()),
        3,
        2,
        &[("t1", RecordingWriter::failing_on(&[1]))],
        Some(hook.clone()),
    );

    up.run().await.unwrap_err();

    let events = hook.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            "prepare t1 0 2",
            "clean t1 0 ok",
            "prepare t1 2 1",
            "clean t1 2 Write error: connection reset",
        ]
    );
}

#[tokio::test]
async fn failing_prepare_hook_skips_write_and_clean_up() {
    let dir = tempfile::tempdir().unwrap();
    let hook = Arc::new(CountingHook {
        fail_prepare_at: Some(0),
        ..Default::default()
    });
    let writer = RecordingWriter::default();
    let mut up = uploader(
        options(dir.path()),
        2,
        2,
        &[("t1", writer.clone())],
        Some(hook.clone()),
    );

    let err = up.run().await.unwrap_err();

    assert!(matches!(
        err,
        UploadError::Target {
            source: TargetError::PrepareHook(_),
            ..
        }
    ));
    assert!(writer.sizes().is_empty());
    assert_eq!(hook.events.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failing_clean_up_hook_fails_a_written_batch() {
    let dir = tempfile::tempdir().unwrap();
    let hook = Arc::new(CountingHook {
        fail_clean_up: true,
        ..Default::default()
    });
    let writer = RecordingWriter::default();
    let mut up = uploader(
        options(dir.path()),
        2,
        2,
        &[("t1", writer.clone())],
        Some(hook),
    );

    let err = up.run().await.unwrap_err();

    assert!(matches!(
        err,
        UploadError::Target {
            source: TargetError::CleanUpHook(_),
            ..
        }
    ));
    assert_eq!(writer.sizes(), vec![2]);
    assert!(dir.path().join(".checkpoint").exists());
}

#[tokio::test]
async fn concurrent_targets_write_every_batch() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path());
    opts.concurrent_targets = true;
    let t1 = RecordingWriter::default();
    let t2 = RecordingWriter::default();
    let mut up = uploader(opts, 3, 2, &[("t1", t1.clone()), ("t2", t2.clone())], None);

    up.run().await.unwrap();

    assert_eq!(t1.sizes(), vec![2, 1]);
    assert_eq!(t2.sizes(), vec![2, 1]);
}

#[tokio::test]
async fn concurrent_failure_reports_first_declared_target() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path());
    opts.concurrent_targets = true;
    let mut up = uploader(
        opts,
        2,
        2,
        &[
            ("t1", RecordingWriter::failing_on(&[0])),
            ("t2", RecordingWriter::failing_on(&[0])),
        ],
        None,
    );

    let err = up.run().await.unwrap_err();

    assert!(matches!(&err, UploadError::Target { target_id, .. } if target_id == "t1"));
    let saved = read_checkpoint(&dir.path().join(".checkpoint"));
    assert!(saved.error.starts_with("[Target ID: t1]"));
}

#[traced_test]
#[tokio::test]
async fn end_to_end_dry_run_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    let input_path: PathBuf = dir.path().join("input.csv");

    std::fs::write(
        &config_path,
        r##"
batchSize: 2
delay: 0
input:
  delimiter: ";"
  fields:
    - name: id
    - name: name
targets:
  - id: users
    name: shop
    dataName: users
    username: $DB_USER$
    fields:
      - name: id
        type: integer
      - name: label
        value: "#^id^ ^name^"
"##,
    )
    .unwrap();
    std::fs::write(&input_path, "id;name\n1;Ada\n2;Linus\n3;Grace\n").unwrap();

    let mut opts = RunOptions::new(&config_path, &input_path)
        .with_checkpoint_path(dir.path().join(".checkpoint"));
    opts.dry_run = true;
    let env = HashMap::from([("DB_USER".to_string(), "loader".to_string())]);
    let loader = ConfigLoader::new(ConfigType::Yaml, env);

    let summary = run(opts, &loader, None).await.unwrap();

    assert_eq!(summary.batches_read, 2);
    assert_eq!(summary.target("users").unwrap().rows_written, 3);
    assert!(logs_contain("[Target ID: users] successfully uploaded line 3 to 3"));
}

#[tokio::test]
async fn header_mismatch_fails_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.yaml");
    let input_path = dir.path().join("input.csv");
    std::fs::write(
        &config_path,
        "input:\n  fields:\n    - name: id\n    - name: email\ntargets:\n  - name: shop\n    dataName: users\n",
    )
    .unwrap();
    std::fs::write(&input_path, "id,name\n1,a\n").unwrap();

    let mut opts = RunOptions::new(&config_path, &input_path);
    opts.dry_run = true;
    let loader = ConfigLoader::new(ConfigType::Yaml, HashMap::new());

    let err = run(opts, &loader, None).await.err().unwrap();
    assert!(matches!(err, UploadError::Layout(_)));
}

fn csv_uploader(opts: RunOptions, input: &Path, writer: &RecordingWriter) -> Uploader {
    let prepared = config(2, &["t1"]).prepare().unwrap();
    let source = Source::open(&prepared.input, input, 2).unwrap();
    let layout = prepared.materialize(source.header()).unwrap();
    let destination = Destination::new(layout.targets[0].clone(), Box::new(writer.clone()));

    Uploader::from_parts(opts, layout, source, vec![destination], None).unwrap()
}

#[tokio::test]
async fn source_error_mid_run_saves_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    std::fs::write(&input, "id,name\n1,a\n2,b\n3\n4,d\n").unwrap();

    let first = RecordingWriter::default();
    let mut up = csv_uploader(options(dir.path()), &input, &first);
    let err = up.run().await.unwrap_err();

    assert!(matches!(err, UploadError::Source(_)));
    assert_eq!(up.state(), PipelineState::Failed);
    assert_eq!(first.first_ids(), vec!["1"]);

    let saved = read_checkpoint(&dir.path().join(".checkpoint"));
    assert_eq!(saved.progress("t1"), 2);
    assert!(!saved.error.is_empty());
    assert!(saved.timestamp.is_some());

    std::fs::write(&input, "id,name\n1,a\n2,b\n3,c\n4,d\n").unwrap();
    let second = RecordingWriter::default();
    let mut up = csv_uploader(options(dir.path()).with_resume(true), &input, &second);
    up.run().await.unwrap();

    // The batch written before the failure is not applied again.
    assert_eq!(second.first_ids(), vec!["3"]);
}

#[tokio::test]
async fn short_row_saves_checkpoint_at_its_batch() {
    let dir = tempfile::tempdir().unwrap();
    let writer = RecordingWriter::default();
    let mut source = VecSource::new(4, 2);
    source.rows[2].truncate(1);
    let source = Source::new("memory", InputKind::Csv, Box::new(source));
    let layout = config(2, &["t1"])
        .prepare()
        .unwrap()
        .materialize(source.header())
        .unwrap();
    let destination = Destination::new(layout.targets[0].clone(), Box::new(writer.clone()));
    let mut up =
        Uploader::from_parts(options(dir.path()), layout, source, vec![destination], None).unwrap();

    let err = up.run().await.unwrap_err();

    assert!(matches!(err, UploadError::Layout(_)));
    assert_eq!(writer.sizes(), vec![2]);
    let saved = read_checkpoint(&dir.path().join(".checkpoint"));
    assert_eq!(saved.progress("t1"), 2);
}

#[tokio::test]
async fn maps_references_and_empty_defaults_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let header = vec!["id".to_string(), "full_name".to_string(), "active".to_string()];
    let source = VecSource {
        header: header.clone(),
        rows: vec![
            vec!["1".into(), "Ada Lovelace".into(), "".into()],
            vec!["2".into(), "Alan Turing".into(), "false".into()],
            vec!["3".into(), "Grace Hopper".into(), "".into()],
        ],
        batch_size: 2,
        next: 0,
    };
    let source = Source::new("memory", InputKind::Csv, Box::new(source));

    let cfg = ConfigFile {
        batch_size: Some(2),
        delay: Some(0),
        targets: vec![TargetConfig {
            id: Some("t1".into()),
            name: "shop".into(),
            data_name: "users".into(),
            fields: vec![
                TargetFieldConfig::named("name").with_value("^full_name^"),
                TargetFieldConfig {
                    data_type: Some("boolean".into()),
                    value_if_empty: Some("true".into()),
                    ..TargetFieldConfig::named("active")
                },
            ],
            ..Default::default()
        }],
        ..Default::default()
    };
    let layout = cfg.prepare().unwrap().materialize(&header).unwrap();
    let writer = RecordingWriter::default();
    let destination = Destination::new(layout.targets[0].clone(), Box::new(writer.clone()));
    let mut up =
        Uploader::from_parts(options(dir.path()), layout, source, vec![destination], None).unwrap();

    up.run().await.unwrap();

    assert_eq!(writer.sizes(), vec![2, 1]);
    assert!(!dir.path().join(".checkpoint").exists());

    let batches = writer.batches.lock().unwrap();
    let rows: Vec<&RowData> = batches.iter().flatten().collect();
    assert_eq!(rows[0].get_value("name"), Value::String("Ada Lovelace".into()));
    assert_eq!(rows[0].get_value("active"), Value::Boolean(true));
    assert_eq!(rows[1].get_value("active"), Value::Boolean(false));
    assert_eq!(rows[2].get_value("active"), Value::Boolean(true));
}
