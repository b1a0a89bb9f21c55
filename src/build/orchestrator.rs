//! Event dispatch: classify, staleness-check, transform, write.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::error::BuildError;
use super::event::BuildEvent;
use super::executor::Executor;
use super::session::{BuildSession, BuildState, Counters};
use super::staleness::needs_rebuild;
use super::writer::ArtifactWriter;
use crate::imports::ImportResolver;
use crate::preprocess::Preprocessor;
use crate::source::{
    Classification, Classifier, SourceKind, Stage, cascade_target, derived_path, display_name,
    short_path,
};
use crate::stages::{ScriptCompiler, StageError, TemplateCompiler, export_name, wrap_data_literal};

/// The transformation stages a build dispatches to.
pub struct Stages {
    pub preprocessor: Preprocessor,
    pub resolver: ImportResolver,
    pub script: Box<dyn ScriptCompiler>,
    pub template: Box<dyn TemplateCompiler>,
}

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Drives one build session.
///
/// Events are handled one at a time; all session state is mutated from
/// [`Orchestrator::handle_event`] and [`Orchestrator::build_files`] only.
pub struct Orchestrator {
    classifier: Classifier,
    stages: Stages,
    /// Data literals are wrapped only below this directory.
    stores_dir: PathBuf,
    writer: ArtifactWriter,
    executor: Option<Executor>,
    session: BuildSession,
}

impl Orchestrator {
    pub fn new(
        classifier: Classifier,
        stages: Stages,
        stores_dir: impl Into<PathBuf>,
        session: BuildSession,
    ) -> Self {
        Self {
            classifier,
            stages,
            stores_dir: stores_dir.into(),
            writer: ArtifactWriter::new(),
            executor: None,
            session,
        }
    }

    /// Run compiled macro scripts with `executor` after building them.
    pub fn with_executor(mut self, executor: Executor) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn session(&self) -> &BuildSession {
        &self.session
    }

    pub fn root(&self) -> &Path {
        self.classifier.root()
    }

    /// React to one watch event.
    pub fn handle_event(&mut self, event: BuildEvent) -> Flow {
        if self.session.state() == BuildState::Done {
            return Flow::Stop;
        }
        if let Some(path) = event.path() {
            crate::debug_event!("brew", event.label(), "{}", self.short(path));
        }
        match event {
            BuildEvent::Ready => self.on_ready(),
            BuildEvent::Removed(path) => {
                self.on_removed(&path);
                Flow::Continue
            }
            BuildEvent::Added(path) | BuildEvent::Changed(path) => {
                self.on_upsert(&path);
                Flow::Continue
            }
        }
    }

    /// Stop a watching session.
    pub fn interrupt(&mut self) {
        crate::log_event!("brew", "interrupted");
        self.session.finish();
    }

    /// Build exactly the named files, once.
    ///
    /// Every file is classified before anything is built; a single
    /// unrecognized file aborts the whole call. Named files are always
    /// rebuilt. Per-file stage errors are logged and skipped.
    pub fn build_files(&mut self, files: &[PathBuf]) -> Result<(), BuildError> {
        let classified = files
            .iter()
            .map(|path| {
                let classification = self.classifier.classify(path);
                if classification.kind.is_recognized() {
                    Ok((path.clone(), classification))
                } else {
                    Err(BuildError::UnknownFileType { path: path.clone() })
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (path, classification) in classified {
            match self.run_chain(&path, classification, true) {
                Ok(true) => {
                    if classification.kind == SourceKind::MacroScript {
                        let compiled = final_artifact(&path, classification.chain);
                        self.execute(&compiled);
                    }
                }
                Ok(false) => {}
                Err(e) => self.report_failure(&path, &e),
            }
        }
        Ok(())
    }

    /// Drain pending executions and report the counters.
    pub async fn finish(self) -> Counters {
        let Orchestrator {
            executor, session, ..
        } = self;
        if let Some(executor) = executor {
            executor.finish().await;
        }
        let counters = session.counters();
        if !session.options().quiet {
            crate::log_event!("brew", "done", "{counters}");
        }
        counters
    }

    fn on_ready(&mut self) -> Flow {
        match self.session.mark_ready() {
            BuildState::Watching => {
                crate::log_event!(
                    "brew",
                    "initial scan complete",
                    "{}; watching {}",
                    self.session.counters(),
                    self.root().display()
                );
                Flow::Continue
            }
            _ => Flow::Stop,
        }
    }

    fn on_upsert(&mut self, path: &Path) {
        // Recreated after a cascade: its next removal is the user's
        self.session.take_removal(path);
        let classification = self.classifier.classify(path);
        if !classification.kind.is_recognized() {
            return;
        }
        if self.session.is_own_write(path) {
            crate::debug_event!("brew", "own artifact", "{}", self.short(path));
            return;
        }
        if let Err(e) = self.run_chain(path, classification, false) {
            self.report_failure(path, &e);
        }
    }

    fn on_removed(&mut self, path: &Path) {
        if self.session.take_removal(path) {
            crate::debug_event!("brew", "own removal", "{}", self.short(path));
            return;
        }
        self.session.forget(path);
        let kind = self.classifier.classify(path).kind;
        if !kind.is_recognized() {
            return;
        }
        if kind == SourceKind::DataLiteral && !self.in_stores(path) {
            return;
        }
        let Some(target) = cascade_target(path, kind) else {
            return;
        };
        match self.writer.remove(&target) {
            Ok(true) => {
                self.session.record_removal(&target);
                crate::log_event!("brew", "removed", "{}", self.short(&target));
            }
            Ok(false) => {
                crate::debug_event!("brew", "already absent", "{}", self.short(&target));
            }
            // Logged by the writer
            Err(_) => {}
        }
    }

    /// Apply every stage of `classification` to `source`.
    ///
    /// Each hop is staleness-checked against its own input unless `always`
    /// is set. Returns `false` if the chain stopped early on a skip, a
    /// vanished input or a failed write.
    fn run_chain(
        &mut self,
        source: &Path,
        classification: Classification,
        always: bool,
    ) -> Result<bool, StageError> {
        let mut input = source.to_path_buf();
        let mut carried: Option<String> = None;

        for &stage in classification.chain {
            let artifact = derived_path(&input, stage);

            if stage == Stage::WrapData && !self.in_stores(source) {
                crate::log_event!(
                    "brew",
                    "skipped",
                    "{}: data literals are only wrapped inside {}",
                    self.short(source),
                    self.short(&self.stores_dir)
                );
                return Ok(false);
            }

            if !always && !needs_rebuild(&input, &artifact, &self.session) {
                crate::debug_event!("brew", "up to date", "{}", self.short(&artifact));
                carried = None;
                input = artifact;
                continue;
            }

            let text = match carried.take() {
                Some(text) => text,
                None => match fs::read_to_string(&input) {
                    Ok(text) => text,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {
                        crate::debug_event!("brew", "vanished", "{}", self.short(&input));
                        return Ok(false);
                    }
                    Err(source) => {
                        return Err(StageError::Read {
                            path: input.clone(),
                            source,
                        });
                    }
                },
            };

            let output = self.apply(stage, &text, &input)?;
            if self.writer.write(&artifact, &output).is_err() {
                return Ok(false);
            }
            self.session.record_write(&artifact);
            self.session.count_processed();
            crate::log_event!(
                "brew",
                stage_label(stage),
                "{} => {}",
                self.short(&input),
                self.short(&artifact)
            );

            carried = Some(output);
            input = artifact;
        }
        Ok(true)
    }

    fn apply(&self, stage: Stage, text: &str, input: &Path) -> Result<String, StageError> {
        match stage {
            Stage::Preprocess => {
                let expanded = self.stages.preprocessor.expand_str(text, input)?;
                Ok(self.stages.resolver.apply(&expanded))
            }
            Stage::CompileScript => self.stages.script.compile(text, input),
            Stage::CompileTemplate => self.stages.template.compile(text, &display_name(input)),
            Stage::WrapData => wrap_data_literal(text, &export_name(input)),
        }
    }

    fn execute(&mut self, artifact: &Path) {
        if let Some(executor) = &self.executor {
            executor.spawn(artifact);
            self.session.count_executed();
        }
    }

    fn in_stores(&self, path: &Path) -> bool {
        path.starts_with(&self.stores_dir)
    }

    fn report_failure(&self, path: &Path, error: &StageError) {
        tracing::error!("[brew] {}: {error}", self.short(path));
        if let Some(original) = error.original() {
            crate::debug_event!("brew", "stage input", "\n{original}");
        }
    }

    fn short(&self, path: &Path) -> String {
        short_path(path, self.root())
    }
}

/// Last artifact of a chain applied to `source`.
pub fn final_artifact(source: &Path, chain: &[Stage]) -> PathBuf {
    chain
        .iter()
        .fold(source.to_path_buf(), |input, stage| derived_path(&input, *stage))
}

fn stage_label(stage: Stage) -> &'static str {
    match stage {
        Stage::Preprocess => "expanded",
        Stage::CompileScript => "compiled",
        Stage::CompileTemplate => "templated",
        Stage::WrapData => "wrapped",
    }
}
