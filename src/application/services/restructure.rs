//! Restructuring service
//!
//! Reads a schema, runs one restructuring pass, and writes the result.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::visit::count_nodes;
use crate::domain::{Indexer, Rebuilder, Report, Schema, ToOutline};
use crate::infrastructure::traits::FileSystem;

/// Where a schema comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    /// `None` and `-` mean stdin.
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            None => Source::Stdin,
            Some(p) if p.as_os_str() == "-" => Source::Stdin,
            Some(p) => Source::File(p.to_path_buf()),
        }
    }
}

/// Result of restructuring one schema.
#[derive(Debug, Clone)]
pub struct RestructureOutput {
    pub schema: Schema,
    /// Serialized schema, formatted per settings
    pub json: String,
    pub report: Report,
}

/// Service running restructuring passes with the configured options.
pub struct RestructureService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl RestructureService {
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read schema text from a file or stdin.
    #[instrument(level = "debug", skip(self))]
    pub fn read_source(&self, source: &Source) -> ApplicationResult<String> {
        match source {
            Source::File(path) => self
                .fs
                .read_to_string(path)
                .with_path_context("read schema", path),
            Source::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .with_context("read schema from stdin")?;
                Ok(text)
            }
        }
    }

    pub fn load(&self, source: &Source) -> ApplicationResult<Schema> {
        let text = self.read_source(source)?;
        Ok(Schema::from_json_str(&text)?)
    }

    /// One pass with the configured options. Never fails.
    pub fn restructure(&self, schema: Schema) -> (Schema, Report) {
        let before = count_nodes(&schema);
        let registries = Indexer::index(schema);
        let (schema, report) = Rebuilder::rebuild_with(registries, &self.settings.options());
        debug!(
            nodes = before,
            diagnostics = report.len(),
            "restructured schema"
        );
        (schema, report)
    }

    /// Parse, restructure and serialize schema text.
    ///
    /// In strict mode any diagnostic turns into [`ApplicationError::Strict`].
    #[instrument(level = "debug", skip(self, text))]
    pub fn restructure_text(&self, text: &str) -> ApplicationResult<RestructureOutput> {
        let schema = Schema::from_json_str(text)?;
        let (schema, report) = self.restructure(schema);
        if self.settings.strict && !report.is_clean() {
            return Err(ApplicationError::strict(report));
        }
        let json = schema.to_json_string(self.settings.output.pretty)?;
        Ok(RestructureOutput {
            schema,
            json,
            report,
        })
    }

    /// Restructure `source` and write to `output` (returned only when `None`).
    #[instrument(level = "debug", skip(self))]
    pub fn apply(&self, source: &Source, output: Option<&Path>) -> ApplicationResult<RestructureOutput> {
        let text = self.read_source(source)?;
        let result = self.restructure_text(&text)?;
        if let Some(path) = output {
            self.fs
                .ensure_parent(path)
                .with_path_context("create output directory", path)?;
            self.fs
                .write(path, &with_newline(&result.json))
                .with_path_context("write schema", path)?;
            info!("wrote restructured schema to {}", path.display());
        }
        Ok(result)
    }

    /// Diagnostics only; the schema is restructured but not returned.
    pub fn check(&self, source: &Source) -> ApplicationResult<Report> {
        let schema = self.load(source)?;
        let (_, report) = self.restructure(schema);
        Ok(report)
    }

    /// Outline of the schema, before or after restructuring.
    pub fn outline(&self, source: &Source, after: bool) -> ApplicationResult<Tree<String>> {
        let schema = self.load(source)?;
        if after {
            let (schema, _) = self.restructure(schema);
            Ok(schema.to_outline())
        } else {
            Ok(Indexer::index(schema).arena().to_outline())
        }
    }
}

fn with_newline(text: &str) -> String {
    let mut text = text.to_string();
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
