// HeidelTime-standalone invocation
// WHY: the standalone jar only reads from a file, so every call writes the
// document to a named temporary file that lives until the JVM has exited

use crate::config::AnnotationOptions;
use crate::error::{HeidelTimeError, Result};
use crate::reconcile::{Reconciler, Reconciliation};
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Environment variable naming the HeidelTime-standalone directory
pub const HEIDELTIME_PATH_ENV: &str = "HEIDELTIME_PATH";

/// Jar inside the HeidelTime-standalone directory
pub const STANDALONE_JAR: &str = "de.unihd.dbs.heideltime.standalone.jar";

/// Config file HeidelTime uses when none is configured
pub const DEFAULT_CONFIG_FILE: &str = "config.props";

/// Result of [`HeidelTime::parse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationOutput {
    /// TimeML or XMI exactly as HeidelTime printed it
    Markup(String),
    /// Reconciled records, for the `JSON` output format
    Records(Reconciliation),
}

/// Handle on a HeidelTime-standalone installation plus the options to run it with
#[derive(Debug, Clone)]
pub struct HeidelTime {
    install_dir: PathBuf,
    java: OsString,
    options: AnnotationOptions,
}

impl HeidelTime {
    /// `install_dir` is the HeidelTime-standalone directory; a trailing separator is fine.
    pub fn new(install_dir: impl AsRef<Path>) -> Result<Self> {
        let install_dir: PathBuf = install_dir.as_ref().components().collect();
        if install_dir.as_os_str().is_empty() {
            return Err(HeidelTimeError::configuration(
                "the HeidelTime-standalone directory must not be empty",
            ));
        }
        Ok(Self {
            install_dir,
            java: OsString::from("java"),
            options: AnnotationOptions::default(),
        })
    }

    /// Locate HeidelTime through `HEIDELTIME_PATH`
    pub fn from_env() -> Result<Self> {
        Self::from_install_dir_var(std::env::var_os(HEIDELTIME_PATH_ENV))
    }

    fn from_install_dir_var(value: Option<OsString>) -> Result<Self> {
        match value {
            Some(dir) if !dir.is_empty() => Self::new(dir),
            _ => Err(HeidelTimeError::configuration(format!(
                "set {HEIDELTIME_PATH_ENV} to the HeidelTime-standalone directory"
            ))),
        }
    }

    pub fn with_options(mut self, options: AnnotationOptions) -> Self {
        self.options = options;
        self
    }

    /// Java launcher to run the jar with; defaults to `java` on the `PATH`
    pub fn with_java(mut self, java: impl Into<OsString>) -> Self {
        self.java = java.into();
        self
    }

    pub fn options(&self) -> &AnnotationOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut AnnotationOptions {
        &mut self.options
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn jar_path(&self) -> PathBuf {
        self.install_dir.join(STANDALONE_JAR)
    }

    pub fn config_file(&self) -> PathBuf {
        self.options
            .config_file
            .clone()
            .unwrap_or_else(|| self.install_dir.join(DEFAULT_CONFIG_FILE))
    }

    /// Arguments after the Java launcher, ending with `input`
    pub fn command_args(&self, input: &Path) -> Vec<OsString> {
        let options = &self.options;
        let mut args: Vec<OsString> = vec![
            "-jar".into(),
            self.jar_path().into_os_string(),
            "-l".into(),
            options.language.as_str().into(),
            "-t".into(),
            options.document_type.as_str().into(),
            "-o".into(),
            options.output.engine_format().as_str().into(),
            "-c".into(),
            self.config_file().into_os_string(),
            "-e".into(),
            options.encoding.label().into(),
        ];

        if let Some(ref dct) = options.document_time {
            args.push("-dct".into());
            args.push(dct.as_str().into());
        }
        if options.verbose {
            args.push("-v".into());
        }
        if options.interval_tagger {
            args.push("-it".into());
        }
        if let Some(ref locale) = options.locale {
            args.push("-locale".into());
            args.push(locale.into());
        }
        if let Some(ref pos_tagger) = options.pos_tagger {
            args.push("-pos".into());
            args.push(pos_tagger.into());
        }

        args.push(input.as_os_str().to_owned());
        args
    }

    /// Run HeidelTime over `document` and return its markup, decoded with the configured encoding
    pub async fn run_annotation(&self, document: &str) -> Result<String> {
        let encoding = &self.options.encoding;
        let input = tempfile::Builder::new()
            .prefix("heideltime-")
            .suffix(".txt")
            .tempfile()?;
        tokio::fs::write(input.path(), encoding.encode(document)?).await?;

        let args = self.command_args(input.path());
        debug!(java = ?self.java, ?args, "Invoking HeidelTime");
        let start_time = std::time::Instant::now();

        let mut command = Command::new(&self.java);
        command.args(&args).stdin(Stdio::null()).kill_on_drop(true);

        let output = match self.options.timeout {
            Some(limit) => tokio::time::timeout(limit, command.output())
                .await
                .map_err(|_| {
                    HeidelTimeError::external_tool(format!("HeidelTime timed out after {limit:?}"))
                })?,
            None => command.output().await,
        }
        .map_err(|e| spawn_error(&self.java, e))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            warn!(status = %output.status, "HeidelTime failed");
            return Err(HeidelTimeError::external_tool(format!(
                "HeidelTime exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        if !stderr.trim().is_empty() {
            debug!(stderr = %stderr.trim(), "HeidelTime diagnostics");
        }
        if output.stdout.is_empty() {
            return Err(HeidelTimeError::external_tool("HeidelTime produced no output"));
        }

        let markup = encoding.decode(&output.stdout)?;
        info!(
            bytes = output.stdout.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "HeidelTime finished"
        );
        Ok(markup)
    }

    /// Run HeidelTime and, for the `JSON` format, reconcile its TimeML into records
    pub async fn parse(&self, document: &str) -> Result<AnnotationOutput> {
        let markup = self.run_annotation(document).await?;
        if !self.options.output.is_structured() {
            return Ok(AnnotationOutput::Markup(markup));
        }
        let reconciliation = Reconciler::new()
            .policy(self.options.miss_policy)
            .reconcile(&markup)?;
        Ok(AnnotationOutput::Records(reconciliation))
    }
}

fn spawn_error(java: &OsStr, e: std::io::Error) -> HeidelTimeError {
    HeidelTimeError::external_tool(format!(
        "could not run {}: {e}",
        Path::new(java).display()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DocumentType, Language, OutputFormat};

    fn strings(args: &[OsString]) -> Vec<String> {
        args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_default_command_line() {
        let heideltime = HeidelTime::new("/opt/heideltime/").unwrap();
        let args = heideltime.command_args(Path::new("/tmp/input.txt"));

        assert_eq!(
            strings(&args),
            vec![
                "-jar",
                "/opt/heideltime/de.unihd.dbs.heideltime.standalone.jar",
                "-l",
                "ENGLISH",
                "-t",
                "NARRATIVES",
                "-o",
                "TIMEML",
                "-c",
                "/opt/heideltime/config.props",
                "-e",
                "UTF-8",
                "/tmp/input.txt",
            ]
        );
    }

    #[test]
    fn test_optional_arguments_follow_required_ones() {
        let mut options = AnnotationOptions {
            language: Language::German,
            document_type: DocumentType::News,
            output: OutputFormat::Json,
            config_file: Some(PathBuf::from("/etc/heideltime.props")),
            locale: Some("de_DE".to_string()),
            pos_tagger: Some("TREETAGGER".to_string()),
            verbose: true,
            interval_tagger: true,
            ..AnnotationOptions::default()
        };
        options.set_document_time("2019-05-01").unwrap();

        let heideltime = HeidelTime::new("/opt/heideltime").unwrap().with_options(options);
        let args = strings(&heideltime.command_args(Path::new("doc.txt")));

        assert_eq!(
            args[2..],
            [
                "-l", "GERMAN", "-t", "NEWS", "-o", "TIMEML", "-c", "/etc/heideltime.props", "-e", "UTF-8",
                "-dct", "2019-05-01", "-v", "-it", "-locale", "de_DE", "-pos", "TREETAGGER", "doc.txt",
            ]
        );
    }

    #[test]
    fn test_missing_install_dir() {
        let err = HeidelTime::from_install_dir_var(None).unwrap_err();
        assert!(matches!(err, HeidelTimeError::Configuration(_)));
        assert!(err.to_string().contains(HEIDELTIME_PATH_ENV));

        assert!(HeidelTime::from_install_dir_var(Some(OsString::new())).is_err());
        assert!(HeidelTime::new("").is_err());
    }

    #[test]
    fn test_install_dir_from_var() {
        let heideltime =
            HeidelTime::from_install_dir_var(Some(OsString::from("/srv/heideltime/"))).unwrap();
        assert_eq!(heideltime.install_dir(), Path::new("/srv/heideltime"));
    }

    #[tokio::test]
    async fn test_unreachable_java_is_external_tool_error() {
        let heideltime = HeidelTime::new("/opt/heideltime")
            .unwrap()
            .with_java("/nonexistent/bin/java-for-heideltime-tests");

        let err = heideltime.run_annotation("today").await.unwrap_err();
        assert!(matches!(err, HeidelTimeError::ExternalTool(_)));
    }
}
