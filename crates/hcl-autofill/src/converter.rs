//! hand filled fragments to an external converter
//!
//! The converter is a separate program with the command line
//! `<program> convert --generate-only --from <source> --language <target> --out <dir> [--strict]`.
//! It is run inside a scratch directory that contains the fragment as `main.tf`.
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct Converter {
    program: PathBuf,
    source_language: String,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new("pulumi".into(), "terraform".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, derive_new::new)]
pub struct ConvertOptions {
    /// Target language, passed through as given
    pub language: String,
    /// Directory the generated files are written to
    pub out_dir: PathBuf,
    /// Fail instead of emitting placeholders for unsupported constructs
    #[new(default)]
    pub strict: bool,
}

impl ConvertOptions {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

impl Converter {
    pub fn args(&self, options: &ConvertOptions) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "convert".into(),
            "--generate-only".into(),
            "--from".into(),
            self.source_language.clone().into(),
            "--language".into(),
            options.language.clone().into(),
            "--out".into(),
            options.out_dir.clone().into(),
        ];

        if options.strict {
            args.push("--strict".into());
        }

        args
    }

    /// Runs the converter on `fragment`
    ///
    /// `options.out_dir` is made absolute first since the converter runs in a scratch directory.
    pub fn convert(&self, fragment: &str, options: &ConvertOptions) -> Result<(), ConvertError> {
        let mut options = options.clone();
        if options.out_dir.is_relative() {
            options.out_dir = std::env::current_dir()?.join(&options.out_dir);
        }

        let workdir = tempfile::tempdir()?;
        std::fs::write(workdir.path().join("main.tf"), fragment)?;

        let args = self.args(&options);
        tracing::info!(program=%self.program.display(), ?args, "running converter");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(workdir.path())
            .output()
            .map_err(|err| ConvertError::SpawnFailed(self.program.clone(), err))?;

        if !output.status.success() {
            return Err(ConvertError::Failed {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::debug!(stdout=%String::from_utf8_lossy(&output.stdout), "converter finished");
        Ok(())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error("IO error")]
    IoError(#[from] std::io::Error),
    #[error("Unable to run {}", .0.display())]
    SpawnFailed(PathBuf, #[source] std::io::Error),
    #[error("Converter exited with {status}\n{stderr}")]
    Failed { status: ExitStatus, stderr: String },
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered(args: Vec<OsString>) -> String {
        args.iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn command_line() {
        let options = ConvertOptions::new("typescript".to_string(), "out".into());
        insta::assert_snapshot!(
            rendered(Converter::default().args(&options)),
            @"convert --generate-only --from terraform --language typescript --out out"
        );
    }

    #[test]
    fn strict_command_line() {
        let options = ConvertOptions::new("go".to_string(), "/tmp/out".into()).strict(true);
        assert_eq!(
            rendered(Converter::default().args(&options)),
            "convert --generate-only --from terraform --language go --out /tmp/out --strict"
        );
    }

    #[test]
    fn missing_program() {
        let converter = Converter::new(
            "hcl-autofill-converter-that-does-not-exist".into(),
            "terraform".to_string(),
        );
        let options = ConvertOptions::new("go".to_string(), "out".into());

        let result = converter.convert("", &options);
        assert!(matches!(result, Err(ConvertError::SpawnFailed(..))));
    }

    #[cfg(unix)]
    fn script(dir: &std::path::Path, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("converter.sh");
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[test]
    fn failed_conversion_keeps_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let program = script(dir.path(), "echo 'unsupported construct' >&2\nexit 3");
        let options = ConvertOptions::new("go".to_string(), dir.path().join("out"));

        let result = Converter::new(program, "terraform".to_string()).convert("a = 1\n", &options);

        let (status, stderr) = match result {
            Err(ConvertError::Failed { status, stderr }) => (status, stderr),
            other => panic!("expected a failed conversion, got {other:?}"),
        };
        assert_eq!(status.code(), Some(3));
        assert_eq!(stderr, "unsupported construct\n");
    }

    #[cfg(unix)]
    #[test]
    fn fragment_is_written_to_the_work_directory() {
        let dir = tempfile::tempdir().unwrap();
        // the eighth argument is the value of --out
        let program = script(dir.path(), "mkdir -p \"$8\" && cp main.tf \"$8/main.tf\"");
        let out_dir = dir.path().join("out");
        let options = ConvertOptions::new("go".to_string(), out_dir.clone());
        let fragment = "zone = aws_route53_zone.example.zone_id\n";

        Converter::new(program, "terraform".to_string())
            .convert(fragment, &options)
            .unwrap();

        assert_eq!(std::fs::read_to_string(out_dir.join("main.tf")).unwrap(), fragment);
    }
}
