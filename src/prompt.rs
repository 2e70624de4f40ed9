//! Interactive input collection.
//!
//! Asks, in order, for the output directory, the extraction mode and the PDF
//! path. There are no retries: an unknown mode or a missing file ends the
//! dialogue with a message and a [`CollectOutcome`] that tells the caller to
//! stop. The collector works on any `BufRead`/`Write` pair so the whole
//! dialogue can be scripted in tests.

use crate::error::ExtractError;
use crate::mode::ExtractionMode;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Output directory used when the first prompt is answered with an empty line.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Everything needed to run one extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Existing directory that receives the output files.
    pub output_dir: PathBuf,
    pub mode: ExtractionMode,
    /// Path to an existing file.
    pub pdf_path: PathBuf,
}

/// How the dialogue ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectOutcome {
    /// All answers valid.
    Ready(ExtractionRequest),
    /// The mode answer was not `1`, `2` or `3`.
    InvalidChoice(String),
    /// The PDF path does not name an existing file.
    PdfNotFound(PathBuf),
}

impl CollectOutcome {
    /// The message printed when the dialogue is aborted.
    pub fn abort_message(&self) -> Option<String> {
        match self {
            CollectOutcome::Ready(_) => None,
            CollectOutcome::InvalidChoice(_) => Some("Invalid choice. Exiting.".to_string()),
            CollectOutcome::PdfNotFound(path) => {
                Some(format!("File '{}' not found. Exiting.", path.display()))
            }
        }
    }
}

/// Reads the three answers from `input`, echoing prompts to `output`.
pub struct InputCollector<R, W> {
    input: R,
    output: W,
    default_output_dir: PathBuf,
}

impl<R: BufRead, W: Write> InputCollector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            default_output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Replace the directory used for a blank first answer.
    pub fn with_default_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.default_output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Run the dialogue.
    ///
    /// The output directory is created as soon as it is known, before the
    /// mode is asked for, so it exists even when the run is aborted later.
    pub fn collect(&mut self) -> Result<CollectOutcome, ExtractError> {
        let prompt = format!(
            "Enter output directory (default: '{}'): ",
            self.default_output_dir.display()
        );
        let answer = self.ask(&prompt)?;
        let output_dir = if answer.is_empty() {
            self.default_output_dir.clone()
        } else {
            PathBuf::from(answer)
        };
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| ExtractError::write_failed(&output_dir, e))?;
        debug!("Output directory ready: {}", output_dir.display());

        self.say("\nSelect an operation:")?;
        for mode in ExtractionMode::ALL {
            self.say(&format!("{}. {}", mode.choice(), mode.label()))?;
        }
        let choice = self.ask("Enter your choice (1/2/3): ")?;
        let Some(mode) = ExtractionMode::from_choice(&choice) else {
            return self.abort(CollectOutcome::InvalidChoice(choice));
        };

        let pdf_answer = self.ask("Enter the path to the PDF file: ")?;
        let pdf_path = PathBuf::from(pdf_answer.trim());
        if !pdf_path.is_file() {
            return self.abort(CollectOutcome::PdfNotFound(pdf_path));
        }

        Ok(CollectOutcome::Ready(ExtractionRequest {
            output_dir,
            mode,
            pdf_path,
        }))
    }

    /// Write `prompt` without a newline and read one answer.
    ///
    /// Only the line terminator is removed. End of input reads as an empty
    /// answer.
    fn ask(&mut self, prompt: &str) -> Result<String, ExtractError> {
        write!(self.output, "{prompt}").map_err(ExtractError::Console)?;
        self.output.flush().map_err(ExtractError::Console)?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .map_err(ExtractError::Console)?;
        let answer = line.trim_end_matches(['\n', '\r']).to_string();
        Ok(answer)
    }

    fn say(&mut self, line: &str) -> Result<(), ExtractError> {
        writeln!(self.output, "{line}").map_err(ExtractError::Console)
    }

    fn abort(&mut self, outcome: CollectOutcome) -> Result<CollectOutcome, ExtractError> {
        if let Some(msg) = outcome.abort_message() {
            self.say(&msg)?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(script: &str, default_dir: &Path) -> (CollectOutcome, String) {
        let mut out = Vec::new();
        let outcome = InputCollector::new(Cursor::new(script.as_bytes().to_vec()), &mut out)
            .with_default_output_dir(default_dir)
            .collect()
            .unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn menu_lists_all_modes() {
        let tmp = tempfile::tempdir().unwrap();
        let (_, transcript) = run("\n9\n", &tmp.path().join("output"));
        assert!(transcript.contains("\nSelect an operation:\n"));
        assert!(transcript.contains("1. Extract PDF to Markdown\n"));
        assert!(transcript.contains("2. Extract Tables\n"));
        assert!(transcript.contains("3. Extract Images\n"));
        assert!(transcript.contains("Enter your choice (1/2/3): "));
    }

    #[test]
    fn blank_directory_uses_default_and_creates_it() {
        let tmp = tempfile::tempdir().unwrap();
        let default_dir = tmp.path().join("output");
        let (outcome, transcript) = run("\n4\n", &default_dir);
        assert!(default_dir.is_dir());
        assert!(transcript.starts_with(&format!(
            "Enter output directory (default: '{}'): ",
            default_dir.display()
        )));
        assert_eq!(outcome, CollectOutcome::InvalidChoice("4".into()));
    }

    #[test]
    fn nested_directory_is_created() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a/b/c");
        let script = format!("{}\n1\n/tmp/does_not_exist.pdf\n", nested.display());
        let (outcome, _) = run(&script, &tmp.path().join("unused"));
        assert!(nested.is_dir());
        assert!(!tmp.path().join("unused").exists());
        assert!(matches!(outcome, CollectOutcome::PdfNotFound(_)));
    }

    #[test]
    fn invalid_choice_stops_before_pdf_prompt() {
        let tmp = tempfile::tempdir().unwrap();
        let (outcome, transcript) = run("\n\n", &tmp.path().join("output"));
        assert_eq!(outcome, CollectOutcome::InvalidChoice(String::new()));
        assert!(transcript.ends_with("Invalid choice. Exiting.\n"));
        assert!(!transcript.contains("Enter the path to the PDF file"));
    }

    #[test]
    fn missing_pdf_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let (outcome, transcript) =
            run("\n1\n  /tmp/does_not_exist.pdf  \n", &tmp.path().join("output"));
        assert_eq!(
            outcome,
            CollectOutcome::PdfNotFound(PathBuf::from("/tmp/does_not_exist.pdf"))
        );
        assert!(transcript.ends_with("File '/tmp/does_not_exist.pdf' not found. Exiting.\n"));
    }

    #[test]
    fn directory_is_not_a_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let script = format!("\n2\n{}\n", tmp.path().display());
        let (outcome, _) = run(&script, &tmp.path().join("output"));
        assert!(matches!(outcome, CollectOutcome::PdfNotFound(_)));
    }

    #[test]
    fn valid_answers_produce_request() {
        let tmp = tempfile::tempdir().unwrap();
        let pdf = tmp.path().join("doc.pdf");
        std::fs::write(&pdf, b"%PDF-1.7\n").unwrap();
        let out_dir = tmp.path().join("exports");
        let script = format!("{}\r\n3\r\n{}\r\n", out_dir.display(), pdf.display());

        let (outcome, _) = run(&script, &tmp.path().join("output"));
        assert_eq!(
            outcome,
            CollectOutcome::Ready(ExtractionRequest {
                output_dir: out_dir,
                mode: ExtractionMode::Images,
                pdf_path: pdf,
            })
        );
    }

    #[test]
    fn end_of_input_reads_as_blank() {
        let tmp = tempfile::tempdir().unwrap();
        let default_dir = tmp.path().join("output");
        let (outcome, _) = run("", &default_dir);
        assert!(default_dir.is_dir());
        assert_eq!(outcome, CollectOutcome::InvalidChoice(String::new()));
    }
}
