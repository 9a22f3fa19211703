//! Best-effort transcript logging
//!
//! When the user passes `--log <file>`, every completed chat turn is appended
//! to that file. Logging failures are reported once in the transcript and are
//! never fatal to the session.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::core::message::{ChatMessage, Sender};

pub struct TranscriptLog {
    file_path: Option<String>,
    is_active: bool,
}

impl TranscriptLog {
    pub fn new(log_file: Option<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let log = TranscriptLog {
            is_active: log_file.is_some(),
            file_path: log_file,
        };

        // Fail early if the requested file is not writable.
        if let Some(path) = &log.file_path {
            log.test_file_access(path)?;
        }

        Ok(log)
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Append one chat turn to the log file, preserving the on-screen layout.
    pub fn log_message(&self, message: &ChatMessage) -> Result<(), Box<dyn std::error::Error>> {
        if !self.is_active || self.file_path.is_none() {
            return Ok(());
        }

        let file_path = self.file_path.as_ref().unwrap();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(file_path)?;

        let prefix = match message.sender {
            Sender::User => "You: ",
            Sender::Bot => "",
        };
        writeln!(file, "[{}] {}{}", message.timestamp.to_rfc3339(), prefix, message.text)?;
        for source in &message.sources {
            writeln!(file, "    - {} ({})", source.chapter_title, source.page_reference)?;
        }
        if let Some(confidence) = message.confidence {
            writeln!(file, "    Confidence: {:.1}%", confidence * 100.0)?;
        }
        writeln!(file)?;

        file.flush()?;
        Ok(())
    }

    pub fn get_status_string(&self) -> String {
        match (&self.file_path, self.is_active) {
            (None, _) => "disabled".to_string(),
            (Some(path), true) => format!(
                "active ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
            (Some(path), false) => format!(
                "paused ({})",
                Path::new(path)
                    .file_name()
                    .unwrap_or_default()
                    .to_string_lossy()
            ),
        }
    }

    fn test_file_access(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.flush()?;
        Ok(())
    }
}
