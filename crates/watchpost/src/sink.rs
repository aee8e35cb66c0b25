//! Category log sinks.
//!
//! One append-only text stream per category. Writes are synchronous;
//! [`CategoryLogs`] catches I/O failures and reports them through `tracing`
//! instead of the category streams.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use chrono::Local;
use tracing::warn;

use crate::category::Category;

/// Backing store for category logs
pub trait LogSink {
    /// Append text (a trailing newline is added)
    fn append(&mut self, category: Category, text: &str) -> io::Result<()>;

    /// Truncate the category's stream and write `header` as its first line
    fn reset_with_header(&mut self, category: Category, header: &str) -> io::Result<()>;
}

/// One file per category under a log directory
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Create the sink, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> io::Result<Self> {
        fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, category: Category) -> PathBuf {
        self.dir.join(category.log_file_name())
    }
}

impl LogSink for FileSink {
    fn append(&mut self, category: Category, text: &str) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(category))?;
        writeln!(file, "{}", text)
    }

    fn reset_with_header(&mut self, category: Category, header: &str) -> io::Result<()> {
        let mut file = fs::File::create(self.path(category))?;
        writeln!(file, "{}", header)
    }
}

/// In-memory sink. Clones share the same buffers.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffers: Rc<RefCell<HashMap<Category, Vec<String>>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines written to a category, in order
    pub fn lines(&self, category: Category) -> Vec<String> {
        self.buffers
            .borrow()
            .get(&category)
            .map(|entries| {
                entries
                    .iter()
                    .flat_map(|e| e.lines().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn contents(&self, category: Category) -> String {
        self.lines(category).join("\n")
    }

    /// Number of lines in `category` containing `needle`
    pub fn count_matching(&self, category: Category, needle: &str) -> usize {
        self.lines(category)
            .iter()
            .filter(|l| l.contains(needle))
            .count()
    }
}

impl LogSink for MemorySink {
    fn append(&mut self, category: Category, text: &str) -> io::Result<()> {
        self.buffers
            .borrow_mut()
            .entry(category)
            .or_default()
            .push(text.to_string());
        Ok(())
    }

    fn reset_with_header(&mut self, category: Category, header: &str) -> io::Result<()> {
        self.buffers
            .borrow_mut()
            .insert(category, vec![header.to_string()]);
        Ok(())
    }
}

/// Category streams with timestamping and failure isolation
pub struct CategoryLogs {
    sink: Box<dyn LogSink>,
    timestamps: bool,
    failures: u64,
}

impl CategoryLogs {
    pub fn new(sink: Box<dyn LogSink>, timestamps: bool) -> Self {
        Self {
            sink,
            timestamps,
            failures: 0,
        }
    }

    /// Append to a category. Never fails; I/O errors are reported via `tracing`.
    pub fn write(&mut self, category: Category, text: &str) {
        let line = if self.timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S%.3f"), text)
        } else {
            text.to_string()
        };
        if let Err(e) = self.sink.append(category, &line) {
            self.failures += 1;
            warn!("Failed to write {} log: {}", category, e);
        }
    }

    pub fn write_lines<I, S>(&mut self, category: Category, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for line in lines {
            self.write(category, line.as_ref());
        }
    }

    /// Truncate a category and start it with a dated header
    pub fn reset_with_header(&mut self, category: Category, header: &str) {
        let line = format!(
            "==== {} log: {} ({}) ====",
            category,
            header,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        if let Err(e) = self.sink.reset_with_header(category, &line) {
            self.failures += 1;
            warn!("Failed to reset {} log: {}", category, e);
        }
    }

    pub fn reset_all(&mut self, header: &str) {
        for category in Category::all() {
            self.reset_with_header(category, header);
        }
    }

    /// Number of sink writes that failed so far
    pub fn failures(&self) -> u64 {
        self.failures
    }
}
