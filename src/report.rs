//! Non-fatal diagnostics and the end-of-run conversion report.

use std::fmt;
use std::path::PathBuf;

#[cfg(feature = "colorized_output")]
use console::style;

use crate::signal::PhysicalLayout;
use crate::store::StoreStats;

/// Kind of a non-fatal condition met during conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Value skipped because it was an empty array or list
    SkippedEmpty,
    /// Value skipped because it had more than one array dimension
    SkippedDimensionality(usize),
    /// Heterogeneous array upgraded to float
    CoercedToFloat,
    /// Channel had no position in the supplied montage
    MontageUnmatched,
}

impl DiagnosticKind {
    /// True for conditions that dropped information from the output
    pub fn is_skip(&self) -> bool {
        matches!(
            self,
            DiagnosticKind::SkippedEmpty | DiagnosticKind::SkippedDimensionality(_)
        )
    }
}

/// A non-fatal condition tied to a metadata key path or channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Dotted key path (or channel name) the condition refers to
    pub path: String,
    /// What happened
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Empty value skipped at `path`
    pub fn skipped_empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: DiagnosticKind::SkippedEmpty,
        }
    }

    /// Multidimensional value skipped at `path`
    pub fn skipped_dimensionality(path: impl Into<String>, ndim: usize) -> Self {
        Self {
            path: path.into(),
            kind: DiagnosticKind::SkippedDimensionality(ndim),
        }
    }

    /// Array at `path` coerced to float
    pub fn coerced(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: DiagnosticKind::CoercedToFloat,
        }
    }

    /// Channel missing from the montage
    pub fn montage_unmatched(channel: impl Into<String>) -> Self {
        Self {
            path: channel.into(),
            kind: DiagnosticKind::MontageUnmatched,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::SkippedEmpty => write!(f, "skipped empty value '{}'", self.path),
            DiagnosticKind::SkippedDimensionality(ndim) => write!(
                f,
                "skipped '{}' with {} dimensions",
                self.path, ndim
            ),
            DiagnosticKind::CoercedToFloat => {
                write!(f, "coerced mixed-type array '{}' to float", self.path)
            }
            DiagnosticKind::MontageUnmatched => {
                write!(f, "channel '{}' has no montage position", self.path)
            }
        }
    }
}

/// Accumulated diagnostics of one conversion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Append every diagnostic of `other`
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Iterate in the order conditions were met
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Diagnostics that dropped a value
    pub fn skipped(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.kind.is_skip())
    }

    /// True if any diagnostic refers to `path`
    pub fn contains_path(&self, path: &str) -> bool {
        self.entries.iter().any(|d| d.path == path)
    }

    /// Number of diagnostics
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was reported
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Summary of a finished conversion
#[derive(Debug, Clone)]
pub struct ConversionReport {
    /// Store file that was written
    pub output: PathBuf,
    /// Physical layout of the signal arrays
    pub layout: PhysicalLayout,
    /// Number of channels written
    pub channels: usize,
    /// Samples per channel
    pub samples: usize,
    /// Number of events tagged
    pub events: usize,
    /// Entity counts and size of the store
    pub store: StoreStats,
    /// Non-fatal conditions met on the way
    pub diagnostics: Diagnostics,
}

impl ConversionReport {
    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            let mut output = String::new();

            output.push_str(&format!("{}\n", style("sigtree Conversion Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("=========================").cyan()));
            output.push_str(&format!("{}: {}\n", style("Output").bold(), self.output.display()));
            output.push_str(&format!("{}: {}\n", style("Layout").bold(), self.layout));
            output.push_str(&format!(
                "{}: {} channels x {} samples, {} events\n",
                style("Signal").bold(),
                self.channels,
                self.samples,
                self.events
            ));
            output.push_str(&format!("{}: {}\n\n", style("Store").bold(), self.store));

            for diagnostic in self.diagnostics.iter() {
                let label = if diagnostic.kind.is_skip() {
                    style("SKIPPED").yellow().bold()
                } else {
                    style("NOTE").cyan().bold()
                };
                output.push_str(&format!("[{}] {}\n", label, diagnostic));
            }

            output.push_str(&format!(
                "{}: {} diagnostics ({} skipped values)\n",
                style("Summary").bold(),
                style(self.diagnostics.len()).yellow(),
                style(self.diagnostics.skipped().count()).yellow()
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "sigtree Conversion Report")?;
        writeln!(f, "=========================")?;
        writeln!(f, "Output: {}", self.output.display())?;
        writeln!(f, "Layout: {}", self.layout)?;
        writeln!(
            f,
            "Signal: {} channels x {} samples, {} events",
            self.channels, self.samples, self.events
        )?;
        writeln!(f, "Store: {}", self.store)?;
        writeln!(f)?;

        for diagnostic in self.diagnostics.iter() {
            let label = if diagnostic.kind.is_skip() {
                "SKIPPED"
            } else {
                "NOTE"
            };
            writeln!(f, "[{}] {}", label, diagnostic)?;
        }

        writeln!(
            f,
            "Summary: {} diagnostics ({} skipped values)",
            self.diagnostics.len(),
            self.diagnostics.skipped().count()
        )
    }
}
