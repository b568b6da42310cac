//! Individual output format implementations
use crate::output::OutputFormatterTrait;
use crate::search::{Match, SearchResult};
use byte_unit::{Byte, UnitType};
use colored::*;
use serde::Serialize;
use std::path::Path;

/// Human-readable listing, one block per file
pub struct TextFormatter {
    context_lines: usize,
    include_context: bool,
    use_color: bool,
}

impl TextFormatter {
    pub fn new(context_lines: usize) -> Self {
        Self {
            context_lines,
            include_context: context_lines > 0,
            use_color: is_terminal::is_terminal(&std::io::stdout()),
        }
    }

    /// Same layout without ANSI colors.
    pub fn plain(context_lines: usize) -> Self {
        Self {
            use_color: false,
            ..Self::new(context_lines)
        }
    }

    fn header(&self, result: &SearchResult) -> String {
        let size = Byte::from_u64(result.file_size).get_appropriate_unit(UnitType::Binary);
        let summary = format!(
            "({} match{}, {:.2} {}, modified {})",
            result.matches.len(),
            if result.matches.len() == 1 { "" } else { "es" },
            size.get_value(),
            size.get_unit(),
            format_timestamp(result.modified)
        );
        let path = result.file_path.display().to_string();
        if self.use_color {
            format!("{} {}", path.green().bold(), summary.dimmed())
        } else {
            format!("{path} {summary}")
        }
    }

    fn highlight(&self, line: &str, m: &Match) -> String {
        let len = m.matched_text.chars().count();
        let before: String = line.chars().take(m.column).collect();
        let after: String = line.chars().skip(m.column + len).collect();
        if self.use_color {
            format!("{before}{}{after}", m.matched_text.yellow().bold())
        } else {
            format!("{before}{}{after}", m.matched_text)
        }
    }
}

impl OutputFormatterTrait for TextFormatter {
    fn format(&self, results: &[SearchResult], query: &str, root: &Path) -> String {
        let mut output = String::new();
        let total: usize = results.iter().map(|r| r.matches.len()).sum();
        output.push_str(&format!("Query: {query}\n"));
        output.push_str(&format!("Path: {}\n", root.display()));
        output.push_str(&format!(
            "Found {total} matches in {} files\n",
            results.len()
        ));

        for result in results {
            output.push('\n');
            output.push_str(&self.header(result));
            output.push('\n');

            for m in &result.matches {
                let lines: Vec<&str> = m.context.split('\n').collect();
                let offset = (m.line_number - 1).min(self.context_lines);
                let first = m.line_number - offset;
                let matched_line = lines.get(offset).copied().unwrap_or_default();

                if !self.include_context {
                    output.push_str(&format!(
                        "  {}:{}: {}\n",
                        m.line_number,
                        m.column + 1,
                        self.highlight(matched_line, m)
                    ));
                    continue;
                }

                output.push_str("  --\n");
                for (i, line) in lines.iter().enumerate() {
                    let number = first + i;
                    if i == offset {
                        output.push_str(&format!(
                            "→ {number:>5} │ {}\n",
                            self.highlight(line, m)
                        ));
                    } else if self.use_color {
                        output.push_str(&format!(
                            "  {} │ {}\n",
                            format!("{number:>5}").dimmed(),
                            line.dimmed()
                        ));
                    } else {
                        output.push_str(&format!("  {number:>5} │ {line}\n"));
                    }
                }
            }
        }

        output
    }

    fn name(&self) -> &str {
        "text"
    }
}

/// JSON document with the full result set
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    pub fn compact() -> Self {
        Self { pretty: false }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    query: &'a str,
    path: &'a Path,
    total_files: usize,
    total_matches: usize,
    results: &'a [SearchResult],
}

impl OutputFormatterTrait for JsonFormatter {
    fn format(&self, results: &[SearchResult], query: &str, root: &Path) -> String {
        let report = JsonReport {
            query,
            path: root,
            total_files: results.len(),
            total_matches: results.iter().map(|r| r.matches.len()).sum(),
            results,
        };

        let rendered = if self.pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        };
        rendered.unwrap_or_else(|_| "{}".to_string())
    }

    fn name(&self) -> &str {
        "json"
    }
}

fn format_timestamp(seconds: i64) -> String {
    if seconds == 0 {
        return "unknown".to_string();
    }
    chrono::DateTime::from_timestamp(seconds, 0)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
