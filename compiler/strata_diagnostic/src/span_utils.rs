//! Byte offsets to 1-based line and column positions.

use strata_ir::Span;

/// Start offsets of every line of one input.
///
/// ```
/// use strata_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "model m {\n  item x;\n}";
/// let lines = LineOffsetTable::build(source);
///
/// assert_eq!(lines.position(source, 0), (1, 1));
/// assert_eq!(lines.position(source, 12), (2, 3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    /// Never empty; the first line starts at 0.
    starts: Vec<u32>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(
                source
                    .match_indices('\n')
                    .map(|(newline, _)| u32::try_from(newline + 1).unwrap_or(u32::MAX)),
            )
            .collect();
        LineOffsetTable { starts }
    }

    /// 1-based line containing `offset`. A newline belongs to the line it
    /// ends.
    pub fn line(&self, offset: u32) -> u32 {
        let index = self.starts.partition_point(|&start| start <= offset);
        u32::try_from(index).unwrap_or(u32::MAX).max(1)
    }

    /// 1-based `(line, column)` of `offset`, the column counted in
    /// characters. Offsets past the end clamp to the end of `source`.
    pub fn position(&self, source: &str, offset: u32) -> (u32, u32) {
        let line = self.line(offset);
        let start = self.starts[line as usize - 1] as usize;
        let end = (offset as usize).clamp(start, source.len().max(start));
        let column = source.get(start..end).map_or(0, |text| text.chars().count());
        (line, u32::try_from(column).unwrap_or(u32::MAX - 1) + 1)
    }

    pub fn span_start(&self, source: &str, span: Span) -> (u32, u32) {
        self.position(source, span.start)
    }

    pub fn line_count(&self) -> usize {
        self.starts.len()
    }
}

/// One-off [`LineOffsetTable::position`] lookup.
pub fn line_col(source: &str, offset: u32) -> (u32, u32) {
    LineOffsetTable::build(source).position(source, offset)
}

#[cfg(test)]
mod tests;
