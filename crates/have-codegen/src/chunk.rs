//! Append-only output buffer.

/// Accumulated target text of one compilation.
///
/// Text is only ever appended. `newline` starts a new line at the current
/// indentation level; `indent`/`dedent` change the level for the lines that
/// follow.
#[derive(Debug, Clone)]
pub struct CodeChunk {
    buf: String,
    unit: String,
    level: usize,
}

impl CodeChunk {
    /// An empty buffer indenting with `unit` per nesting level.
    pub fn new(unit: impl Into<String>) -> Self {
        CodeChunk {
            buf: String::new(),
            unit: unit.into(),
            level: 0,
        }
    }

    pub fn write(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    pub fn newline(&mut self) {
        self.buf.push('\n');
        for _ in 0..self.level {
            self.buf.push_str(&self.unit);
        }
    }

    pub fn indent(&mut self) {
        self.level += 1;
    }

    /// # Panics
    ///
    /// Panics if called more often than `indent`.
    pub fn dedent(&mut self) {
        self.level = self
            .level
            .checked_sub(1)
            .expect("dedent without matching indent");
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Everything written so far.
    pub fn read_all(&self) -> &str {
        &self.buf
    }
}

impl Default for CodeChunk {
    fn default() -> Self {
        CodeChunk::new("\t")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newline_applies_current_level() {
        let mut chunk = CodeChunk::new("  ");
        chunk.write("a {");
        chunk.indent();
        chunk.newline();
        chunk.write("b");
        chunk.dedent();
        chunk.newline();
        chunk.write("}");
        assert_eq!(chunk.read_all(), "a {\n  b\n}");
        assert_eq!(chunk.level(), 0);
    }

    #[test]
    fn default_indents_with_tab() {
        let mut chunk = CodeChunk::default();
        chunk.indent();
        chunk.indent();
        chunk.newline();
        assert_eq!(chunk.read_all(), "\n\t\t");
    }

    #[test]
    #[should_panic(expected = "dedent without matching indent")]
    fn unbalanced_dedent_panics() {
        CodeChunk::default().dedent();
    }
}
