//! An unbounded, two-sided tape.
//!
//! Cells at non-negative offsets live in one buffer and cells at negative offsets in another
//! (stored mirrored, so offset `-1` is `left[0]`). Reads outside the populated region return
//! the blank symbol without growing either buffer; writes outside it grow the matching buffer.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    right: Vec<char>,
    left: Vec<char>,
    blank: char,
}

impl Tape {
    /// Creates an empty tape.
    pub fn new(blank: char) -> Self {
        Self {
            right: Vec::new(),
            left: Vec::new(),
            blank,
        }
    }

    /// Creates a tape whose cells `0..n` hold the given symbols.
    pub fn from_symbols<I: IntoIterator<Item = char>>(symbols: I, blank: char) -> Self {
        Self {
            right: symbols.into_iter().collect(),
            left: Vec::new(),
            blank,
        }
    }

    /// Returns the blank symbol of this tape.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// Reads the symbol at `pos`, returning the blank symbol outside the populated region.
    pub fn read(&self, pos: i64) -> char {
        let cell = if pos >= 0 {
            self.right.get(pos as usize)
        } else {
            self.left.get((-pos - 1) as usize)
        };

        cell.copied().unwrap_or(self.blank)
    }

    /// Writes `symbol` at `pos`, extending the populated region with blanks as needed.
    pub fn write(&mut self, pos: i64, symbol: char) {
        let (cells, index) = if pos >= 0 {
            (&mut self.right, pos as usize)
        } else {
            (&mut self.left, (-pos - 1) as usize)
        };

        if index >= cells.len() {
            cells.resize(index + 1, self.blank);
        }

        cells[index] = symbol;
    }

    /// The populated region as a half-open range of offsets.
    pub fn bounds(&self) -> (i64, i64) {
        (-(self.left.len() as i64), self.right.len() as i64)
    }

    /// Iterates over the populated region from left to right.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.left.iter().rev().chain(self.right.iter()).copied()
    }

    /// The tape content with leading and trailing blanks removed.
    ///
    /// An all-blank tape has empty content.
    pub fn content(&self) -> String {
        let symbols: String = self.symbols().collect();
        symbols.trim_matches(self.blank).to_string()
    }

    /// Counts the occurrences of `symbol` in the populated region.
    pub fn count(&self, symbol: char) -> usize {
        self.symbols().filter(|&s| s == symbol).count()
    }

    /// Renders the populated region (widened to include `head`) with a caret under the head.
    pub fn render(&self, head: i64) -> String {
        let (start, end) = self.bounds();
        let start = start.min(head);
        let end = end.max(head + 1);

        let cells: String = (start..end).map(|pos| self.read(pos)).collect();
        let caret = " ".repeat((head - start) as usize);

        format!("{cells}\n{caret}^")
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_outside_is_blank() {
        let tape = Tape::from_symbols("ab".chars(), '_');

        assert_eq!(tape.read(0), 'a');
        assert_eq!(tape.read(1), 'b');
        assert_eq!(tape.read(2), '_');
        assert_eq!(tape.read(-5), '_');
        assert_eq!(tape.bounds(), (0, 2));
    }

    #[test]
    fn test_write_extends_both_directions() {
        let mut tape = Tape::new('0');

        tape.write(-2, '1');
        tape.write(3, '1');

        assert_eq!(tape.bounds(), (-2, 4));
        assert_eq!(tape.symbols().collect::<String>(), "100001");
        assert_eq!(tape.read(-1), '0');
        assert_eq!(tape.count('1'), 2);
    }

    #[test]
    fn test_write_past_edge_pads_with_blanks() {
        let mut tape = Tape::from_symbols("1".chars(), '0');

        tape.write(3, '0');

        assert_eq!(tape.bounds(), (0, 4));
        assert_eq!(tape.symbols().collect::<String>(), "1000");
        assert_eq!(tape.content(), "1");
    }

    #[test]
    fn test_content_trims_blanks() {
        let mut tape = Tape::from_symbols("__1_1__".chars(), '_');
        assert_eq!(tape.content(), "1_1");

        tape.write(2, '_');
        tape.write(4, '_');
        assert_eq!(tape.content(), "");
        assert_eq!(tape.to_string(), "");
    }

    #[test]
    fn test_render_marks_head() {
        let tape = Tape::from_symbols("abc".chars(), '_');

        assert_eq!(tape.render(1), "abc\n ^");
        assert_eq!(tape.render(-1), "_abc\n^");
        assert_eq!(tape.render(4), "abc__\n    ^");
    }
}
