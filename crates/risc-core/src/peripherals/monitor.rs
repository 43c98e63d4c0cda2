//! Four-line scrolling text monitor behind I/O port 0.

/// Number of visible lines.
pub const MONITOR_LINES: usize = 4;
/// Characters per line.
pub const MONITOR_COLUMNS: usize = 20;

/// Scrolling text buffer.
///
/// Text fills the screen top-down. The cursor line advances once it is
/// full and a further byte arrives. Past the last line the screen scrolls
/// up by one and output continues on a fresh last line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextMonitor {
    lines: [String; MONITOR_LINES],
    cursor: usize,
}

impl TextMonitor {
    /// Creates a blank monitor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Visible lines, top first.
    #[must_use]
    pub const fn lines(&self) -> &[String; MONITOR_LINES] {
        &self.lines
    }

    /// Blanks every line and homes the cursor.
    pub fn clear(&mut self) {
        self.lines.iter_mut().for_each(String::clear);
        self.cursor = 0;
    }

    /// Feeds one byte from the bus.
    ///
    /// `\n` moves output to the next line, scrolling every line up and
    /// blanking the last one when the cursor is already at the bottom. `\r`
    /// pads the cursor line with spaces to full width. Any other byte is
    /// appended to the cursor line as a Latin-1 character.
    pub fn write_byte(&mut self, byte: u8) {
        match byte {
            b'\n' => self.new_line(),
            b'\r' => {
                let line = self.cursor_line();
                let used = self.lines[line].chars().count();
                self.lines[line].push_str(&" ".repeat(MONITOR_COLUMNS - used));
            }
            _ => {
                let line = self.cursor_line();
                self.lines[line].push(char::from(byte));
            }
        }
    }

    fn new_line(&mut self) {
        if self.cursor + 1 < MONITOR_LINES {
            self.cursor += 1;
        } else {
            self.lines.rotate_left(1);
            self.lines[MONITOR_LINES - 1].clear();
        }
    }

    fn is_full(line: &str) -> bool {
        line.chars().count() >= MONITOR_COLUMNS
    }

    /// Index of the line with room, moving to a new line when the cursor
    /// line is full.
    fn cursor_line(&mut self) -> usize {
        if Self::is_full(&self.lines[self.cursor]) {
            self.new_line();
        }
        self.cursor
    }
}
