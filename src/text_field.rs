use unicode_width::UnicodeWidthStr;

/// Single-line input with a cursor counted in chars.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
    cursor: usize,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.value.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.value.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.char_len() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Cursor position in chars.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Terminal column of the cursor, for wide glyphs too. Saturates at
    /// `u16::MAX`.
    pub fn cursor_column(&self) -> u16 {
        let before = &self.value[..self.byte_index(self.cursor)];
        u16::try_from(before.width()).unwrap_or(u16::MAX)
    }
}

impl From<&str> for TextField {
    fn from(value: &str) -> Self {
        TextField {
            value: value.to_string(),
            cursor: value.chars().count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_editing_in_the_middle() {
        let mut field = TextField::from("caxm");
        field.left();
        field.backspace();
        field.insert('l');
        assert_eq!(field.value(), "calm");

        field.home();
        field.delete();
        assert_eq!(field.value(), "alm");
        field.end();
        field.insert('!');
        assert_eq!(field.value(), "alm!");
    }

    #[test]
    fn multibyte_chars_move_as_one() {
        let mut field = TextField::new();
        for c in "día".chars() {
            field.insert(c);
        }
        field.left();
        field.backspace();
        assert_eq!(field.value(), "da");
        assert_eq!(field.cursor_column(), 1);
    }

    #[test]
    fn wide_glyphs_take_two_columns() {
        let field = TextField::from("日記");
        assert_eq!(field.cursor_column(), 4);
    }

    #[test]
    fn very_wide_text_saturates_the_column() {
        let long = "日".repeat(40_000);
        let field = TextField::from(long.as_str());
        assert_eq!(field.cursor(), 40_000);
        assert_eq!(field.cursor_column(), u16::MAX);
    }

    #[test]
    fn edges_are_no_ops() {
        let mut field = TextField::new();
        field.backspace();
        field.delete();
        field.left();
        field.right();
        assert!(field.is_empty());

        let mut field = TextField::from("x");
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.cursor_column(), 0);
    }
}
