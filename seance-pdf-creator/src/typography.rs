//! Text wrapping and height measurement
//!
//! Box heights in the report are computed before anything is drawn, so the
//! measurement has to agree with what ends up on the page. Both sides go through
//! [`wrap_text`]: the layout code measures with it and then draws exactly the
//! lines it returned.

use unicode_segmentation::UnicodeSegmentation;

/// Width measurement callback, in points, for already prepared text.
pub trait TextMeasure {
    fn width(&self, text: &str) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> f32,
{
    fn width(&self, text: &str) -> f32 {
        self(text)
    }
}

/// Lines produced by wrapping one piece of text into a column.
#[derive(Debug, Clone, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    pub line_height: f32,
}

impl WrappedText {
    pub fn wrap<M: TextMeasure + ?Sized>(
        text: &str,
        max_width: f32,
        line_height: f32,
        measure: &M,
    ) -> Self {
        Self {
            lines: wrap_text(text, max_width, measure),
            line_height,
        }
    }

    /// Never less than one line, even for empty text.
    pub fn height(&self) -> f32 {
        (self.lines.len() as f32 * self.line_height).max(self.line_height)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Greedy word wrap.
///
/// Explicit `\n` breaks are kept and an empty input line yields one blank line.
/// Words are added to the current line while the candidate line still fits;
/// the overflowing word starts the next line. A single word wider than the
/// column is cut on grapheme boundaries so every line makes progress.
pub fn wrap_text<M: TextMeasure + ?Sized>(text: &str, max_width: f32, measure: &M) -> Vec<String> {
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let raw_line = raw_line.trim_end_matches('\r');
        let mut current = String::new();
        let mut any_word = false;

        for word in raw_line.split_whitespace() {
            any_word = true;
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };

            if measure.width(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }

            if measure.width(word) <= max_width {
                current = word.to_string();
            } else {
                let mut pieces = break_long_word(word, max_width, measure);
                // the tail stays open so following words can join it
                current = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
            }
        }

        if any_word {
            lines.push(current);
        } else {
            lines.push(String::new());
        }
    }

    lines
}

/// Cut a word that cannot fit on one line into column-sized pieces.
fn break_long_word<M: TextMeasure + ?Sized>(
    word: &str,
    max_width: f32,
    measure: &M,
) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for grapheme in word.graphemes(true) {
        let candidate = format!("{current}{grapheme}");
        if current.is_empty() || measure.width(&candidate) <= max_width {
            current = candidate;
        } else {
            pieces.push(std::mem::replace(&mut current, grapheme.to_string()));
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Height of `text` wrapped into `max_width`: `max(line_height, lines * line_height)`.
pub fn measure_height<M: TextMeasure + ?Sized>(
    text: &str,
    max_width: f32,
    line_height: f32,
    measure: &M,
) -> f32 {
    WrappedText::wrap(text, max_width, line_height, measure).height()
}

#[cfg(test)]
mod tests {
    use super::*;

    // five points per character, spaces included
    fn mono(text: &str) -> f32 {
        text.chars().count() as f32 * 5.0
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("Sauter sur un pied", 200.0, &mono), vec!["Sauter sur un pied"]);
    }

    #[test]
    fn words_wrap_greedily() {
        // 10 chars per line
        let lines = wrap_text("aaa bbb ccc ddd", 50.0, &mono);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn explicit_breaks_and_blank_lines_are_kept() {
        let lines = wrap_text("un\n\ndeux", 100.0, &mono);
        assert_eq!(lines, vec!["un", "", "deux"]);
        assert_eq!(measure_height("un\n\ndeux", 100.0, 12.0, &mono), 36.0);
    }

    #[test]
    fn empty_text_is_one_line_high() {
        assert_eq!(measure_height("", 100.0, 12.0, &mono), 12.0);
    }

    #[test]
    fn long_word_is_cut_and_tail_accepts_next_word() {
        let lines = wrap_text("abcdefghijkl mn", 25.0, &mono);
        assert_eq!(lines, vec!["abcde", "fghij", "kl mn"]);
    }

    #[test]
    fn column_narrower_than_a_glyph_still_progresses() {
        let lines = wrap_text("abc", 1.0, &mono);
        assert_eq!(lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn height_never_decreases_when_words_are_appended() {
        let words = [
            "Tient", "l'équilibre", "au", "moins", "trois", "secondes", "sur", "un", "pied",
            "sans", "se", "tenir", "au", "mur", "ni", "tomber", "anticonstitutionnellement",
        ];
        for width in [20.0, 60.0, 120.0, 300.0] {
            let mut text = String::new();
            let mut previous = 0.0;
            for word in words {
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(word);
                let height = measure_height(&text, width, 10.0, &mono);
                assert!(height >= previous, "height shrank at width {width}: {text}");
                previous = height;
            }
        }
    }

    #[test]
    fn accented_graphemes_are_not_split() {
        // "é" written as e + combining accent must stay together
        let word = "e\u{301}e\u{301}e\u{301}";
        let lines = wrap_text(word, 5.0, &|s: &str| s.graphemes(true).count() as f32 * 5.0);
        assert_eq!(lines.len(), 3);
        assert!(lines.iter().all(|l| l == "e\u{301}"));
    }
}
