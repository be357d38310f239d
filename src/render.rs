//! Renderer (§4.3, C3): projects the prompt + logical line onto the
//! physical terminal, re-wrapping at the current width and repainting only
//! the footprint the previous frame used.
//!
//! Rather than diffing old/new frames character by character, each call
//! moves up to the top of the previous footprint, clears everything below,
//! and repaints from there — the same strategy §4.3 explicitly sanctions
//! for a SIGWINCH redraw ("recompute width, clear previous footprint,
//! redraw"), applied uniformly. Row wrapping is done by this module, not
//! left to the terminal's own auto-margin behavior, which is what keeps a
//! line that exactly fills the last column from landing in the "did it
//! auto-wrap or not" ambiguity §4.3 calls out.

use crate::error::Result;
use crate::line_buffer::LineBuffer;
use crate::tty::{display_width, Terminal};

/// Tracks enough of the previous frame to clear it before drawing the next
/// one: how many rows down the cursor ended up relative to the first row of
/// the prompt, or (on a dumb terminal) where the horizontal scroll window
/// currently starts.
#[derive(Debug, Default)]
pub struct Renderer {
    last_cursor_row: u16,
    /// Character index into `prompt ++ line` where the dumb-terminal scroll
    /// window begins (§4.3's "horizontal scroll window"). Unused on
    /// multi-row back-ends.
    dumb_scroll_start: usize,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repaint `prompt` followed by `line`'s text, leaving the physical
    /// cursor at `line`'s logical cursor position.
    pub fn render<T: Terminal>(&mut self, term: &mut T, prompt: &str, line: &LineBuffer) -> Result<()> {
        let size = term.size()?;
        let cols = usize::from(size.cols.max(1));

        if !term.supports_multiline() {
            return self.render_dumb(term, prompt, line, cols);
        }

        if self.last_cursor_row > 0 {
            term.move_cursor_up(self.last_cursor_row)?;
        }
        term.move_to_column(0)?;
        term.clear_to_end_of_screen()?;

        let full = format!("{prompt}{}", line.to_line());
        let cursor_offset = display_width(prompt) + display_width(&line.left());
        let rows = wrap_into_rows(&full, cols);

        let mut consumed = 0usize;
        let mut cursor_row: u16 = 0;
        let mut cursor_col: usize = 0;
        let mut found = false;

        for (i, row) in rows.iter().enumerate() {
            if i > 0 {
                term.move_cursor_down(1)?;
                term.move_to_column(0)?;
            }
            term.write_str(row)?;
            let row_width = display_width(row);
            if !found && cursor_offset <= consumed + row_width {
                cursor_row = i as u16;
                cursor_col = cursor_offset - consumed;
                found = true;
            }
            consumed += row_width;
        }
        if !found {
            cursor_row = rows.len().saturating_sub(1) as u16;
            cursor_col = rows.last().map(|r| display_width(r)).unwrap_or(0);
        }

        let last_row = rows.len().saturating_sub(1) as u16;
        if last_row > cursor_row {
            term.move_cursor_up(last_row - cursor_row)?;
        }
        term.move_to_column(cursor_col as u16)?;

        self.last_cursor_row = cursor_row;
        term.flush()
    }

    /// `Ctrl-L`: clear the whole screen (not just this frame's footprint)
    /// and repaint from row 0.
    pub fn clear_screen<T: Terminal>(&mut self, term: &mut T, prompt: &str, line: &LineBuffer) -> Result<()> {
        if self.last_cursor_row > 0 {
            term.move_cursor_up(self.last_cursor_row)?;
        }
        term.move_to_column(0)?;
        term.clear_to_end_of_screen()?;
        self.last_cursor_row = 0;
        self.render(term, prompt, line)
    }

    /// Forget the last footprint, forcing the next [`Renderer::render`] call
    /// to treat the cursor as already sitting at row 0 of the prompt. Used
    /// after a SIGWINCH, where the old row accounting no longer applies to
    /// the new width.
    pub fn reset_footprint(&mut self) {
        self.last_cursor_row = 0;
        self.dumb_scroll_start = 0;
    }

    /// Single-row horizontal-scroll rendering for a back-end with no
    /// cursor addressing beyond "go to column 0" and backspace (§4.1's
    /// dumb-terminal branch, §4.3's scroll-window contract). The window
    /// always covers the logical cursor, with a `<`/`>` marker whenever
    /// text is truncated on that side; the whole window is rewritten from
    /// column 0 on every call, then the physical cursor is walked back
    /// from the end of the window with `move_cursor_left` (literal
    /// backspaces on [`crate::tty::dumb::DumbTerminal`]).
    fn render_dumb<T: Terminal>(&mut self, term: &mut T, prompt: &str, line: &LineBuffer, cols: usize) -> Result<()> {
        let chars: Vec<char> = format!("{prompt}{}", line.to_line()).chars().collect();
        let widths: Vec<usize> = chars.iter().map(|&c| crate::tty::char_width(c)).collect();
        let cursor_idx = prompt.chars().count() + line.left().chars().count();

        if cursor_idx < self.dumb_scroll_start {
            self.dumb_scroll_start = cursor_idx;
        }
        let (end, left_marker, right_marker) = loop {
            let (end, left_marker, right_marker) = fit_window(&widths, self.dumb_scroll_start, cols);
            if cursor_idx > end {
                self.dumb_scroll_start += 1;
                continue;
            }
            break (end, left_marker, right_marker);
        };
        let start = self.dumb_scroll_start;

        term.clear_to_end_of_line()?;
        let mut out = String::new();
        if left_marker {
            out.push('<');
        }
        out.extend(chars[start..end].iter().copied());
        if right_marker {
            out.push('>');
        }
        term.write_str(&out)?;

        let trailing: usize =
            widths[cursor_idx..end].iter().sum::<usize>() + usize::from(right_marker);
        if trailing > 0 {
            term.move_cursor_left(trailing as u16)?;
        }
        term.flush()
    }
}

/// Find the largest window `[start, end)` into `widths` that fits within
/// `cols` display columns, reserving one column for a `<` marker when
/// `start > 0` and one for a `>` marker when the window doesn't reach the
/// end of `widths`.
fn fit_window(widths: &[usize], start: usize, cols: usize) -> (usize, bool, bool) {
    let left_marker = start > 0;
    let budget = cols.saturating_sub(usize::from(left_marker));

    let mut end = start;
    let mut used = 0usize;
    while end < widths.len() && used + widths[end] <= budget {
        used += widths[end];
        end += 1;
    }

    let right_marker = end < widths.len();
    if right_marker {
        let budget = budget.saturating_sub(1);
        while end > start && used > budget {
            end -= 1;
            used -= widths[end];
        }
    }
    (end, left_marker, right_marker)
}

/// Break `s` into rows of at most `cols` display-width columns each,
/// without ever splitting a character.
fn wrap_into_rows(s: &str, cols: usize) -> Vec<String> {
    let mut rows = vec![String::new()];
    let mut row_width = 0usize;
    for c in s.chars() {
        let w = crate::tty::char_width(c);
        if row_width + w > cols && row_width > 0 {
            rows.push(String::new());
            row_width = 0;
        }
        rows.last_mut().expect("just pushed").push(c);
        row_width += w;
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_line_is_a_single_row() {
        let rows = wrap_into_rows("hello", 80);
        assert_eq!(rows, vec!["hello".to_string()]);
    }

    #[test]
    fn exact_width_line_does_not_leave_a_trailing_empty_row() {
        let rows = wrap_into_rows("abcde", 5);
        assert_eq!(rows, vec!["abcde".to_string()]);
    }

    #[test]
    fn overflow_wraps_to_a_second_row() {
        let rows = wrap_into_rows("abcdef", 5);
        assert_eq!(rows, vec!["abcde".to_string(), "f".to_string()]);
    }

    #[test]
    fn wide_char_that_would_split_a_row_moves_to_the_next_row_whole() {
        // "abcd" is 4 wide; one more wide (width-2) char would make 6 > 5.
        let rows = wrap_into_rows("abcd文", 5);
        assert_eq!(rows, vec!["abcd".to_string(), "文".to_string()]);
    }

    #[test]
    fn fit_window_no_truncation_needs_no_markers() {
        let widths = vec![1; 5];
        let (end, left, right) = fit_window(&widths, 0, 10);
        assert_eq!((end, left, right), (5, false, false));
    }

    #[test]
    fn fit_window_reserves_a_column_for_the_overflow_marker() {
        let widths = vec![1; 10];
        let (end, left, right) = fit_window(&widths, 0, 5);
        // 5 columns, no left marker, one reserved for '>': 4 chars shown.
        assert_eq!((end, left, right), (4, false, true));
    }

    #[test]
    fn fit_window_mid_line_shows_both_markers() {
        let widths = vec![1; 10];
        let (end, left, right) = fit_window(&widths, 3, 5);
        assert!(left);
        assert!(right);
        // 5 columns minus one for each marker leaves 3 characters.
        assert_eq!(end - 3, 3);
    }

    #[test]
    fn fit_window_reaching_the_end_drops_the_right_marker() {
        let widths = vec![1; 6];
        let (end, _left, right) = fit_window(&widths, 3, 5);
        assert_eq!(end, 6);
        assert!(!right);
    }
}
