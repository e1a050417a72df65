//! Blending a dialog onto an already styled frame.

use crate::ansi::{truncate, truncate_left, visible_width};

/// Place `dialog` centered over `base` and return the blended frame.
///
/// Both are lists of SGR-styled lines. Base rows not covered by the dialog
/// are returned unchanged; covered rows keep the base text on both sides of
/// the dialog, with the right side restyled from the last escape it lost.
pub fn composite(base: &[String], dialog: &[String]) -> Vec<String> {
    let base_width = base.iter().map(|l| visible_width(l)).max().unwrap_or(0);
    let dialog_width = dialog.iter().map(|l| visible_width(l)).max().unwrap_or(0);

    let left = base_width.saturating_sub(dialog_width) / 2;
    let top = base.len().saturating_sub(dialog.len()) / 2;

    let mut out = base.to_vec();
    for (i, dialog_row) in dialog.iter().enumerate() {
        let Some(row) = out.get_mut(top + i) else {
            break;
        };

        let width = visible_width(row);
        let mut padded = std::mem::take(row);
        if width < left {
            padded.extend(std::iter::repeat(' ').take(left - width));
        }

        let left_part = truncate(&padded, left);
        let right_part = truncate_left(&padded, left + visible_width(dialog_row));
        *row = format!("{left_part}{dialog_row}{right_part}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain_frame(width: usize, height: usize) -> Vec<String> {
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| char::from(b'a' + ((x + y) % 26) as u8))
                    .collect()
            })
            .collect()
    }

    #[test]
    fn dialog_is_centered() {
        let base = plain_frame(80, 24);
        let dialog = vec!["#####".to_string(); 3];

        let out = composite(&base, &dialog);

        assert_eq!(out.len(), 24);
        for (y, row) in out.iter().enumerate() {
            if (10..13).contains(&y) {
                assert_eq!(&row[37..42], "#####");
                assert_eq!(&row[..37], &base[y][..37]);
                assert_eq!(&row[42..], &base[y][42..]);
            } else {
                assert_eq!(row, &base[y]);
            }
            assert_eq!(visible_width(row), 80);
        }
    }

    #[test]
    fn right_side_keeps_its_color() {
        let base = vec![format!("\x1b[31m{}\x1b[0m", "r".repeat(20))];
        let dialog = vec!["\x1b[44mDD\x1b[0m".to_string()];

        let out = composite(&base, &dialog);

        assert_eq!(
            out[0],
            format!(
                "\x1b[31m{}\x1b[44mDD\x1b[0m\x1b[31m{}\x1b[0m",
                "r".repeat(9),
                "r".repeat(9)
            )
        );
        assert_eq!(visible_width(&out[0]), 20);
    }

    #[test]
    fn short_base_row_is_padded() {
        let base = vec!["x".repeat(10), "ab".to_string(), "y".repeat(10)];
        let dialog = vec!["DD".to_string()];

        let out = composite(&base, &dialog);

        assert_eq!(out[1], "ab  DD");
        assert_eq!(out[0], base[0]);
        assert_eq!(out[2], base[2]);
    }

    #[test]
    fn dialog_taller_than_base_is_clipped() {
        let base = vec!["....".to_string(); 2];
        let dialog = vec!["1".to_string(), "2".to_string(), "3".to_string()];

        let out = composite(&base, &dialog);

        assert_eq!(out, vec![".1..".to_string(), ".2..".to_string()]);
    }

    #[test]
    fn wide_dialog_starts_at_column_zero() {
        let base = vec!["abc".to_string()];
        let dialog = vec!["WIDER".to_string()];

        assert_eq!(composite(&base, &dialog), vec!["WIDER".to_string()]);
    }
}
