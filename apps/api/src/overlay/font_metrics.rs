//! Static Helvetica width table for overlay text measurement.
//!
//! The overlay path draws replacement text in Helvetica (one of the 14
//! standard PDF fonts, always available without embedding), so a static
//! AFM-derived width table is exact, not an approximation. Widths are in
//! 1/1000 em units; `measure` scales by font size to get points.
//! Covers ASCII 0x20..=0x7E; anything outside falls back to an average
//! width, same scheme the rest of the ecosystem uses for metric tables.

/// Widths of ASCII 0x20 (space) through 0x7E (~) in 1/1000 em, straight
/// from the Helvetica AFM.
#[rustfmt::skip]
static HELVETICA_WIDTHS: [u16; 95] = [
    // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
     278,  278,  355,  556,  556,  889,  667,  191,  333,  333,  389,  584,  278,  333,  278,  278,
    // 0     1     2     3     4     5     6     7     8     9
     556,  556,  556,  556,  556,  556,  556,  556,  556,  556,
    // :     ;     <     =     >     ?     @
     278,  278,  584,  584,  584,  556, 1015,
    // A     B     C     D     E     F     G     H     I     J     K     L     M
     667,  667,  722,  722,  667,  611,  778,  722,  278,  500,  667,  556,  833,
    // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
     722,  778,  667,  778,  722,  667,  611,  722,  667,  944,  667,  667,  611,
    // [     \     ]     ^     _     `
     278,  278,  278,  469,  556,  333,
    // a     b     c     d     e     f     g     h     i     j     k     l     m
     556,  556,  500,  556,  556,  278,  556,  556,  222,  222,  500,  222,  833,
    // n     o     p     q     r     s     t     u     v     w     x     y     z
     556,  556,  556,  556,  333,  500,  278,  556,  500,  722,  500,  500,  500,
    // {     |     }     ~
     334,  260,  334,  584,
];

/// Fallback for codepoints outside the table (accented characters mostly).
const AVERAGE_WIDTH: u16 = 556;

/// Width of one character in 1/1000 em.
fn char_width(c: char) -> u16 {
    let code = c as usize;
    if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[code - 32]
    } else {
        AVERAGE_WIDTH
    }
}

/// Measured width of `text` at `font_size` points.
pub fn measure(text: &str, font_size: f32) -> f32 {
    let em_thousandths: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    em_thousandths as f32 / 1000.0 * font_size
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string_is_zero() {
        assert_eq!(measure("", 12.0), 0.0);
    }

    #[test]
    fn test_space_width() {
        // 278/1000 em at 10pt = 2.78pt
        assert!((measure(" ", 10.0) - 2.78).abs() < 1e-4);
    }

    #[test]
    fn test_width_scales_linearly_with_size() {
        let at_six = measure("Senior Engineer", 6.0);
        let at_twelve = measure("Senior Engineer", 12.0);
        assert!((at_twelve - 2.0 * at_six).abs() < 1e-3);
    }

    #[test]
    fn test_wider_string_measures_wider() {
        assert!(measure("WWW", 10.0) > measure("iii", 10.0));
    }

    #[test]
    fn test_non_ascii_falls_back_to_average() {
        assert!((measure("é", 10.0) - 5.56).abs() < 1e-4);
    }
}
