use std::collections::HashMap;

use once_cell::sync::Lazy;

const FONT_HEIGHT: usize = 5;
const FONT_WIDTH: usize = 4;
const SHADOW_OFFSET: usize = 1;
const SPACING: usize = 1;
const FILL_CHAR: char = '█';
const SHADOW_CHAR: char = '▒';

type Glyph = [&'static str; FONT_HEIGHT];

/// Digits for the turn countdown plus the letters of the title banner.
static GLYPHS: Lazy<HashMap<char, Glyph>> = Lazy::new(|| {
    HashMap::from([
        ('0', ["####", "#  #", "#  #", "#  #", "####"]),
        ('1', ["  # ", " ## ", "  # ", "  # ", " ###"]),
        ('2', ["####", "   #", "####", "#   ", "####"]),
        ('3', ["####", "   #", " ###", "   #", "####"]),
        ('4', ["#  #", "#  #", "####", "   #", "   #"]),
        ('5', ["####", "#   ", "####", "   #", "####"]),
        ('6', ["####", "#   ", "####", "#  #", "####"]),
        ('7', ["####", "   #", "  # ", " #  ", " #  "]),
        ('8', ["####", "#  #", "####", "#  #", "####"]),
        ('9', ["####", "#  #", "####", "   #", "####"]),
        (':', ["    ", " #  ", "    ", " #  ", "    "]),
        ('+', ["    ", " #  ", "### ", " #  ", "    "]),
        ('S', [" ###", "#   ", " ## ", "   #", "### "]),
        ('C', [" ###", "#   ", "#   ", "#   ", " ###"]),
        ('I', ["### ", " #  ", " #  ", " #  ", "### "]),
        ('N', ["#  #", "## #", "# ##", "#  #", "#  #"]),
        ('E', ["####", "#   ", "### ", "#   ", "####"]),
        ('L', ["#   ", "#   ", "#   ", "#   ", "####"]),
        ('K', ["#  #", "# # ", "##  ", "# # ", "#  #"]),
        (' ', ["    ", "    ", "    ", "    ", "    "]),
        ('?', ["### ", "   #", " ## ", "    ", " #  "]),
    ])
});

/// Rows produced by [`render`].
pub const fn height() -> usize {
    FONT_HEIGHT + SHADOW_OFFSET
}

/// Render `text` as double-width blocks with a drop shadow.
pub fn render(text: &str) -> Vec<String> {
    let content: Vec<char> = text.chars().map(|c| c.to_ascii_uppercase()).collect();
    if content.is_empty() {
        return vec![String::new(); height()];
    }

    let glyph_width = FONT_WIDTH * 2;
    let total_width = content.len() * (glyph_width + SPACING) + SHADOW_OFFSET * 2;
    let mut canvas = vec![vec![' '; total_width]; height()];

    for (index, ch) in content.iter().enumerate() {
        let Some(glyph) = GLYPHS.get(ch).or_else(|| GLYPHS.get(&'?')) else {
            continue;
        };
        paint_glyph(&mut canvas, glyph, index * (glyph_width + SPACING));
    }

    canvas
        .into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_string())
        .collect()
}

fn paint_glyph(canvas: &mut [Vec<char>], glyph: &Glyph, x_offset: usize) {
    for (row, line) in glyph.iter().enumerate() {
        for (col, symbol) in line.chars().enumerate() {
            if symbol != '#' {
                continue;
            }
            let x = x_offset + col * 2;
            for dx in 0..2 {
                place(canvas, row + SHADOW_OFFSET, x + dx + SHADOW_OFFSET * 2, SHADOW_CHAR);
                place(canvas, row, x + dx, FILL_CHAR);
            }
        }
    }
}

fn place(canvas: &mut [Vec<char>], y: usize, x: usize, ch: char) {
    let Some(cell) = canvas.get_mut(y).and_then(|row| row.get_mut(x)) else {
        return;
    };
    if *cell == ' ' || (*cell == SHADOW_CHAR && ch == FILL_CHAR) {
        *cell = ch;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_render_at_fixed_height() {
        let rows = render("30");
        assert_eq!(rows.len(), height());
        assert!(rows[0].starts_with("████████"));
        assert!(rows.iter().any(|row| row.contains(SHADOW_CHAR)));
    }

    #[test]
    fn unknown_characters_fall_back() {
        assert_eq!(render("%"), render("?"));
        assert!(render("").iter().all(String::is_empty));
    }
}
