use std::io::{self, Write};

/// Number of bits printed per pair of trace lines.
pub(crate) const CHUNK_WIDTH: usize = 50;

/// (upper, lower) box drawing glyphs for the edge between two bits.
#[inline(always)]
pub(crate) fn edge_glyph(current: bool, next: bool) -> (&'static str, &'static str) {
    match (current, next) {
        // Staying low
        (false, false) => (" ", "\u{2500}"),
        // Low to high
        (false, true) => ("\u{250C}", "\u{2518}"),
        // High to low
        (true, false) => ("\u{2510}", "\u{2514}"),
        // Staying high
        (true, true) => ("\u{2500}", " "),
    }
}

/// Upper and lower trace lines, one glyph per bit.
pub(crate) fn waveform_lines(bits: &[bool]) -> (String, String) {
    let mut upper = String::new();
    let mut lower = String::new();
    for (i, &bit) in bits.iter().enumerate() {
        // The signal holds its last value past the end of the trace.
        let next = bits.get(i + 1).copied().unwrap_or(bit);
        let (u, l) = edge_glyph(bit, next);
        upper.push_str(u);
        lower.push_str(l);
    }
    (upper, lower)
}

/// Writes the trace as two lines of box drawing characters, `CHUNK_WIDTH`
/// columns at a time with an empty line after each chunk.
pub(crate) fn render_waveform<W: Write>(bits: &[bool], out: &mut W) -> io::Result<()> {
    let (upper, lower) = waveform_lines(bits);
    let upper: Vec<char> = upper.chars().collect();
    let lower: Vec<char> = lower.chars().collect();

    for (u, l) in upper.chunks(CHUNK_WIDTH).zip(lower.chunks(CHUNK_WIDTH)) {
        let upper: String = u.iter().collect();
        let lower: String = l.iter().collect();

        writeln!(out, "{:<width$}", upper, width = CHUNK_WIDTH)?;
        writeln!(out, "{:<width$}", lower, width = CHUNK_WIDTH)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(bits: &[bool]) -> String {
        let mut out = Vec::new();
        render_waveform(bits, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn glyph_table() {
        assert_eq!(edge_glyph(false, false), (" ", "─"));
        assert_eq!(edge_glyph(false, true), ("┌", "┘"));
        assert_eq!(edge_glyph(true, false), ("┐", "└"));
        assert_eq!(edge_glyph(true, true), ("─", " "));
    }

    #[test]
    fn last_bit_holds() {
        let (upper, lower) = waveform_lines(&[false, true, true, false]);
        assert_eq!(upper, "┌─┐ ");
        assert_eq!(lower, "┘ └─");

        let (upper, lower) = waveform_lines(&[true]);
        assert_eq!(upper, "─");
        assert_eq!(lower, " ");
    }

    #[test]
    fn chunks_of_fifty() {
        let bits: Vec<bool> = (0..120).map(|i| i % 3 == 0).collect();
        let text = render(&bits);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 9);
        for chunk in lines.chunks(3) {
            assert_eq!(chunk[0].chars().count(), CHUNK_WIDTH);
            assert_eq!(chunk[1].chars().count(), CHUNK_WIDTH);
            assert_eq!(chunk[2], "");
        }

        // 20 bits in the last chunk, padded out with spaces
        let (upper, _) = waveform_lines(&bits);
        let tail: String = upper.chars().skip(100).collect();
        assert_eq!(lines[6], format!("{:<50}", tail));
        assert!(lines[6].ends_with(&" ".repeat(30)));
    }

    #[test]
    fn exactly_one_chunk() {
        let bits: Vec<bool> = (0..CHUNK_WIDTH).map(|i| i % 2 == 0).collect();
        let text = render(&bits);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].chars().count(), CHUNK_WIDTH);
        assert_eq!(lines[1].chars().count(), CHUNK_WIDTH);
        assert_eq!(lines[2], "");
        // last bit is low and holds
        assert!(lines[0].ends_with("┐ "));
        assert!(lines[1].ends_with("└─"));
    }

    #[test]
    fn one_bit_spills_into_second_chunk() {
        let mut bits = vec![false; CHUNK_WIDTH];
        bits.push(true);
        let text = render(&bits);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 6);
        assert!(lines[0].ends_with("┌"));
        assert!(lines[1].ends_with("┘"));
        assert_eq!(lines[3], format!("{:<50}", "─"));
        assert_eq!(lines[4], " ".repeat(50));
        assert_eq!(lines[5], "");
    }

    #[test]
    fn empty_trace_renders_nothing() {
        assert_eq!(render(&[]), "");
    }
}
