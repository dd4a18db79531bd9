//! Tab expansion and indentation of emitted lines

/// Replace tabs with spaces up to the next multiple of `tab_stop`
///
/// Columns count characters already emitted, so a leading marker such as a
/// list bullet keeps its width and the text after its tab lands on the stop:
/// `"-\tx"` with a stop of 4 becomes `"-   x"`. A tab always produces at least
/// one space.
pub fn expand_tabs(line: &str, tab_stop: usize) -> String {
    if tab_stop == 0 || !line.contains('\t') {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + tab_stop);
    let mut column = 0;

    for c in line.chars() {
        if c == '\t' {
            let pad = tab_stop - column % tab_stop;
            out.extend(std::iter::repeat_n(' ', pad));
            column += pad;
        } else {
            out.push(c);
            column += 1;
        }
    }

    out
}

/// Prefix non-blank lines with `width` spaces
pub fn indent(line: String, width: usize) -> String {
    if width == 0 || line.trim().is_empty() {
        return line;
    }
    format!("{}{line}", " ".repeat(width))
}
