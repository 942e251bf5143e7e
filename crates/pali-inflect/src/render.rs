use std::collections::HashSet;

use pali_types::{Headword, PatternTemplate, TableKind};

use crate::paradigm::{Cell, Paradigm};

/// Heading sentence describing the paradigm a headword follows.
pub fn render_heading(headword: &Headword, template: &PatternTemplate) -> String {
    let mut html = String::from("<p class='heading'>");
    html.push_str(&format!(
        "<b>{}</b> is <b>{}</b> ",
        superscript_homonym(&headword.label),
        headword.pattern
    ));
    let kind = TableKind::for_pos(&headword.pos);
    if kind != TableKind::Unclassified {
        html.push_str(&format!("{kind} "));
    }
    if template.is_irregular() {
        html.push_str("(irregular)");
    } else {
        html.push_str(&format!("(like <b>{}</b>)", template.like));
    }
    html.push_str("</p>");
    html
}

/// Render a homonym number as superscript: `buddha 1.2` becomes `buddha¹·²`.
pub fn superscript_homonym(label: &str) -> String {
    let Some((base, number)) = label.rsplit_once(' ') else {
        return label.to_string();
    };
    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return label.to_string();
    }
    let mut out = String::with_capacity(label.len() + number.len() * 2);
    out.push_str(base);
    out.extend(number.chars().map(superscript_char));
    out
}

fn superscript_char(c: char) -> char {
    match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        _ => '·',
    }
}

/// Accumulates table markup and the ordered, distinct inflection list.
pub(crate) struct TableWriter<'a, F> {
    stem: &'a str,
    is_attested: F,
    html: String,
    inflections: Vec<String>,
    seen: HashSet<String>,
}

impl<'a, F> TableWriter<'a, F>
where
    F: Fn(&str) -> bool,
{
    pub(crate) fn new(stem: &'a str, clean_form: &str, is_attested: F) -> Self {
        let mut writer = Self {
            stem,
            is_attested,
            html: String::new(),
            inflections: Vec::new(),
            seen: HashSet::new(),
        };
        writer.push_unique(clean_form.to_string());
        writer
    }

    pub(crate) fn write_table(&mut self, paradigm: &Paradigm) {
        self.html.push_str("<table class='inflection'>");

        if paradigm.has_header {
            self.html.push_str("<tr><th></th>");
            for header in &paradigm.headers {
                self.html.push_str(&format!("<th>{header}</th>"));
            }
            self.html.push_str("</tr>");
        }

        for row in &paradigm.rows {
            self.html.push_str(&format!("<tr><th>{}</th>", row.label));
            for cell in &row.cells {
                self.write_cell(cell);
            }
            self.html.push_str("</tr>");
        }

        self.html.push_str("</table>");
    }

    /// Homonymous endings share one cell, separated by line breaks.
    fn write_cell(&mut self, cell: &Cell) {
        let mut words = Vec::with_capacity(cell.endings.len());
        for ending in &cell.endings {
            if ending.is_empty() {
                words.push(String::new());
                continue;
            }
            let surface = format!("{}{}", self.stem, ending);
            let word = if (self.is_attested)(&surface) {
                format!("{}<b>{}</b>", self.stem, ending)
            } else {
                format!("<span class='gray'>{}<b>{}</b></span>", self.stem, ending)
            };
            words.push(word);
            self.push_unique(surface);
        }
        self.html.push_str(&format!(
            "<td title='{}'>{}</td>",
            cell.title,
            words.join("<br>")
        ));
    }

    fn push_unique(&mut self, form: String) {
        if self.seen.insert(form.clone()) {
            self.inflections.push(form);
        }
    }

    pub(crate) fn finish(self) -> (String, Vec<String>) {
        (self.html, self.inflections)
    }
}
