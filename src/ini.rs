//! Minimal INI reader for tool and vendor descriptors.
//!
//! Supports `[section]` headers, `key = value` pairs, and full-line `;` or
//! `#` comments. Values wrapped in matching single or double quotes are
//! unquoted. Keys that appear before any header land in the root section.
//! A key repeated within one section keeps its last value.

use std::collections::BTreeMap;

pub type Section = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    pub root: Section,
    pub sections: BTreeMap<String, Section>,
}

impl IniDocument {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }
}

/// Parse `text`. Lines that are neither headers, comments nor `key = value`
/// pairs are treated as keys with an empty value.
pub fn parse(text: &str) -> IniDocument {
    let mut doc = IniDocument::default();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let name = name.trim().to_string();
            doc.sections.entry(name.clone()).or_default();
            current = Some(name);
            continue;
        }

        let (key, value) = match line.split_once('=') {
            Some((k, v)) => (k.trim(), unquote(strip_inline_comment(v.trim()))),
            None => (line, ""),
        };
        if key.is_empty() {
            continue;
        }

        let target = match &current {
            Some(name) => doc.sections.entry(name.clone()).or_default(),
            None => &mut doc.root,
        };
        target.insert(key.to_string(), value.to_string());
    }

    doc
}

/// Cut an unquoted ` ;...` or ` #...` tail off a value.
fn strip_inline_comment(value: &str) -> &str {
    let mut quote: Option<char> = None;
    let mut prev_space = false;
    for (i, c) in value.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if i == 0 && (c == '"' || c == '\'') => quote = Some(c),
            None if (c == ';' || c == '#') && prev_space => return value[..i].trim_end(),
            None => {}
        }
        prev_space = c.is_whitespace();
    }
    value
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}
