//! Form control collection.
//!
//! Mirrors the browser's "successful controls" rules closely enough for
//! product option forms: named, enabled controls; checkboxes and radios only
//! when checked; selects contribute their selected options. File uploads are
//! not modelled and never contribute.

use url::form_urlencoded;

use crate::{Document, NodeId};

/// Ordered name/value pairs collected from a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<(String, String)>,
}

impl FormData {
    /// Create an empty form data set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the successful controls of `form`.
    pub fn from_form(doc: &Document, form: NodeId) -> Self {
        successful_controls(doc, form).into_iter().collect()
    }

    /// Append a pair.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values for `name`.
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// All pairs in order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Iterate over pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no pair was collected.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode as `application/x-www-form-urlencoded`.
    pub fn to_urlencoded(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in &self.entries {
            serializer.append_pair(name, value);
        }
        serializer.finish()
    }
}

impl FromIterator<(String, String)> for FormData {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for FormData {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Serialize a form the way `$(form).serialize()` does.
pub fn serialize_form(doc: &Document, form: NodeId) -> String {
    FormData::from_form(doc, form).to_urlencoded()
}

/// Whether the control is a file upload input.
pub fn is_file_input(doc: &Document, id: NodeId) -> bool {
    doc.tag(id) == Some("input") && input_type(doc, id) == "file"
}

fn input_type(doc: &Document, id: NodeId) -> String {
    doc.attr(id, "type")
        .unwrap_or("text")
        .to_ascii_lowercase()
}

fn successful_controls(doc: &Document, form: NodeId) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    for id in doc.descendants(form) {
        let Some(name) = doc.attr(id, "name").filter(|n| !n.is_empty()) else {
            continue;
        };
        if doc.is_disabled(id) {
            continue;
        }

        match doc.tag(id) {
            Some("input") => match input_type(doc, id).as_str() {
                "file" | "submit" | "button" | "reset" | "image" => {}
                "checkbox" | "radio" => {
                    if doc.has_attr(id, "checked") {
                        let value = doc.value(id).unwrap_or("on");
                        pairs.push((name.to_string(), value.to_string()));
                    }
                }
                _ => {
                    let value = doc.value(id).unwrap_or("");
                    pairs.push((name.to_string(), value.to_string()));
                }
            },
            Some("select") => {
                for value in selected_values(doc, id) {
                    pairs.push((name.to_string(), value));
                }
            }
            Some("textarea") => pairs.push((name.to_string(), doc.text(id))),
            _ => {}
        }
    }

    pairs
}

fn selected_values(doc: &Document, select: NodeId) -> Vec<String> {
    let options: Vec<NodeId> = doc
        .descendants(select)
        .into_iter()
        .filter(|id| doc.tag(*id) == Some("option"))
        .collect();

    let option_value = |id: NodeId| {
        doc.value(id)
            .map(str::to_string)
            .unwrap_or_else(|| doc.text(id).trim().to_string())
    };

    let selected: Vec<NodeId> = options
        .iter()
        .copied()
        .filter(|id| doc.has_attr(*id, "selected"))
        .collect();

    if doc.has_attr(select, "multiple") {
        return selected
            .into_iter()
            .filter(|id| !doc.is_disabled(*id))
            .map(option_value)
            .collect();
    }

    // A single select with nothing marked falls back to its first option.
    let chosen = selected.last().copied().or_else(|| options.first().copied());
    chosen
        .filter(|id| !doc.is_disabled(*id))
        .map(option_value)
        .into_iter()
        .collect()
}
