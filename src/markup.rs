//! Classpath markup fragments.
//! Turns descriptor records into `<classpathentry>` elements for the
//! generated `.classpath` file.

use crate::descriptor::ClasspathEntry;
use quick_xml::escape::escape;
use std::fmt;
use std::path::Path;

/// Fixed glob of compilable sources inside a source classpath entry.
pub const JAVA_SOURCES: &str = "**/*.java";

/// A minimal XML element: tag, attributes in insertion order and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<Element>,
}

impl Element {
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self { tag: tag.into(), attributes: Vec::new(), children: Vec::new() }
    }

    /// Sets an attribute, replacing any previous value under the same name.
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((key, value)),
        }
        self
    }

    /// Appends a child element and returns it for further building.
    pub fn sub_element<S: Into<String>>(&mut self, tag: S) -> &mut Element {
        self.children.push(Element::new(tag));
        let last = self.children.len() - 1;
        &mut self.children[last]
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Element] {
        &self.children
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag)?;
        for (key, value) in &self.attributes {
            write!(f, " {}=\"{}\"", key, escape(value.as_str()))?;
        }
        if self.children.is_empty() {
            return write!(f, "/>");
        }
        write!(f, ">")?;
        for child in &self.children {
            write!(f, "{child}")?;
        }
        write!(f, "</{}>", self.tag)
    }
}

/// Turns a classpath entry into an element like
/// `<classpathentry kind="src" including="**/*.java" path="src" excluding="A.java|B.java"/>`.
///
/// Exclude patterns are sorted so the output does not depend on input order.
pub fn classpath_entry_element(entry: &ClasspathEntry) -> Element {
    let mut e = Element::new("classpathentry");
    e.set("kind", "src").set("including", JAVA_SOURCES).set("path", entry.path());
    if !entry.exclude_patterns.is_empty() {
        let mut patterns: Vec<&str> = entry.exclude_patterns.iter().map(String::as_str).collect();
        patterns.sort_unstable();
        e.set("excluding", patterns.join("|"));
    }
    if entry.ignore_warnings {
        e.sub_element("attributes")
            .sub_element("attribute")
            .set("name", "ignore_optional_problems")
            .set("value", "true");
    }
    e
}

/// Turns a referenced project name into an element like
/// `<classpathentry kind="src" combineaccessrules="false" path="/Fennec"/>`.
pub fn referenced_project_element(name: &str) -> Element {
    let mut e = Element::new("classpathentry");
    // All projects share one root, so the reference is absolute in the IDE namespace.
    e.set("kind", "src").set("combineaccessrules", "false").set("path", format!("/{name}"));
    e
}

/// Turns an extra library archive into an element like
/// `<classpathentry kind="lib" path="libs/robotium-solo-4.3.1.jar"/>`.
pub fn extra_jar_element(name: &str) -> Element {
    let mut e = Element::new("classpathentry");
    e.set("kind", "lib").set("path", format!("libs/{}", basename(name)));
    e
}

/// Last path component of a `/`-separated build path.
pub fn basename(path: &str) -> &str {
    Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or(path)
}
