//! Tiny v2 reader and writer.
//!
//! ```text
//! tiny	2	0	official	intermediary	named
//! c	a	net/minecraft/class_1	net/minecraft/Foo
//! 	f	I	b	field_2	count
//! 	m	(La;)V	c	method_3	touch
//! ```
//!
//! Empty name columns mean "unmapped". Parameter, local-variable and comment
//! lines are accepted and ignored.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use crate::error::{MappingError, Result};
use crate::model::{MappingTree, MemberKey, MemberKind};
use crate::visitor::MappingVisitor;

const ESCAPED_NAMES: &str = "escaped-names";

/// Parses a Tiny v2 document.
///
/// # Errors
///
/// Returns [`MappingError::MalformedTiny`] for a bad header or entry line and
/// [`MappingError::Io`] if the reader fails.
pub fn read<R: BufRead>(reader: R) -> Result<MappingTree> {
    let mut lines = reader.lines();
    let header = lines.next().transpose()?.unwrap_or_default();
    let columns: Vec<&str> = header.split('\t').collect();
    if columns.len() < 5 || columns[0] != "tiny" || columns[1] != "2" {
        return Err(malformed(1, "expected `tiny\\t2\\t<minor>\\t<namespaces>` header"));
    }
    let mut tree = MappingTree::new(columns[3], columns[4..].iter().copied())?;
    let width = columns.len() - 3;

    let mut escaped = false;
    let mut in_properties = true;
    let mut class: Option<String> = None;

    for (index, line) in lines.enumerate() {
        let line = line?;
        let number = index + 2;
        if line.is_empty() {
            continue;
        }
        let depth = line.bytes().take_while(|&b| b == b'\t').count();
        let fields: Vec<&str> = line[depth..].split('\t').collect();

        match (depth, fields[0]) {
            (1, _) if in_properties => {
                escaped |= fields[0] == ESCAPED_NAMES;
            }
            (0, "c") => {
                in_properties = false;
                let names = names(&fields[1..], width, escaped, number)?;
                let (src, dst) = split_src(names, number)?;
                tree.add_class(src.clone(), dst);
                class = Some(src);
            }
            (1, kind @ ("f" | "m")) => {
                let owner = class
                    .as_deref()
                    .ok_or_else(|| malformed(number, "member outside of a class"))?;
                let desc = fields
                    .get(1)
                    .filter(|d| !d.is_empty())
                    .ok_or_else(|| malformed(number, "member without descriptor"))?;
                let desc = if escaped { unescape(desc) } else { (*desc).to_owned() };
                let names = names(&fields[2..], width, escaped, number)?;
                let (src, dst) = split_src(names, number)?;
                let key = if kind == "f" {
                    MemberKey::field(src, desc)
                } else {
                    MemberKey::method(src, desc)
                };
                tree.add_member(owner, key, dst);
            }
            (1, "c") | (2.., _) => {}
            _ => return Err(malformed(number, "unexpected line")),
        }
    }
    Ok(tree)
}

fn malformed(line: usize, reason: &str) -> MappingError {
    MappingError::MalformedTiny {
        line,
        reason: reason.to_owned(),
    }
}

fn names(columns: &[&str], width: usize, escaped: bool, line: usize) -> Result<Vec<Option<String>>> {
    if columns.len() != width {
        return Err(malformed(line, "name count does not match the namespaces"));
    }
    Ok(columns
        .iter()
        .map(|n| match (n.is_empty(), escaped) {
            (true, _) => None,
            (false, true) => Some(unescape(n)),
            (false, false) => Some((*n).to_owned()),
        })
        .collect())
}

fn split_src(mut names: Vec<Option<String>>, line: usize) -> Result<(String, Vec<Option<String>>)> {
    let src = names
        .remove(0)
        .ok_or_else(|| malformed(line, "missing source name"))?;
    Ok((src, names))
}

fn unescape(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Visitor writing Tiny v2 to any [`Write`].
///
/// Created with [`new`](Self::new), the writer emits names verbatim and fails
/// with [`MappingError::UnescapedName`] on a name holding a tab, line break or
/// NUL. [`escaped`](Self::escaped) declares `escaped-names` and escapes them.
#[derive(Debug)]
pub struct TinyWriter<W: Write> {
    out: W,
    escape: bool,
}

impl<W: Write> TinyWriter<W> {
    /// Creates a writer over `out` that writes names verbatim.
    pub fn new(out: W) -> Self {
        Self { out, escape: false }
    }

    /// Creates a writer over `out` that escapes names.
    pub fn escaped(out: W) -> Self {
        Self { out, escape: true }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn encode<'n>(&self, name: &'n str) -> Result<Cow<'n, str>> {
        if !name.contains(['\\', '\t', '\n', '\r', '\0']) {
            return Ok(Cow::Borrowed(name));
        }
        if !self.escape {
            if name.contains(['\t', '\n', '\r', '\0']) {
                return Err(MappingError::UnescapedName(name.to_owned()));
            }
            return Ok(Cow::Borrowed(name));
        }
        Ok(Cow::Owned(escape(name)))
    }

    fn row(&mut self, prefix: &str, src: &str, dst_names: &[Option<String>]) -> Result<()> {
        let src = self.encode(src)?;
        let mut line = format!("{prefix}\t{src}");
        for name in dst_names {
            line.push('\t');
            if let Some(name) = name {
                line.push_str(&self.encode(name)?);
            }
        }
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn member_row(
        &mut self,
        kind: MemberKind,
        src: &str,
        desc: &str,
        dst_names: &[Option<String>],
    ) -> Result<()> {
        let prefix = format!("\t{}\t{}", kind.as_str(), self.encode(desc)?);
        self.row(&prefix, src, dst_names)
    }
}

fn escape(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out
}

impl<W: Write> MappingVisitor for TinyWriter<W> {
    fn visit_namespaces(&mut self, src: &str, dsts: &[String]) -> Result<()> {
        writeln!(self.out, "tiny\t2\t0\t{src}\t{}", dsts.join("\t"))?;
        if self.escape {
            writeln!(self.out, "\t{ESCAPED_NAMES}")?;
        }
        Ok(())
    }

    fn visit_class(&mut self, src: &str, dst_names: &[Option<String>]) -> Result<()> {
        self.row("c", src, dst_names)
    }

    fn visit_field(&mut self, src: &str, desc: &str, dst_names: &[Option<String>]) -> Result<()> {
        self.member_row(MemberKind::Field, src, desc, dst_names)
    }

    fn visit_method(
        &mut self,
        src: &str,
        desc: &str,
        dst_names: &[Option<String>],
    ) -> Result<()> {
        self.member_row(MemberKind::Method, src, desc, dst_names)
    }

    fn visit_end(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Renders a tree as a Tiny v2 string.
///
/// # Errors
///
/// Returns [`MappingError::UnescapedName`] for a name that needs escaping;
/// write such trees with [`TinyWriter::escaped`].
pub fn to_tiny(tree: &MappingTree) -> Result<String> {
    let mut writer = TinyWriter::new(Vec::new());
    tree.accept(&mut writer)?;
    String::from_utf8(writer.into_inner())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{INTERMEDIARY, OFFICIAL};

    const SAMPLE: &str = "tiny\t2\t0\tofficial\tintermediary\n\
                          c\ta\tnet/minecraft/class_001\n\
                          \tc\ta comment\n\
                          \tf\tI\tb\tfield_2\n\
                          \tm\t(La;)V\tc\tmethod_3\n\
                          \t\tp\t1\t\targ\n\
                          c\tq\t\n";

    #[test]
    fn reads_classes_and_members() {
        let tree = read(SAMPLE.as_bytes()).unwrap();
        assert_eq!(tree.namespaces(), [OFFICIAL, INTERMEDIARY]);
        assert_eq!(tree.class_name("a", INTERMEDIARY), Some("net/minecraft/class_001"));
        assert_eq!(tree.class("q").and_then(|c| c.dst_name(0)), None);
        assert_eq!(
            tree.member_name("a", &MemberKey::method("c", "(La;)V"), INTERMEDIARY),
            Some("method_3")
        );
        assert_eq!(tree.member_count(), 2);
    }

    #[test]
    fn writer_output_reads_back() {
        let tree = read(SAMPLE.as_bytes()).unwrap();
        let text = to_tiny(&tree).unwrap();
        assert!(text.starts_with("tiny\t2\t0\tofficial\tintermediary\n"));
        assert_eq!(read(text.as_bytes()).unwrap(), tree);
    }

    #[test]
    fn rejects_bad_header_and_width() {
        assert!(matches!(
            read("v1\tofficial\n".as_bytes()),
            Err(MappingError::MalformedTiny { line: 1, .. })
        ));
        assert!(matches!(
            read("tiny\t2\t0\tofficial\tintermediary\nc\ta\n".as_bytes()),
            Err(MappingError::MalformedTiny { line: 2, .. })
        ));
    }

    #[test]
    fn escaped_writer_round_trips_awkward_names() {
        let mut tree = MappingTree::new(OFFICIAL, ["named"]).unwrap();
        tree.add_class("a", vec![Some("Foo\tBar".to_owned())]);
        tree.add_member("a", MemberKey::field("b", "I"), vec![Some("line\nbreak\\x".to_owned())]);

        let mut writer = TinyWriter::escaped(Vec::new());
        tree.accept(&mut writer).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.starts_with("tiny\t2\t0\tofficial\tnamed\n\tescaped-names\n"));
        assert!(text.contains("c\ta\tFoo\\tBar\n"));
        assert_eq!(read(text.as_bytes()).unwrap(), tree);
    }

    #[test]
    fn plain_writer_refuses_names_needing_escapes() {
        let mut tree = MappingTree::new(OFFICIAL, ["named"]).unwrap();
        tree.add_class("a", vec![Some("Foo\tBar".to_owned())]);
        assert!(matches!(
            to_tiny(&tree),
            Err(MappingError::UnescapedName(name)) if name == "Foo\tBar"
        ));

        let mut plain = MappingTree::new(OFFICIAL, ["named"]).unwrap();
        plain.add_class("a", vec![Some("back\\slash".to_owned())]);
        assert_eq!(to_tiny(&plain).unwrap(), "tiny\t2\t0\tofficial\tnamed\nc\ta\tback\\slash\n");
    }

    #[test]
    fn unescapes_names_when_declared() {
        let doc = "tiny\t2\t0\tofficial\tnamed\n\tescaped-names\nc\ta\tFoo\\tBar\n";
        let tree = read(doc.as_bytes()).unwrap();
        assert_eq!(tree.class_name("a", "named"), Some("Foo\tBar"));
    }
}
