//! ProGuard mapping reader.
//!
//! Reads the line-oriented format emitted by ProGuard and R8:
//!
//! ```text
//! # comment
//! net.minecraft.Foo -> a:
//!     int count -> b
//!     1:4:void tick(java.lang.String):120:123 -> c
//! ```
//!
//! The left-hand names bind to the source label, the right-hand names to the
//! destination label.

use std::io::BufRead;

use tracing::debug;

use crate::descriptor::{internal_name, method_descriptor, type_descriptor};
use crate::error::{MappingError, Result};
use crate::model::{MappingTree, MemberKey};

/// Parses a whole payload into a two-namespace tree `[source_label, dest_label]`.
///
/// # Errors
///
/// Returns [`MappingError::MalformedMappingLine`] on the first line that fits
/// no rule, [`MappingError::DuplicateNamespace`] if both labels are equal, and
/// [`MappingError::Io`] if the reader fails.
pub fn read<R: BufRead>(reader: R, source_label: &str, dest_label: &str) -> Result<MappingTree> {
    let mut tree = MappingTree::new(source_label, [dest_label])?;
    let mut current: Option<String> = None;
    let mut skipped = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if line.starts_with([' ', '\t']) {
            let Some(owner) = current.as_deref() else {
                return Err(malformed(number, &line, "member line outside of a class"));
            };
            match parse_member(trimmed).map_err(|reason| malformed(number, &line, reason))? {
                Some((key, dst)) => tree.add_member(owner, key, vec![Some(dst)]),
                None => skipped += 1,
            }
        } else {
            let (src, dst) =
                parse_class(trimmed).map_err(|reason| malformed(number, &line, reason))?;
            tree.add_class(src.clone(), vec![Some(dst)]);
            current = Some(src);
        }
    }

    debug!(
        classes = tree.class_count(),
        members = tree.member_count(),
        skipped,
        "read proguard mappings"
    );
    Ok(tree)
}

/// Parses a payload held in memory.
///
/// # Errors
///
/// See [`read`].
pub fn read_str(text: &str, source_label: &str, dest_label: &str) -> Result<MappingTree> {
    read(text.as_bytes(), source_label, dest_label)
}

fn malformed(line: usize, content: &str, reason: &str) -> MappingError {
    MappingError::MalformedMappingLine {
        line,
        content: content.to_owned(),
        reason: reason.to_owned(),
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && !name.contains(char::is_whitespace)
}

/// `a.b.Foo -> c:` → `("a/b/Foo", "c")`
fn parse_class(line: &str) -> std::result::Result<(String, String), &'static str> {
    let body = line
        .strip_suffix(':')
        .ok_or("class line must end with `:`")?;
    let (src, dst) = body
        .split_once("->")
        .ok_or("class line must contain `->`")?;
    let (src, dst) = (src.trim(), dst.trim());
    if !is_identifier(src) || !is_identifier(dst) {
        return Err("class line must rename one name to another");
    }
    Ok((internal_name(src), internal_name(dst)))
}

/// Returns `None` for inlined frames, whose member name is qualified with
/// another class and declares nothing here.
fn parse_member(line: &str) -> std::result::Result<Option<(MemberKey, String)>, &'static str> {
    let (decl, dst) = line
        .split_once("->")
        .ok_or("member line must contain `->`")?;
    let dst = dst.trim();
    if !is_identifier(dst) {
        return Err("member line must rename to a single name");
    }

    let decl = strip_line_range(decl.trim());
    let (ty, rest) = decl
        .split_once(' ')
        .ok_or("member line must declare a type and a name")?;
    let rest = rest.trim();

    let key = match rest.split_once('(') {
        Some((name, tail)) => {
            let (params, suffix) = tail.split_once(')').ok_or("unclosed parameter list")?;
            if !suffix.is_empty() && !is_line_suffix(suffix) {
                return Err("unexpected text after parameter list");
            }
            let name = name.trim();
            if !is_identifier(name) {
                return Err("missing method name");
            }
            if name.contains('.') {
                return Ok(None);
            }
            MemberKey::method(name, method_descriptor(ty, params)?)
        }
        None => {
            if !is_identifier(rest) || rest.contains(':') {
                return Err("missing field name");
            }
            if rest.contains('.') {
                return Ok(None);
            }
            MemberKey::field(rest, type_descriptor(ty)?)
        }
    };
    Ok(Some((key, dst.to_owned())))
}

/// Strips up to two leading `<number>:` prefixes.
fn strip_line_range(decl: &str) -> &str {
    let mut rest = decl;
    for _ in 0..2 {
        match rest.split_once(':') {
            Some((n, tail)) if !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()) => {
                rest = tail;
            }
            _ => break,
        }
    }
    rest
}

/// Matches `:<number>` or `:<number>:<number>` after a parameter list.
fn is_line_suffix(suffix: &str) -> bool {
    let Some(body) = suffix.strip_prefix(':') else {
        return false;
    };
    let parts: Vec<&str> = body.split(':').collect();
    parts.len() <= 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NAMED, OFFICIAL};

    const SAMPLE: &str = "\
# compiler: R8
net.minecraft.Foo -> a:
    int count -> b
    java.lang.String[] names -> c
    1:4:void tick(net.minecraft.Foo,long):120:123 -> d
    net.minecraft.Foo self() -> e
    5:5:void net.minecraft.Bar.inlined():7:7 -> d
net.minecraft.Bar -> b:
";

    #[test]
    fn parses_classes_fields_and_methods() {
        let tree = read_str(SAMPLE, NAMED, OFFICIAL).unwrap();
        assert_eq!(tree.namespaces(), [NAMED, OFFICIAL]);
        assert_eq!(tree.class_count(), 2);
        assert_eq!(tree.member_count(), 4);
        assert_eq!(tree.class_name("net/minecraft/Foo", OFFICIAL), Some("a"));

        let owner = "net/minecraft/Foo";
        assert_eq!(tree.member_name(owner, &MemberKey::field("count", "I"), OFFICIAL), Some("b"));
        assert_eq!(
            tree.member_name(owner, &MemberKey::field("names", "[Ljava/lang/String;"), OFFICIAL),
            Some("c")
        );
        assert_eq!(
            tree.member_name(
                owner,
                &MemberKey::method("tick", "(Lnet/minecraft/Foo;J)V"),
                OFFICIAL
            ),
            Some("d")
        );
        assert_eq!(
            tree.member_name(owner, &MemberKey::method("self", "()Lnet/minecraft/Foo;"), OFFICIAL),
            Some("e")
        );
    }

    #[test]
    fn orphan_member_line_is_rejected() {
        let err = read_str("    void bar() -> b\n", NAMED, OFFICIAL).unwrap_err();
        match err {
            MappingError::MalformedMappingLine { line, .. } => assert_eq!(line, 1),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn class_line_without_colon_is_rejected() {
        let err = read_str("Foo -> a\n", NAMED, OFFICIAL).unwrap_err();
        assert!(matches!(err, MappingError::MalformedMappingLine { line: 1, .. }));
    }

    #[test]
    fn garbage_member_line_reports_its_line_number() {
        let err = read_str("Foo -> a:\n    void bar() -> b\n    ???\n", NAMED, OFFICIAL)
            .unwrap_err();
        assert!(matches!(err, MappingError::MalformedMappingLine { line: 3, .. }));
    }
}
