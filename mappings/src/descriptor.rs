//! JVM descriptor helpers.
//!
//! ProGuard payloads spell types the Java way (`int[]`, `java.lang.String`);
//! trees store them as JVM descriptors (`[I`, `Ljava/lang/String;`) expressed
//! in the tree's source namespace.

/// Converts a dotted Java class name to its internal form (`a.b.C` → `a/b/C`).
#[must_use]
pub fn internal_name(java_name: &str) -> String {
    java_name.replace('.', "/")
}

/// Converts a Java source type (`int`, `a.b.C[]`, `void`) to a JVM descriptor.
///
/// # Errors
///
/// Returns a short reason when the type is empty or its array brackets are
/// unbalanced.
pub fn type_descriptor(java_type: &str) -> Result<String, &'static str> {
    let mut base = java_type.trim();
    let mut dims = 0usize;
    while let Some(stripped) = base.strip_suffix("[]") {
        base = stripped.trim_end();
        dims += 1;
    }
    if base.is_empty() {
        return Err("empty type");
    }
    if base.contains(['[', ']', ' ', '(', ')']) {
        return Err("invalid type");
    }

    let mut out = "[".repeat(dims);
    match base {
        "void" if dims == 0 => out.push('V'),
        "void" => return Err("array of void"),
        "boolean" => out.push('Z'),
        "byte" => out.push('B'),
        "char" => out.push('C'),
        "short" => out.push('S'),
        "int" => out.push('I'),
        "long" => out.push('J'),
        "float" => out.push('F'),
        "double" => out.push('D'),
        class => {
            out.push('L');
            out.push_str(&internal_name(class));
            out.push(';');
        }
    }
    Ok(out)
}

/// Builds a method descriptor from a Java return type and a comma-separated
/// parameter list.
///
/// # Errors
///
/// Returns a short reason when any of the types is malformed.
pub fn method_descriptor(return_type: &str, params: &str) -> Result<String, &'static str> {
    let mut out = String::from("(");
    let params = params.trim();
    if !params.is_empty() {
        for param in params.split(',') {
            out.push_str(&type_descriptor(param)?);
        }
    }
    out.push(')');
    out.push_str(&type_descriptor(return_type)?);
    Ok(out)
}

/// Rewrites every class reference (`L...;`) in a descriptor with `map`.
///
/// References `map` does not know (it returns `None`) are kept as they are,
/// which is the right thing for library classes such as `java/lang/String`.
pub fn remap_descriptor<'a, F>(desc: &str, map: F) -> String
where
    F: Fn(&str) -> Option<&'a str>,
{
    let mut out = String::with_capacity(desc.len());
    let mut rest = desc;
    while let Some(start) = rest.find('L') {
        out.push_str(&rest[..=start]);
        let after = &rest[start + 1..];
        match after.find(';') {
            Some(end) => {
                let class = &after[..end];
                out.push_str(map(class).unwrap_or(class));
                out.push(';');
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(after);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_and_array_types() {
        assert_eq!(type_descriptor("int").as_deref(), Ok("I"));
        assert_eq!(type_descriptor("long[][]").as_deref(), Ok("[[J"));
        assert_eq!(type_descriptor("void").as_deref(), Ok("V"));
        assert!(type_descriptor("void[]").is_err());
        assert!(type_descriptor("").is_err());
    }

    #[test]
    fn class_types_become_internal() {
        assert_eq!(
            type_descriptor("java.lang.String[]").as_deref(),
            Ok("[Ljava/lang/String;")
        );
    }

    #[test]
    fn method_descriptors() {
        assert_eq!(method_descriptor("void", "").as_deref(), Ok("()V"));
        assert_eq!(
            method_descriptor("net.minecraft.Foo", "int, java.lang.String").as_deref(),
            Ok("(ILjava/lang/String;)Lnet/minecraft/Foo;")
        );
    }

    #[test]
    fn remap_only_touches_known_classes() {
        let remapped = remap_descriptor("(La;Ljava/lang/Object;[Lb;)La;", |c| match c {
            "a" => Some("Foo"),
            "b" => Some("Bar"),
            _ => None,
        });
        assert_eq!(remapped, "(LFoo;Ljava/lang/Object;[LBar;)LFoo;");
    }
}
