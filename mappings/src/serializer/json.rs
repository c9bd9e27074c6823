//! JSON rendering of a mapping tree.
//!
//! Each class and member carries a `names` object keyed by namespace; unmapped
//! names are `null`.

use serde_json::{json, Map, Value};

use crate::model::{MappingTree, MemberKind};

/// Serializes a tree to a JSON `Value`.
///
/// The returned value can be pretty-printed with [`serde_json::to_string_pretty`].
#[must_use]
pub fn to_json(tree: &MappingTree) -> Value {
    let classes: Vec<Value> = tree
        .classes()
        .map(|(src, class)| {
            let mut fields = Vec::new();
            let mut methods = Vec::new();
            for (key, member) in &class.members {
                let node = json!({
                    "desc": key.desc,
                    "names": names(tree, &key.name, &member.dst_names),
                });
                match key.kind {
                    MemberKind::Field => fields.push(node),
                    MemberKind::Method => methods.push(node),
                }
            }
            json!({
                "names": names(tree, src, &class.dst_names),
                "fields": fields,
                "methods": methods,
            })
        })
        .collect();

    json!({
        "namespaces": tree.namespaces(),
        "classes": classes,
    })
}

fn names(tree: &MappingTree, src: &str, dst_names: &[Option<String>]) -> Value {
    let mut map = Map::new();
    map.insert(tree.src_namespace().to_owned(), json!(src));
    for (ns, name) in tree.dst_namespaces().iter().zip(dst_names) {
        map.insert(ns.clone(), json!(name));
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MemberKey, NAMED, OFFICIAL};

    #[test]
    fn renders_names_per_namespace() {
        let mut tree = MappingTree::new(OFFICIAL, [NAMED]).unwrap();
        tree.add_class("a", vec![Some("Foo".into())]);
        tree.add_member("a", MemberKey::field("b", "I"), vec![None]);

        let value = to_json(&tree);
        assert_eq!(value["namespaces"], json!([OFFICIAL, NAMED]));
        assert_eq!(value["classes"][0]["names"][NAMED], json!("Foo"));
        assert_eq!(value["classes"][0]["fields"][0]["names"][NAMED], Value::Null);
        assert_eq!(value["classes"][0]["fields"][0]["desc"], json!("I"));
    }
}
