//! Discovery of a struct's bindable fields.
//!
//! `#[derive(Bind)]` generates a [`Bind::visit`] that reports each leaf field
//! to the [`Introspector`] and hands nested groups back to it. Groups are
//! queued and visited after the current struct, so descriptors come out
//! breadth-first across nesting levels and in declaration order within each
//! level.

use std::collections::VecDeque;

use crate::{
    field::{Descriptor, FieldSpec},
    value::FieldValue,
};

/// A struct whose fields can be bound from configuration sources
pub trait Bind {
    /// Report this struct's fields to `walker`, with `prefix` prepended to every key
    fn visit<'a>(&'a mut self, prefix: &str, walker: &mut Introspector<'a>);
}

/// Worklist driving one introspection pass
pub struct Introspector<'a> {
    queue: VecDeque<(&'a mut dyn Bind, String)>,
    descriptors: Vec<Descriptor<'a>>,
}

impl<'a> Introspector<'a> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            descriptors: Vec::new(),
        }
    }

    /// Register a leaf field
    pub fn leaf<T: FieldValue + 'a>(&mut self, prefix: &str, spec: FieldSpec, target: &'a mut T) {
        self.descriptors.push(Descriptor::new(spec, prefix, T::kind(), target));
    }

    /// Queue a nested group, extending the current prefix with `sub_prefix`
    pub fn group<G: Bind + 'a>(&mut self, prefix: &str, sub_prefix: &str, target: &'a mut G) {
        let target: &'a mut dyn Bind = target;
        self.queue.push_back((target, format!("{prefix}{sub_prefix}")));
    }
}

/// Build the descriptor list for `root` and everything nested inside it
pub fn introspect<T: Bind>(root: &mut T) -> Vec<Descriptor<'_>> {
    let root: &mut dyn Bind = root;
    let mut walker = Introspector::new();
    walker.queue.push_back((root, String::new()));

    while let Some((node, prefix)) = walker.queue.pop_front() {
        node.visit(&prefix, &mut walker);
    }

    walker.descriptors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    // Hand-written equivalents of what #[derive(Bind)] expands to.

    #[derive(Default)]
    struct Database {
        port: u16,
        hosts: Vec<String>,
    }

    impl Bind for Database {
        fn visit<'a>(&'a mut self, prefix: &str, walker: &mut Introspector<'a>) {
            let Self { port, hosts } = self;
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "port",
                    env: Some("PORT"),
                    ..FieldSpec::default()
                },
                port,
            );
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "hosts",
                    env: Some("HOSTS,HOST_LIST"),
                    separator: Some(";"),
                    ..FieldSpec::default()
                },
                hosts,
            );
        }
    }

    #[derive(Default)]
    struct Replica {
        db: Database,
    }

    impl Bind for Replica {
        fn visit<'a>(&'a mut self, prefix: &str, walker: &mut Introspector<'a>) {
            walker.group(prefix, "INNER_", &mut self.db);
        }
    }

    #[derive(Default)]
    struct Root {
        name: String,
        primary: Database,
        started: DateTime<Utc>,
        replica: Replica,
        debug: bool,
    }

    impl Bind for Root {
        fn visit<'a>(&'a mut self, prefix: &str, walker: &mut Introspector<'a>) {
            let Self {
                name,
                primary,
                started,
                replica,
                debug,
            } = self;
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "name",
                    env: Some("NAME"),
                    ..FieldSpec::default()
                },
                name,
            );
            walker.group(prefix, "DB_", primary);
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "started",
                    env: Some("STARTED"),
                    layout: Some("%Y-%m-%d"),
                    ..FieldSpec::default()
                },
                started,
            );
            walker.group(prefix, "REPLICA_", replica);
            walker.leaf(
                prefix,
                FieldSpec {
                    name: "debug",
                    ..FieldSpec::default()
                },
                debug,
            );
        }
    }

    #[test]
    fn test_breadth_first_order() {
        let mut root = Root::default();
        let fields: Vec<_> = introspect(&mut root).iter().map(|d| d.field).collect();

        assert_eq!(
            fields,
            vec!["name", "started", "debug", "port", "hosts", "port", "hosts"]
        );
    }

    #[test]
    fn test_prefixes_accumulate() {
        let mut root = Root::default();
        let descriptors = introspect(&mut root);

        assert_eq!(descriptors[0].keys, vec!["NAME"]);
        assert_eq!(descriptors[3].keys, vec!["DB_PORT"]);
        assert_eq!(descriptors[4].keys, vec!["DB_HOSTS", "DB_HOST_LIST"]);
        assert_eq!(descriptors[5].keys, vec!["REPLICA_INNER_PORT"]);
        assert!(descriptors[2].keys.is_empty());
    }

    #[test]
    fn test_timestamp_is_a_leaf_with_layout() {
        let mut root = Root::default();
        let descriptors = introspect(&mut root);

        let started = &descriptors[1];
        assert_eq!(started.field, "started");
        assert_eq!(started.layout, Some("%Y-%m-%d"));
        assert_eq!(started.kind, crate::Kind::Timestamp);
    }

    #[test]
    fn test_descriptors_write_into_nested_fields() {
        let mut root = Root::default();
        {
            let mut descriptors = introspect(&mut root);
            descriptors[4].apply("a;b").unwrap();
            descriptors[5].apply("5432").unwrap();
        }
        assert_eq!(root.primary.hosts, vec!["a", "b"]);
        assert_eq!(root.replica.db.port, 5432);
        assert_eq!(root.primary.port, 0);
    }

    #[test]
    fn test_introspection_does_not_mutate() {
        let mut db = Database {
            port: 7,
            hosts: vec!["x".to_string()],
        };
        let count = introspect(&mut db).len();

        assert_eq!(count, 2);
        assert_eq!(db.port, 7);
        assert_eq!(db.hosts, vec!["x"]);
    }
}
