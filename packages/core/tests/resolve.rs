//! End-to-end resolution tests across descent, flattening, and extraction.
//!
//! | Test | Property |
//! |------|----------|
//! | `shallow_paths_never_flatten` | descent alone answers one-segment paths |
//! | `empty_path_returns_document_untouched` | `[]` is the whole document |
//! | `sequence_index_boundaries` | `0..N` ok, `N`/`-1` out of bounds, words malformed |
//! | `graph_selects_node_by_id` | graph-shaped documents index by `@id` |
//! | `id_reference_yields_full_node` | `{"@id": x}` dereferences to node `x` |
//! | `two_phase_walk_matches_single_pass` | descent + graph walk == one resolve call |
//! | `activity_streams_uses_plain_id` | remote contexts switch the id key |
//! | `duplicate_ids_resolve_to_first_node` | duplicate-id policy |
//! | `anonymous_node_never_takes_an_authored_blank_id` | generated ids stay distinct from written ones |
//! | `block_round_trip_through_registry` | codec, registry, and link resolution together |

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ldnode::descent::descend;
use ldnode::graph::walk;
use ldnode::{
    Block, Document, DecoderRegistry, ErrorKind, FlattenError, FlattenOptions, Flattener,
    JsonLdPlugin, NodeArena, NodeMapFlattener, Plugin, ResolveError, Resolver, ResolverConfig,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Counting {
    calls: AtomicUsize,
}

impl Flattener for Counting {
    fn flatten(
        &self,
        document: &Document,
        context: Option<&Document>,
        options: &FlattenOptions,
    ) -> Result<Document, FlattenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        NodeMapFlattener.flatten(document, context, options)
    }
}

fn counting_resolver() -> (Resolver, Arc<Counting>) {
    let counting = Arc::new(Counting::default());
    let resolver = Resolver::with_flattener(counting.clone(), ResolverConfig::default());
    (resolver, counting)
}

fn blog() -> Document {
    Document::from(json!({
        "@context": {"@vocab": "http://schema.org/"},
        "@graph": [
            {
                "@id": "post-1",
                "headline": "Flattening, explained",
                "author": {"@id": "ana"},
                "keywords": {"@set": ["json-ld", "graphs"]},
                "comment": [
                    {"text": {"@value": "Nice", "@index": "en"}, "author": {"@id": "ben"}},
                    {"text": "Thanks", "author": {"@id": "ana"}}
                ]
            },
            {"@id": "ana", "name": "Ana", "knows": {"@id": "ben"}},
            {"@id": "ben", "name": "Ben"}
        ]
    }))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn shallow_paths_never_flatten() {
    let (resolver, counting) = counting_resolver();
    let doc = blog();

    let r = resolver.resolve(&doc, &["ana"]).unwrap();
    assert_eq!(r.value.get("name"), Some(&Document::from("Ana")));

    let plain = Document::from(json!({"title": "T", "items": [1, 2]}));
    assert_eq!(resolver.resolve(&plain, &["title"]).unwrap().value, Document::from("T"));

    let seq = Document::from(json!([{"a": 1}, {"b": 2}]));
    assert_eq!(
        resolver.resolve(&seq, &["1"]).unwrap().value,
        Document::from(json!({"b": 2}))
    );
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);

    resolver.resolve(&doc, &["ana", "name"]).unwrap();
    assert_eq!(counting.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn empty_path_returns_document_untouched() {
    let (resolver, counting) = counting_resolver();
    let empty: [&str; 0] = [];
    for doc in [blog(), Document::Null, Document::from(json!([1, 2, 3]))] {
        let r = resolver.resolve(&doc, &empty).unwrap();
        assert_eq!(r.value, doc);
        assert!(r.is_complete());
    }
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn sequence_index_boundaries() {
    let resolver = Resolver::default();
    let doc = Document::from(json!({"list": ["a", "b", "c", "d"]}));
    let n = 4;

    for i in 0..n {
        let r = resolver.resolve(&doc, &["list".to_string(), i.to_string()]).unwrap();
        assert!(r.is_complete());
    }
    let top = Document::from(json!(["a", "b", "c", "d"]));
    for i in 0..n {
        assert!(resolver.resolve(&top, &[i.to_string()]).is_ok());
    }

    for (doc, prefix) in [(&doc, vec!["list"]), (&top, vec![])] {
        for (segment, kind) in [
            ("4", ErrorKind::OutOfBounds),
            ("-1", ErrorKind::OutOfBounds),
            ("second", ErrorKind::Malformed),
            ("1.5", ErrorKind::Malformed),
        ] {
            let mut path = prefix.clone();
            path.push(segment);
            let err = resolver.resolve(doc, &path[..]).unwrap_err();
            assert_eq!(err.kind(), kind, "segment {segment:?} under {prefix:?}");
        }
    }
}

#[test]
fn graph_selects_node_by_id() {
    let resolver = Resolver::default();
    let doc = blog();
    let r = resolver.resolve(&doc, &["post-1", "headline"]).unwrap();
    assert_eq!(r.value, Document::from("Flattening, explained"));

    let err = resolver.resolve(&doc, &["post-2", "headline"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(err, ResolveError::NodeNotFound { .. }));
}

#[test]
fn id_reference_yields_full_node() {
    let resolver = Resolver::default();
    let doc = blog();

    let r = resolver.resolve(&doc, &["post-1", "author"]).unwrap();
    assert_eq!(
        r.value,
        Document::from(json!({"@id": "ana", "name": "Ana", "knows": {"@id": "ben"}}))
    );

    let r = resolver
        .resolve(&doc, &["post-1", "author", "knows", "name"])
        .unwrap();
    assert_eq!(r.value, Document::from("Ben"));

    let r = resolver
        .resolve(&doc, &["post-1", "comment", "0", "text", "en"])
        .unwrap();
    assert_eq!(r.value, Document::from("Nice"));

    let r = resolver.resolve(&doc, &["post-1", "keywords", "1"]).unwrap();
    assert_eq!(r.value, Document::from("graphs"));
}

#[test]
fn two_phase_walk_matches_single_pass() {
    let resolver = Resolver::default();
    let doc = blog();
    let paths: &[&[&str]] = &[
        &["post-1", "author", "name"],
        &["post-1", "comment", "1", "author", "knows"],
        &["post-1", "comment", "0", "text"],
        &["ana", "knows", "name"],
    ];

    for &path in paths {
        let direct = resolver.resolve(&doc, path).unwrap();

        let descent = descend(&doc, path).unwrap();
        let flattened = resolver.flatten(&doc, descent.context).unwrap();
        let nodes = NodeArena::from_flattened(flattened, descent.id_key).unwrap();
        let (value, rest) = walk(
            &nodes,
            Cow::Borrowed(descent.value),
            descent.remaining,
            descent.id_key,
        )
        .unwrap();

        assert!(rest.is_empty(), "path {path:?}");
        assert_eq!(value.into_owned(), direct.value, "path {path:?}");
    }
}

#[test]
fn activity_streams_uses_plain_id() {
    let resolver = Resolver::default();
    let doc = Document::from(json!({
        "@context": "https://www.w3.org/ns/activitystreams",
        "@graph": [
            {
                "id": "https://social.example/activities/1",
                "type": "Create",
                "actor": {"id": "https://social.example/users/kim"},
                "object": {"type": "Note", "content": "hello"}
            },
            {"id": "https://social.example/users/kim", "type": "Person", "name": "Kim"}
        ]
    }));

    let r = resolver
        .resolve(&doc, &["https://social.example/activities/1", "actor", "name"])
        .unwrap();
    assert_eq!(r.value, Document::from("Kim"));

    let r = resolver
        .resolve(&doc, &["https://social.example/activities/1", "object", "content"])
        .unwrap();
    assert_eq!(r.value, Document::from("hello"));
}

#[test]
fn duplicate_ids_resolve_to_first_node() {
    struct Duplicated;
    impl Flattener for Duplicated {
        fn flatten(
            &self,
            _: &Document,
            _: Option<&Document>,
            _: &FlattenOptions,
        ) -> Result<Document, FlattenError> {
            Ok(Document::from(json!({"@graph": [
                {"@id": "x", "which": "first"},
                {"@id": "x", "which": "second"}
            ]})))
        }
    }

    let resolver = Resolver::with_flattener(Arc::new(Duplicated), ResolverConfig::default());
    let doc = Document::from(json!({"ref": {"holder": {"@id": "x"}}}));
    let r = resolver.resolve(&doc, &["ref", "holder", "which"]).unwrap();
    assert_eq!(r.value, Document::from("first"));
}

#[test]
fn anonymous_node_never_takes_an_authored_blank_id() {
    let resolver = Resolver::default();
    let doc = Document::from(json!({
        "@context": {},
        "@graph": [
            {"@id": "a", "anon": {"k": "anonymous"}, "ref": {"@id": "_:b0"}},
            {"@id": "_:b0", "name": "real"}
        ]
    }));

    let err = resolver.resolve(&doc, &["a", "ref", "k"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let r = resolver.resolve(&doc, &["a", "ref", "name"]).unwrap();
    assert_eq!(r.value, Document::from("real"));
    let r = resolver.resolve(&doc, &["a", "anon", "k"]).unwrap();
    assert_eq!(r.value, Document::from("anonymous"));
}

#[test]
fn block_round_trip_through_registry() {
    let mut registry = DecoderRegistry::new();
    JsonLdPlugin.register_block_decoders(&mut registry).unwrap();

    let chapter = Block::encode(&Document::from(json!({"title": "Chapter one"}))).unwrap();
    let book_json = json!({
        "@context": {"@vocab": "http://schema.org/"},
        "@graph": [
            {"@id": "book", "name": "Notes", "hasPart": [{"/": chapter.cid.to_string()}]}
        ]
    });
    let book = Block::new(
        ldnode::codec::cid_for_data(book_json.to_string().as_bytes()).unwrap(),
        book_json.to_string().into_bytes(),
    );

    let node = registry.decode(&book).unwrap();
    assert_eq!(node.links(), vec![chapter.cid]);

    let resolver = Resolver::new(ResolverConfig::default());
    let (cid, rest) = node
        .resolve_link(&resolver, &["book", "hasPart", "0", "title"])
        .unwrap();
    assert_eq!(cid, chapter.cid);
    assert_eq!(rest, ["title"]);

    let linked = registry.decode(&chapter).unwrap();
    let r = linked.resolve(&resolver, &rest[..]).unwrap();
    assert_eq!(r.value, Document::from("Chapter one"));

    let err = node.resolve_link(&resolver, &["book", "name"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotALink);
}
