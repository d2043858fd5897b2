//! End-to-end tests for the replication orchestrator

use std::cell::RefCell;
use std::rc::Rc;

use autopost_core::{HookEvent, Replicator, ReplicationReport, SaveEvent, SkipReason};
use autopost_host::{
    DocId, DocumentStatus, EntityKind, MemoryNetwork, MemoryRegistry, RelationRegistry,
    SiteContext, SiteId,
};
use autopost_meta::{FieldCategory, IGNORE_MARKER, PolicyTable, SYNCED_MARKER};
use autopost_test_utils::{DocBuilder, TestNetwork};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn replicator(policy: &str) -> Replicator {
    Replicator::new(PolicyTable::parse(policy).unwrap())
}

/// Fire a save event for the document as currently stored
fn save(
    replicator: &mut Replicator,
    net: &mut MemoryNetwork,
    registry: &mut MemoryRegistry,
    site: u64,
    id: u64,
) -> ReplicationReport {
    let document = net.document(SiteId(site), DocId(id)).unwrap().clone();
    replicator.on_document_saved(net, Some(registry), &SaveEvent::new(SiteId(site), document))
}

fn counterpart(registry: &MemoryRegistry, site: u64, id: u64, target: u64) -> Option<DocId> {
    registry
        .links(SiteId(site), DocId(id), EntityKind::Post)
        .unwrap()
        .get(SiteId(target))
}

mod guard_sequence {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unconfigured_type_touches_nothing() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .document(1, DocBuilder::page(10).title("About").build())
            .build();
        let mut replicator = replicator("[types.post]\n");

        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(
            report.skipped,
            Some(SkipReason::UnconfiguredType("page".to_string()))
        );
        assert!(net.documents(SiteId(2)).is_empty());
        assert!(net.documents(SiteId(3)).is_empty());
        assert_eq!(registry.writes(), 0);
        let source = net.document(SiteId(1), DocId(10)).unwrap();
        assert!(!source.meta.contains_key(SYNCED_MARKER));
    }

    #[rstest]
    #[case::draft(DocBuilder::post(10).status(DocumentStatus::Draft), "status")]
    #[case::trash(DocBuilder::post(10).status(DocumentStatus::Trash), "status")]
    #[case::auto_draft(DocBuilder::post(10).status(DocumentStatus::AutoDraft), "status")]
    #[case::revision(DocBuilder::post(10).revision(), "revision")]
    #[case::ignored(DocBuilder::post(10).meta(IGNORE_MARKER, json!(1)), "ignored")]
    fn test_skipped_saves(#[case] source: DocBuilder, #[case] reason: &str) {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, source.build())
            .build();
        let mut replicator = replicator("[types.post]\n");

        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        let skipped = serde_json::to_value(report.skipped.unwrap()).unwrap();
        assert_eq!(skipped["reason"], reason);
        assert!(net.documents(SiteId(2)).is_empty());
    }

    #[test]
    fn test_pending_and_private_are_replicated() {
        for status in [DocumentStatus::Pending, DocumentStatus::Private] {
            let (mut net, mut registry) = TestNetwork::with_sites(2)
                .document(1, DocBuilder::post(10).status(status).build())
                .build();
            let mut replicator = replicator("[types.post]\n");

            let report = save(&mut replicator, &mut net, &mut registry, 1, 10);
            assert_eq!(report.created(), 1, "status {}", status);
        }
    }

    #[test]
    fn test_engaged_guard_suppresses_dispatch() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).build())
            .build();
        let mut replicator = replicator("[types.post]\n");
        let guard = replicator.guard();

        let _token = guard.engage();
        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(report.skipped, Some(SkipReason::Reentrant));
        assert!(net.documents(SiteId(2)).is_empty());
    }
}

mod creation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_one_creation_and_one_registration_per_missing_site() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .document(
                1,
                DocBuilder::post(10)
                    .title("Launch")
                    .content("Body")
                    .slug("launch")
                    .build(),
            )
            .build();
        let mut replicator = replicator("[types.post]\npost_status = \"pending\"\n");

        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert!(report.success(), "errors: {:?}", report.errors());
        assert_eq!(report.created(), 2);
        assert_eq!(registry.writes(), 2);
        for site in [2, 3] {
            let docs = net.documents(SiteId(site));
            assert_eq!(docs.len(), 1);
            let copy = docs[0];
            assert_eq!(copy.title, "Launch");
            assert_eq!(copy.content, "Body");
            assert_eq!(copy.name, "launch");
            assert_eq!(copy.status, DocumentStatus::Pending);
            assert!(copy.meta.contains_key(SYNCED_MARKER));
            assert_eq!(counterpart(&registry, 1, 10, site), Some(copy.id));
        }
        let source = net.document(SiteId(1), DocId(10)).unwrap();
        assert_eq!(source.meta[SYNCED_MARKER], json!(1));
    }

    #[test]
    fn test_resave_creates_nothing_new() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .document(1, DocBuilder::post(10).title("Launch").build())
            .build();
        let mut replicator = replicator("[types.post]\n");

        save(&mut replicator, &mut net, &mut registry, 1, 10);
        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(report.created(), 0);
        assert_eq!(registry.writes(), 2);
        assert_eq!(net.documents(SiteId(2)).len(), 1);
        assert_eq!(net.documents(SiteId(3)).len(), 1);
    }

    #[test]
    fn test_only_missing_sites_get_a_copy() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .document(1, DocBuilder::post(10).title("Launch").build())
            .document(2, DocBuilder::post(20).title("Start").build())
            .link(EntityKind::Post, &[(1, 10), (2, 20)])
            .build();
        let mut replicator = replicator("[types.post]\n");

        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(report.created(), 1);
        assert!(report.site(SiteId(3)).unwrap().created);
        assert_eq!(net.documents(SiteId(2)).len(), 1);
        assert_eq!(net.document(SiteId(2), DocId(20)).unwrap().title, "Start");
    }

    #[test]
    fn test_without_registry_nothing_is_created() {
        let (mut net, _) = TestNetwork::with_sites(3)
            .document(1, DocBuilder::post(10).build())
            .build();
        let mut replicator = replicator("[types.post]\n");
        let document = net.document(SiteId(1), DocId(10)).unwrap().clone();

        let report =
            replicator.on_document_saved(&mut net, None, &SaveEvent::new(SiteId(1), document));

        assert_eq!(report.skipped, Some(SkipReason::RegistryUnavailable));
        assert!(net.documents(SiteId(2)).is_empty());
        assert!(net.documents(SiteId(3)).is_empty());
    }
}

mod categories {
    use super::*;
    use pretty_assertions::assert_eq;

    const THUMBNAIL_POLICY: &str = "[types.post]\npost_thumbnail = true\n";

    #[test]
    fn test_thumbnail_follows_attachment_links() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).thumbnail(50).build())
            .document(1, DocBuilder::attachment(50, None).build())
            .document(1, DocBuilder::attachment(51, None).build())
            .document(2, DocBuilder::attachment(60, None).build())
            .link(EntityKind::Post, &[(1, 50), (2, 60)])
            .build();
        let mut replicator = replicator(THUMBNAIL_POLICY);

        save(&mut replicator, &mut net, &mut registry, 1, 10);
        let copy_id = counterpart(&registry, 1, 10, 2).unwrap();
        assert_eq!(
            net.document(SiteId(2), copy_id).unwrap().thumbnail(),
            Some(DocId(60))
        );

        // Switch to an attachment with no counterpart: the copy loses its
        // thumbnail rather than pointing at a foreign id.
        net.document_mut(SiteId(1), DocId(10))
            .unwrap()
            .meta
            .insert("_thumbnail_id".to_string(), json!(51));
        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);
        assert_eq!(report.created(), 0);
        let copy = net.document(SiteId(2), copy_id).unwrap();
        assert!(!copy.meta.contains_key("_thumbnail_id"));
    }

    #[rstest]
    #[case::initial_only("[types.post]\n", "Start")]
    #[case::permanent("[types.post.permanent]\npost_title = true\n", "Launch v2")]
    fn test_title_of_existing_copy(#[case] policy: &str, #[case] expected: &str) {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).title("Launch v2").build())
            .document(2, DocBuilder::post(20).title("Start").build())
            .link(EntityKind::Post, &[(1, 10), (2, 20)])
            .build();
        let mut replicator = replicator(policy);

        save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(net.document(SiteId(2), DocId(20)).unwrap().title, expected);
    }

    #[test]
    fn test_body_fills_only_empty_existing_copy() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .document(1, DocBuilder::post(10).content("Source body").build())
            .document(2, DocBuilder::post(20).content("").build())
            .document(3, DocBuilder::post(30).content("Übersetzt").build())
            .link(EntityKind::Post, &[(1, 10), (2, 20), (3, 30)])
            .build();
        let mut replicator = replicator("[types.post]\n");

        save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(net.document(SiteId(2), DocId(20)).unwrap().content, "Source body");
        assert_eq!(net.document(SiteId(3), DocId(30)).unwrap().content, "Übersetzt");
    }

    #[test]
    fn test_attachment_parent_first_assignment_wins() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).build())
            .document(1, DocBuilder::post(11).build())
            .document(1, DocBuilder::attachment(50, Some(10)).build())
            .document(2, DocBuilder::post(20).build())
            .document(2, DocBuilder::post(21).build())
            .document(2, DocBuilder::attachment(60, None).build())
            .link(EntityKind::Post, &[(1, 10), (2, 20)])
            .link(EntityKind::Post, &[(1, 11), (2, 21)])
            .link(EntityKind::Post, &[(1, 50), (2, 60)])
            .build();
        let mut replicator = replicator("[types.post]\n");

        save(&mut replicator, &mut net, &mut registry, 1, 10);
        assert_eq!(net.document(SiteId(2), DocId(60)).unwrap().parent, Some(DocId(20)));

        // The file moves to another source post; its copy stays where it
        // was first attached.
        net.document_mut(SiteId(1), DocId(50)).unwrap().parent = Some(DocId(11));
        save(&mut replicator, &mut net, &mut registry, 1, 11);
        assert_eq!(net.document(SiteId(2), DocId(60)).unwrap().parent, Some(DocId(20)));
    }

    #[test]
    fn test_deleted_permanent_meta_is_deleted_on_copy() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).meta("price", json!("9.99")).build())
            .build();
        let mut replicator = replicator("[types.post.permanent]\nmeta = [\"price\"]\n");

        save(&mut replicator, &mut net, &mut registry, 1, 10);
        let copy_id = counterpart(&registry, 1, 10, 2).unwrap();
        assert_eq!(net.document(SiteId(2), copy_id).unwrap().meta["price"], json!("9.99"));

        net.document_mut(SiteId(1), DocId(10)).unwrap().meta.remove("price");
        save(&mut replicator, &mut net, &mut registry, 1, 10);
        assert!(!net.document(SiteId(2), copy_id).unwrap().meta.contains_key("price"));
    }

    #[test]
    fn test_initial_meta_is_not_resynchronized() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).meta("subtitle", json!("One")).build())
            .build();
        let mut replicator = replicator("[types.post]\nmeta = [\"subtitle\"]\n");

        save(&mut replicator, &mut net, &mut registry, 1, 10);
        net.document_mut(SiteId(1), DocId(10))
            .unwrap()
            .meta
            .insert("subtitle".to_string(), json!("Two"));
        save(&mut replicator, &mut net, &mut registry, 1, 10);

        let copy_id = counterpart(&registry, 1, 10, 2).unwrap();
        assert_eq!(net.document(SiteId(2), copy_id).unwrap().meta["subtitle"], json!("One"));
    }

    #[test]
    fn test_relational_list_keeps_resolved_elements() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).meta("related", json!([31, 32, 33, 34])).build())
            .link(EntityKind::Post, &[(1, 31), (2, 41)])
            .link(EntityKind::Post, &[(1, 33), (2, 43)])
            .build();
        let mut replicator = replicator("[types.post]\nrelational_meta = [\"related\"]\n");

        save(&mut replicator, &mut net, &mut registry, 1, 10);

        let copy_id = counterpart(&registry, 1, 10, 2).unwrap();
        assert_eq!(
            net.document(SiteId(2), copy_id).unwrap().meta["related"],
            json!([41, 43])
        );
    }

    #[test]
    fn test_taxonomies_on_new_copy() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .taxonomy("category", "post")
            .document(1, DocBuilder::post(10).terms("category", &[3, 4]).build())
            .link(EntityKind::Term, &[(1, 3), (2, 30)])
            .link(EntityKind::Term, &[(1, 4), (2, 40)])
            .build();
        let mut replicator = replicator("[types.post]\ntaxonomies = true\n");

        save(&mut replicator, &mut net, &mut registry, 1, 10);

        let copy_id = counterpart(&registry, 1, 10, 2).unwrap();
        assert_eq!(
            net.document(SiteId(2), copy_id).unwrap().terms["category"],
            vec![DocId(30), DocId(40)]
        );
    }

    #[test]
    fn test_stale_link_fails_site_but_not_network() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .document(1, DocBuilder::post(10).meta("price", json!(5)).build())
            .link(EntityKind::Post, &[(1, 10), (2, 99)])
            .build();
        let mut replicator =
            replicator("[types.post.permanent]\npost_title = true\nmeta = [\"price\"]\n");

        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        let stale = report.site(SiteId(2)).unwrap();
        assert!(stale.category(FieldCategory::Title).unwrap().error.is_some());
        assert!(stale.category(FieldCategory::Meta).unwrap().error.is_some());
        assert!(!report.success());
        let fresh = report.site(SiteId(3)).unwrap();
        assert!(fresh.created);
        assert!(fresh.applied(FieldCategory::Meta));
    }
}

mod context {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_host_is_back_on_source_site() {
        let (mut net, mut registry) = TestNetwork::with_sites(4)
            .document(1, DocBuilder::post(10).thumbnail(50).meta("a", json!(1)).build())
            .build();
        let mut replicator = replicator(
            "[types.post]\npost_thumbnail = true\ntaxonomies = true\nmeta = [\"a\"]\n",
        );

        save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(net.current_site(), SiteId(1));
        assert_eq!(net.context_depth(), 0);
    }

    #[test]
    fn test_outer_context_is_restored() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .current(3)
            .document(1, DocBuilder::post(10).build())
            .build();
        let mut replicator = replicator("[types.post]\n");

        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(report.created(), 2);
        assert_eq!(net.current_site(), SiteId(3));
        assert_eq!(net.context_depth(), 0);
    }

    #[test]
    fn test_unknown_source_site_is_skipped() {
        let (mut net, mut registry) = TestNetwork::with_sites(2).build();
        let mut replicator = replicator("[types.post]\n");

        let report = replicator.on_document_saved(
            &mut net,
            Some(&mut registry),
            &SaveEvent::new(SiteId(9), DocBuilder::post(10).build()),
        );

        assert!(matches!(report.skipped, Some(SkipReason::SiteUnavailable(_))));
        assert_eq!(net.context_depth(), 0);
    }

    #[test]
    fn test_every_engine_write_is_marked() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .document(1, DocBuilder::post(10).content("Body").build())
            .build();
        let mut replicator = replicator("[types.post.permanent]\npost_title = true\n");

        let guard = replicator.guard();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        net.on_save(Box::new(move |notice| {
            sink.borrow_mut().push((notice.site, guard.is_engaged()));
        }));

        save(&mut replicator, &mut net, &mut registry, 1, 10);
        save(&mut replicator, &mut net, &mut registry, 1, 10);

        let seen = seen.borrow();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|(site, engaged)| *site != SiteId(1) && *engaged));
        assert!(!replicator.guard().is_engaged());
    }
}

mod hooks {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(replicator: &mut Replicator, events: &Rc<RefCell<Vec<String>>>) {
        for name in HookEvent::all_names() {
            let event = HookEvent::parse(name).unwrap();
            let events = Rc::clone(events);
            replicator.hooks_mut().on(event, move |args| {
                events
                    .borrow_mut()
                    .push(format!("{}@{}", event, args.target_site));
            });
        }
    }

    #[test]
    fn test_hooks_follow_category_order() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).content("Body").meta("a", json!("x")).build())
            .build();
        let mut replicator = replicator("[types.post]\nmeta = [\"a\"]\n");
        let events = Rc::new(RefCell::new(Vec::new()));
        record(&mut replicator, &events);

        save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert_eq!(
            *events.borrow(),
            vec![
                "document-created@2",
                "title-copied@2",
                "content-copied@2",
                "attachments-copied@2",
                "meta-copied@2",
            ]
        );
    }

    #[test]
    fn test_missing_integration_fires_no_hook() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).field("hero", json!("x")).build())
            .link(EntityKind::Post, &[(1, 10), (2, 20)])
            .document(2, DocBuilder::post(20).content("Text").build())
            .build();
        let mut replicator = replicator("[types.post.permanent]\nextended_fields = [\"hero\"]\n");
        let events = Rc::new(RefCell::new(Vec::new()));
        record(&mut replicator, &events);

        let report = save(&mut replicator, &mut net, &mut registry, 1, 10);

        assert!(!events.borrow().iter().any(|e| e.starts_with("extended-fields")));
        let site = report.site(SiteId(2)).unwrap();
        assert!(!site.applied(FieldCategory::ExtendedFields));
    }
}

mod fields_event {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fields_event_copies_permanent_fields_to_linked_sites() {
        let (mut net, mut registry) = TestNetwork::with_sites(3)
            .extended_fields()
            .document(
                1,
                DocBuilder::post(10)
                    .field("hero", json!({"layout": "wide"}))
                    .field("intro", json!("Hi"))
                    .build(),
            )
            .document(2, DocBuilder::post(20).build())
            .link(EntityKind::Post, &[(1, 10), (2, 20)])
            .build();
        let mut replicator = replicator(
            "[types.post]\nextended_fields = [\"intro\"]\n[types.post.permanent]\nextended_fields = [\"hero\"]\n",
        );
        let document = net.document(SiteId(1), DocId(10)).unwrap().clone();

        let report = replicator.on_fields_saved(
            &mut net,
            Some(&mut registry),
            &SaveEvent::new(SiteId(1), document),
        );

        let copy = net.document(SiteId(2), DocId(20)).unwrap();
        assert_eq!(copy.fields["hero"], json!({"layout": "wide"}));
        assert!(!copy.fields.contains_key("intro"));
        assert!(report.site(SiteId(3)).unwrap().skipped.is_some());
        assert!(net.documents(SiteId(3)).is_empty());
        assert_eq!(registry.writes(), 0);
    }

    #[test]
    fn test_fields_event_without_extension_is_skipped() {
        let (mut net, mut registry) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).build())
            .build();
        let mut replicator = replicator("[types.post.permanent]\nextended_fields = [\"hero\"]\n");
        let document = net.document(SiteId(1), DocId(10)).unwrap().clone();

        let report = replicator.on_fields_saved(
            &mut net,
            Some(&mut registry),
            &SaveEvent::new(SiteId(1), document),
        );

        assert_eq!(report.skipped, Some(SkipReason::NoExtendedFields));
    }
}

mod registry_failures {
    use super::*;
    use pretty_assertions::assert_eq;
    use autopost_host::LinkSet;

    /// Memory registry with switchable failures
    #[derive(Default)]
    struct Flaky {
        inner: MemoryRegistry,
        failing_lookup: Option<DocId>,
        reject_links: bool,
    }

    impl RelationRegistry for Flaky {
        fn links(
            &self,
            source_site: SiteId,
            id: DocId,
            kind: EntityKind,
        ) -> autopost_host::Result<LinkSet> {
            if kind == EntityKind::Post && self.failing_lookup == Some(id) {
                return Err(autopost_host::Error::Registry {
                    message: "timeout".to_string(),
                });
            }
            self.inner.links(source_site, id, kind)
        }

        fn set_link(
            &mut self,
            source_site: SiteId,
            target_site: SiteId,
            source_id: DocId,
            target_id: DocId,
            kind: EntityKind,
        ) -> autopost_host::Result<()> {
            if self.reject_links {
                return Err(autopost_host::Error::Registry {
                    message: "read-only".to_string(),
                });
            }
            self.inner
                .set_link(source_site, target_site, source_id, target_id, kind)
        }
    }

    fn dispatch(
        replicator: &mut Replicator,
        net: &mut MemoryNetwork,
        registry: &mut Flaky,
    ) -> ReplicationReport {
        let document = net.document(SiteId(1), DocId(10)).unwrap().clone();
        replicator.on_document_saved(net, Some(registry), &SaveEvent::new(SiteId(1), document))
    }

    #[test]
    fn test_failed_own_lookup_creates_no_duplicate() {
        let (mut net, inner) = TestNetwork::with_sites(3)
            .document(1, DocBuilder::post(10).title("Launch").build())
            .document(2, DocBuilder::post(20).title("Start").build())
            .link(EntityKind::Post, &[(1, 10), (2, 20)])
            .build();
        let mut registry = Flaky {
            inner,
            failing_lookup: Some(DocId(10)),
            ..Default::default()
        };
        let mut replicator = replicator("[types.post]\n");

        let report = dispatch(&mut replicator, &mut net, &mut registry);

        assert!(matches!(
            report.skipped,
            Some(SkipReason::LinkLookupFailed(ref message)) if message.contains("timeout")
        ));
        assert!(!report.success());
        assert_eq!(report.created(), 0);
        assert_eq!(net.documents(SiteId(2)).len(), 1);
        assert!(net.documents(SiteId(3)).is_empty());
        assert_eq!(registry.inner.writes(), 0);
        assert_eq!(counterpart(&registry.inner, 1, 10, 2), Some(DocId(20)));
    }

    #[test]
    fn test_failed_counterpart_lookup_only_clears_the_field() {
        let (mut net, inner) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).thumbnail(50).build())
            .document(1, DocBuilder::attachment(50, None).build())
            .document(2, DocBuilder::post(20).thumbnail(60).build())
            .document(2, DocBuilder::attachment(60, None).build())
            .link(EntityKind::Post, &[(1, 10), (2, 20)])
            .link(EntityKind::Post, &[(1, 50), (2, 60)])
            .build();
        let mut registry = Flaky {
            inner,
            failing_lookup: Some(DocId(50)),
            ..Default::default()
        };
        let mut replicator = replicator("[types.post]\npost_thumbnail = true\n");

        let report = dispatch(&mut replicator, &mut net, &mut registry);

        assert_eq!(report.skipped, None);
        assert_eq!(report.created(), 0);
        assert_eq!(net.document(SiteId(2), DocId(20)).unwrap().thumbnail(), None);
    }

    #[test]
    fn test_unlinked_copy_is_an_error() {
        let (mut net, inner) = TestNetwork::with_sites(2)
            .document(1, DocBuilder::post(10).content("Body").build())
            .build();
        let mut registry = Flaky {
            inner,
            reject_links: true,
            ..Default::default()
        };
        let mut replicator = replicator("[types.post]\n");

        let report = dispatch(&mut replicator, &mut net, &mut registry);

        assert_eq!(report.created(), 1);
        assert!(!report.success());
        let site = report.site(SiteId(2)).unwrap();
        assert_eq!(site.error.as_deref(), Some("copy created but not linked"));
        assert!(site.applied(FieldCategory::Content));
        assert_eq!(report.errors(), vec!["site 2: copy created but not linked"]);
    }
}
