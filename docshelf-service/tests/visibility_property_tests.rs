//! Property-Based Tests for Access Control Through the Service
//!
//! For any set of documents and any viewer, a detail fetch succeeds exactly
//! when the document is visible to the viewer, and a list of an owner's
//! documents contains exactly the visible ones. Cached responses never
//! widen what a viewer can see.

use std::collections::BTreeSet;

use docshelf_core::{is_visible, DocshelfError, Document, Identity};
use docshelf_service::ListRequest;
use docshelf_storage::DocumentStore;
use docshelf_test_utils::generators::{draft_strategy, identity_strategy};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use test_support::Harness;

const POPULATION: [&str; 4] = ["alice", "bob", "carol", "dave"];

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn prop_detail_fetch_matches_policy(
        uploads in proptest::collection::vec((identity_strategy(), draft_strategy()), 1..6),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let h = Harness::new();
            let tokens: Vec<_> = POPULATION
                .iter()
                .map(|name| (Identity::new(*name), h.login(name)))
                .collect();
            let token_of = |who: &Identity| {
                tokens
                    .iter()
                    .find(|(id, _)| id == who)
                    .map(|(_, t)| *t)
                    .unwrap()
            };

            let mut docs: Vec<Document> = Vec::new();
            for (owner, draft) in uploads {
                let id = h.service.create(&token_of(&owner), draft, None).await.unwrap();
                docs.push(h.documents.inner().get(id).await.unwrap());
            }

            // Twice, so the second round is served from the cache.
            for _ in 0..2 {
                for (viewer, token) in &tokens {
                    for doc in &docs {
                        let result = h.service.fetch_detail(token, doc.id, false).await;
                        if is_visible(doc, viewer) {
                            prop_assert!(result.is_ok());
                        } else {
                            prop_assert_eq!(result.unwrap_err(), DocshelfError::Forbidden);
                        }
                    }
                }
            }
            Ok::<(), TestCaseError>(())
        })?;
    }

    #[test]
    fn prop_list_contains_exactly_visible_documents(
        uploads in proptest::collection::vec((identity_strategy(), draft_strategy()), 1..8),
        viewer in identity_strategy(),
        owner in identity_strategy(),
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let h = Harness::new();
            let mut expected = BTreeSet::new();
            for (uploader, draft) in uploads {
                let token = h.login(uploader.as_str());
                let id = h.service.create(&token, draft, None).await.unwrap();
                let doc = h.documents.inner().get(id).await.unwrap();
                if doc.owner == owner && is_visible(&doc, &viewer) {
                    expected.insert(id);
                }
            }

            let token = h.login(viewer.as_str());
            let listed = h
                .service
                .fetch_list(&token, ListRequest::owned_by(owner.clone()))
                .await
                .unwrap()
                .views()
                .unwrap();
            let listed: BTreeSet<_> = listed.into_iter().map(|v| v.id).collect();
            prop_assert_eq!(listed, expected);
            Ok::<(), TestCaseError>(())
        })?;
    }
}
