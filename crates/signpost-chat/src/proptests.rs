//! Property-based tests for navigation sessions and transitions.

use std::collections::HashSet;
use std::sync::Arc;

use proptest::prelude::*;

use signpost_core::types::UserContext;
use signpost_graph::{Answer, ConversationDocument, GraphModel, LinkSpec, NodeSpec};
use signpost_search::{IndexOptions, Morphology, SearchIndex};

use crate::event::Event;
use crate::session::NavigationSession;
use crate::transition::{transition, Outcome, TransitionContext};

// ============================================================================
// Test Helpers
// ============================================================================

const ROOT: &str = "/start";
const NAMES: &[&str] = &["Health", "Masks", "Travel", "Borders", "Offices"];

/// Every node links to every other node, so any selection sequence is a
/// valid walk and loops are everywhere.
fn graph() -> GraphModel {
    let all: Vec<&str> = std::iter::once(ROOT).chain(NAMES.iter().copied()).collect();
    let nodes = all
        .iter()
        .map(|name| NodeSpec {
            name: name.to_string(),
            answers: vec![Answer::Text(format!("About {}", name))],
            links: all
                .iter()
                .filter(|other| *other != name)
                .map(|other| LinkSpec::Name(other.to_string()))
                .collect(),
            ..Default::default()
        })
        .collect();
    GraphModel::build(&ConversationDocument { nodes }, ROOT).unwrap()
}

fn index(graph: &GraphModel) -> SearchIndex {
    let morphology = Arc::new(Morphology::for_languages(&["en"]).unwrap());
    SearchIndex::build(graph, morphology, IndexOptions::default())
}

fn stack_is_valid(session: &NavigationSession) -> bool {
    let unique: HashSet<&String> = session.nav_stack.iter().collect();
    session.nav_stack.first().map(String::as_str) == Some(ROOT)
        && session.nav_stack.last() == Some(&session.current_node)
        && unique.len() == session.nav_stack.len()
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    prop::sample::select(NAMES).prop_map(|name| name.to_string())
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_name().prop_map(Event::SelectNode),
        2 => Just(Event::Back),
        1 => Just(Event::Reset),
        1 => "[a-z ]{0,20}".prop_map(Event::FreeText),
        1 => Just(Event::EnterFeedback),
        1 => "[a-z ]{1,20}".prop_map(Event::AppendFeedback),
        1 => any::<bool>().prop_map(|anonymous| Event::SubmitFeedback { anonymous }),
    ]
}

// ============================================================================
// Session Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn prop_select_never_breaks_stack(names in proptest::collection::vec(arb_name(), 0..30)) {
        let mut session = NavigationSession::new(ROOT);
        for name in &names {
            session.select(name);
            prop_assert!(stack_is_valid(&session), "Invalid stack: {:?}", session.nav_stack);
        }
    }

    #[test]
    fn prop_back_undoes_fresh_select(
        path in proptest::collection::vec(arb_name(), 0..10),
        next in arb_name(),
    ) {
        let mut session = NavigationSession::new(ROOT);
        for name in &path {
            session.select(name);
        }
        prop_assume!(!session.nav_stack.contains(&next));

        let before = session.clone();
        session.select(&next);
        session.back();
        prop_assert_eq!(session, before);
    }

    #[test]
    fn prop_reselect_is_idempotent(path in proptest::collection::vec(arb_name(), 1..10)) {
        let mut session = NavigationSession::new(ROOT);
        for name in &path {
            session.select(name);
        }
        let top = session.current_node.clone();
        let before = session.clone();
        session.select(&top);
        prop_assert_eq!(session, before);
    }

    #[test]
    fn prop_revisit_truncates_to_first_visit(
        path in proptest::collection::vec(arb_name(), 1..10),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut session = NavigationSession::new(ROOT);
        for name in &path {
            session.select(name);
        }
        let pos = pick.index(session.nav_stack.len());
        let target = session.nav_stack[pos].clone();
        let expected: Vec<String> = session.nav_stack[..=pos].to_vec();

        session.select(&target);
        prop_assert_eq!(session.nav_stack, expected);
    }

    #[test]
    fn prop_back_never_empties_stack(pops in 0usize..20, path in proptest::collection::vec(arb_name(), 0..5)) {
        let mut session = NavigationSession::new(ROOT);
        for name in &path {
            session.select(name);
        }
        for _ in 0..pops {
            session.back();
        }
        prop_assert!(stack_is_valid(&session));
        prop_assert!(session.depth() >= 1);
    }
}

// ============================================================================
// Transition Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_transitions_preserve_stack(events in proptest::collection::vec(arb_event(), 0..30)) {
        let graph = graph();
        let index = index(&graph);
        let user = UserContext::anonymous(7);
        let ctx = TransitionContext {
            graph: &graph,
            index: &index,
            user: &user,
            shortlist_limit: 5,
        };

        let mut session = NavigationSession::new(ROOT);
        for event in events {
            let result = transition(&session, event, &ctx);
            session = result.session;
            prop_assert!(stack_is_valid(&session), "Invalid stack: {:?}", session.nav_stack);
            prop_assert!(
                !matches!(result.outcome, Outcome::DataRefreshed),
                "Valid graph reported as refreshed"
            );
        }
    }

    #[test]
    fn prop_reset_always_returns_to_root(events in proptest::collection::vec(arb_event(), 0..20)) {
        let graph = graph();
        let index = index(&graph);
        let user = UserContext::anonymous(7);
        let ctx = TransitionContext {
            graph: &graph,
            index: &index,
            user: &user,
            shortlist_limit: 5,
        };

        let mut session = NavigationSession::new(ROOT);
        for event in events {
            session = transition(&session, event, &ctx).session;
        }
        let result = transition(&session, Event::Reset, &ctx);
        prop_assert_eq!(result.session, NavigationSession::new(ROOT));
    }
}
