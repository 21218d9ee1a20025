//! Construction and validation of a [`GraphModel`] from a document.
//!
//! Every top-level node is traversed depth-first. Inline branches are
//! entered immediately; name references are only recorded and checked once
//! all nodes are known, so cycles through references never recurse.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::document::{Answer, ConversationDocument, LinkSpec, NodeSpec};
use crate::error::LoadError;
use crate::model::{ConversationNode, GraphModel, Link};

impl GraphModel {
    /// Build and validate a graph rooted at `root`.
    ///
    /// Fails on the first duplicate name, dangling reference, node without
    /// answers, malformed answer, or missing root. Nothing is returned on
    /// failure, so a caller can never install a partially built graph.
    pub fn build(doc: &ConversationDocument, root: &str) -> Result<Self, LoadError> {
        let mut nodes: HashMap<String, ConversationNode> = HashMap::new();
        let mut order: Vec<String> = Vec::new();
        let mut visited: HashSet<String> = HashSet::new();

        for top in &doc.nodes {
            let mut stack: Vec<(&NodeSpec, Option<&str>)> = vec![(top, None)];
            while let Some((spec, parent)) = stack.pop() {
                if spec.name.trim().is_empty() {
                    return Err(LoadError::EmptyName {
                        parent: parent.map(str::to_string),
                    });
                }
                if !visited.insert(spec.name.clone()) {
                    return Err(LoadError::DuplicateName(spec.name.clone()));
                }
                validate_answers(spec)?;

                let node = ConversationNode {
                    name: spec.name.clone(),
                    alt_names: spec.alt_names.clone(),
                    keywords: spec.keywords.clone(),
                    answers: spec.answers.clone(),
                    links: spec
                        .links
                        .iter()
                        .map(|link| match link {
                            LinkSpec::Name(name) => Link::Reference(name.clone()),
                            LinkSpec::Branch(branch) => Link::Branch(branch.name.clone()),
                        })
                        .collect(),
                };
                order.push(node.name.clone());
                nodes.insert(node.name.clone(), node);

                for link in spec.links.iter().rev() {
                    if let LinkSpec::Branch(branch) = link {
                        stack.push((branch, Some(spec.name.as_str())));
                    }
                }
            }
        }

        for name in &order {
            let node = &nodes[name];
            for link in &node.links {
                if let Link::Reference(target) = link {
                    if !nodes.contains_key(target) {
                        return Err(LoadError::DanglingLink {
                            node: node.name.clone(),
                            target: target.clone(),
                        });
                    }
                }
            }
        }

        if !nodes.contains_key(root) {
            return Err(LoadError::MissingRoot(root.to_string()));
        }

        let aliases = build_aliases(&nodes, &order)?;
        let folded = build_folded(&nodes, &order);
        let choices = build_choices(&nodes);

        let graph = GraphModel {
            root: root.to_string(),
            nodes,
            order,
            aliases,
            folded,
            choices,
        };

        let reachable = graph.walk_from(root, |_| {});
        if reachable < graph.len() {
            let reached: HashSet<String> = graph.reachable_from(root).into_iter().collect();
            for name in graph.names().filter(|n| !reached.contains(*n)) {
                warn!(node = name, "Node is not reachable from the root");
            }
        }

        info!(
            nodes = graph.len(),
            reachable,
            root,
            "Conversation graph built"
        );
        Ok(graph)
    }
}

fn validate_answers(spec: &NodeSpec) -> Result<(), LoadError> {
    if spec.answers.is_empty() {
        return Err(LoadError::NoAnswers(spec.name.clone()));
    }

    let invalid = |reason: &str| LoadError::InvalidAnswer {
        node: spec.name.clone(),
        reason: reason.to_string(),
    };

    for answer in &spec.answers {
        match answer {
            Answer::Text(_) => {}
            Answer::LinkList(list) => {
                if list.heading.trim().is_empty() {
                    return Err(invalid("link list must have a heading"));
                }
                if list
                    .links
                    .iter()
                    .any(|l| l.label.trim().is_empty() || l.url.trim().is_empty())
                {
                    return Err(invalid("every link must have both a label and a url"));
                }
            }
            Answer::Venue(venue) => {
                if venue.lat == 0.0 || venue.lon == 0.0 {
                    return Err(invalid("venue lat and lon must both be set"));
                }
                if venue.title.trim().is_empty() || venue.address.trim().is_empty() {
                    return Err(invalid("venue must have a title and an address"));
                }
            }
            Answer::Photo(id) => {
                if id.trim().is_empty() {
                    return Err(invalid("photo reference must not be empty"));
                }
            }
        }
    }
    Ok(())
}

/// Alt-names share the namespace of node names.
fn build_aliases(
    nodes: &HashMap<String, ConversationNode>,
    order: &[String],
) -> Result<HashMap<String, String>, LoadError> {
    let mut aliases = HashMap::new();
    for name in order {
        for alt in &nodes[name].alt_names {
            if nodes.contains_key(alt) || aliases.contains_key(alt) {
                return Err(LoadError::DuplicateName(alt.clone()));
            }
            aliases.insert(alt.clone(), name.clone());
        }
    }
    Ok(aliases)
}

fn build_folded(nodes: &HashMap<String, ConversationNode>, order: &[String]) -> HashMap<String, String> {
    let mut folded: HashMap<String, String> = HashMap::new();
    for name in order {
        let node = &nodes[name];
        for key in std::iter::once(&node.name).chain(node.alt_names.iter()) {
            let lowered = key.trim().to_lowercase();
            if let Some(existing) = folded.get(&lowered) {
                if existing != name {
                    debug!(key = %lowered, kept = %existing, dropped = %name, "Case-insensitive key collision");
                }
                continue;
            }
            folded.insert(lowered, name.clone());
        }
    }
    folded
}

fn build_choices(nodes: &HashMap<String, ConversationNode>) -> HashMap<String, Vec<String>> {
    nodes
        .values()
        .filter(|node| !node.links.is_empty())
        .map(|node| {
            let labels = node.links.iter().map(|l| l.target().to_string()).collect();
            (node.name.clone(), labels)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::document::{LinkList, UrlLink, Venue};

    use super::*;

    fn node(name: &str, links: Vec<LinkSpec>) -> NodeSpec {
        NodeSpec {
            name: name.to_string(),
            answers: vec![Answer::Text(format!("About {}", name))],
            links,
            ..Default::default()
        }
    }

    fn reference(name: &str) -> LinkSpec {
        LinkSpec::Name(name.to_string())
    }

    fn branch(spec: NodeSpec) -> LinkSpec {
        LinkSpec::Branch(spec)
    }

    fn doc(nodes: Vec<NodeSpec>) -> ConversationDocument {
        ConversationDocument { nodes }
    }

    #[test]
    fn test_build_flattens_inline_branches() {
        let d = doc(vec![node(
            "/start",
            vec![
                branch(node("Housing", vec![branch(node("Rent", vec![]))])),
                reference("Rent"),
            ],
        )]);
        let graph = GraphModel::build(&d, "/start").unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(graph.names().collect::<Vec<_>>(), vec!["/start", "Housing", "Rent"]);
        assert_eq!(
            graph.node("/start").unwrap().links,
            vec![
                Link::Branch("Housing".to_string()),
                Link::Reference("Rent".to_string())
            ]
        );
    }

    #[test]
    fn test_choices_only_for_nodes_with_links() {
        let d = doc(vec![
            node("/start", vec![reference("A"), branch(node("B", vec![]))]),
            node("A", vec![]),
        ]);
        let graph = GraphModel::build(&d, "/start").unwrap();
        assert_eq!(
            graph.choices("/start").unwrap(),
            &["A".to_string(), "B".to_string()]
        );
        assert!(graph.choices("A").is_none());
        assert!(graph.choices("B").is_none());
    }

    #[test]
    fn test_duplicate_top_level_name_fails() {
        let d = doc(vec![node("/start", vec![]), node("/start", vec![])]);
        let err = GraphModel::build(&d, "/start").unwrap_err();
        assert!(matches!(err, LoadError::DuplicateName(ref n) if n == "/start"));
    }

    #[test]
    fn test_duplicate_branch_name_fails() {
        let d = doc(vec![
            node("/start", vec![branch(node("Masks", vec![]))]),
            node("Masks", vec![]),
        ]);
        let err = GraphModel::build(&d, "/start").unwrap_err();
        assert!(matches!(err, LoadError::DuplicateName(ref n) if n == "Masks"));
    }

    #[test]
    fn test_alt_name_colliding_with_name_fails() {
        let mut a = node("A", vec![]);
        a.alt_names = vec!["/start".to_string()];
        let d = doc(vec![node("/start", vec![reference("A")]), a]);
        let err = GraphModel::build(&d, "/start").unwrap_err();
        assert!(matches!(err, LoadError::DuplicateName(ref n) if n == "/start"));
    }

    #[test]
    fn test_dangling_reference_fails() {
        let d = doc(vec![node("/start", vec![reference("Visas")])]);
        let err = GraphModel::build(&d, "/start").unwrap_err();
        match err {
            LoadError::DanglingLink { node, target } => {
                assert_eq!(node, "/start");
                assert_eq!(target, "Visas");
            }
            other => panic!("expected DanglingLink, got {:?}", other),
        }
    }

    #[test]
    fn test_forward_reference_and_cycle_are_valid() {
        let d = doc(vec![
            node("/start", vec![reference("Later")]),
            node("Later", vec![reference("/start"), reference("Later")]),
        ]);
        let graph = GraphModel::build(&d, "/start").unwrap();
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_missing_root_fails() {
        let d = doc(vec![node("Home", vec![])]);
        let err = GraphModel::build(&d, "/start").unwrap_err();
        assert!(matches!(err, LoadError::MissingRoot(ref r) if r == "/start"));
    }

    #[test]
    fn test_empty_name_fails_with_parent() {
        let d = doc(vec![node("/start", vec![branch(node(" ", vec![]))])]);
        let err = GraphModel::build(&d, "/start").unwrap_err();
        assert!(matches!(err, LoadError::EmptyName { parent: Some(ref p) } if p == "/start"));
    }

    #[test]
    fn test_node_without_answers_fails() {
        let mut empty = node("Empty", vec![]);
        empty.answers.clear();
        let d = doc(vec![node("/start", vec![reference("Empty")]), empty]);
        let err = GraphModel::build(&d, "/start").unwrap_err();
        assert!(matches!(err, LoadError::NoAnswers(ref n) if n == "Empty"));
    }

    #[test]
    fn test_invalid_answers_fail() {
        let cases = vec![
            Answer::LinkList(LinkList {
                heading: String::new(),
                links: vec![],
            }),
            Answer::LinkList(LinkList {
                heading: "Links".to_string(),
                links: vec![UrlLink {
                    label: "SEM".to_string(),
                    url: String::new(),
                }],
            }),
            Answer::Venue(Venue {
                title: "Office".to_string(),
                address: "Somewhere 1".to_string(),
                lat: 0.0,
                lon: 8.5,
            }),
            Answer::Venue(Venue {
                title: String::new(),
                address: "Somewhere 1".to_string(),
                lat: 47.3,
                lon: 8.5,
            }),
            Answer::Photo(String::new()),
        ];

        for answer in cases {
            let mut bad = node("/start", vec![]);
            bad.answers = vec![answer.clone()];
            let err = GraphModel::build(&doc(vec![bad]), "/start").unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidAnswer { ref node, .. } if node == "/start"),
                "answer {:?} should be rejected",
                answer
            );
        }
    }

    #[test]
    fn test_unreachable_nodes_are_kept() {
        let d = doc(vec![node("/start", vec![]), node("Orphan", vec![])]);
        let graph = GraphModel::build(&d, "/start").unwrap();
        assert!(graph.contains("Orphan"));
        assert_eq!(graph.reachable_from("/start"), vec!["/start"]);
    }
}
