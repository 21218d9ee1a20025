//! Weighted inverted index from word tags to node names.
//!
//! Node identity fields (name and alt-names) weigh far more than content
//! fields, so a query naming a node always ranks that node first.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use signpost_core::config::SearchConfig;
use signpost_graph::{Answer, ConversationNode, GraphModel};
use tracing::{debug, info};

use crate::morphology::{Morphology, WordTag};
use crate::tokenize::Tokenizer;

/// Tuning for index construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub min_token_length: usize,
    pub identity_weight: u64,
    pub content_weight: u64,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::from(&SearchConfig::default())
    }
}

impl From<&SearchConfig> for IndexOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            min_token_length: config.min_token_length,
            identity_weight: config.identity_weight,
            content_weight: config.content_weight,
        }
    }
}

/// A ranked search result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub node: String,
    /// Accumulated weight multiplied by the number of distinct query words
    /// that matched the node.
    pub score: u64,
}

/// Search index derived from one [`GraphModel`].
#[derive(Debug)]
pub struct SearchIndex {
    postings: HashMap<WordTag, BTreeMap<String, u64>>,
    tokenizer: Tokenizer,
    morphology: Arc<Morphology>,
    options: IndexOptions,
}

impl SearchIndex {
    /// Index every node reachable from the graph's root, excluding the root.
    pub fn build(graph: &GraphModel, morphology: Arc<Morphology>, options: IndexOptions) -> Self {
        let mut index = Self {
            postings: HashMap::new(),
            tokenizer: Tokenizer::new(options.min_token_length),
            morphology,
            options,
        };

        let root = graph.root();
        let mut indexed = 0usize;
        graph.walk_from(root, |node| {
            if node.name != root {
                index.add_node(node);
                indexed += 1;
            }
        });

        info!(
            nodes = indexed,
            terms = index.postings.len(),
            languages = ?index.morphology.languages(),
            "Search index built"
        );
        index
    }

    fn add_node(&mut self, node: &ConversationNode) {
        let identity = self.options.identity_weight;
        let content = self.options.content_weight;

        self.add_text(&node.name, &node.name, identity);
        for alt in &node.alt_names {
            self.add_text(&node.name, alt, identity);
        }
        for keyword in &node.keywords {
            self.add_text(&node.name, keyword, content);
        }
        for answer in &node.answers {
            match answer {
                Answer::Text(text) => self.add_text(&node.name, text, content),
                Answer::LinkList(list) => {
                    self.add_text(&node.name, &list.heading, content);
                    for link in &list.links {
                        self.add_text(&node.name, &link.label, content);
                    }
                }
                Answer::Venue(_) | Answer::Photo(_) => {}
            }
        }
    }

    fn add_text(&mut self, node: &str, text: &str, weight: u64) {
        for token in self.tokenizer.tokens(text) {
            for tag in self.morphology.word_tags(&token) {
                *self
                    .postings
                    .entry(tag)
                    .or_default()
                    .entry(node.to_string())
                    .or_insert(0) += weight;
            }
        }
    }

    /// Number of distinct word tags in the index.
    pub fn term_count(&self) -> usize {
        self.postings.len()
    }

    pub fn options(&self) -> IndexOptions {
        self.options
    }

    /// The analyzers this index was built with.
    pub fn morphology(&self) -> &Arc<Morphology> {
        &self.morphology
    }

    /// Nodes carrying `tag`, with their weights.
    pub fn postings(&self, tag: &WordTag) -> Option<&BTreeMap<String, u64>> {
        self.postings.get(tag)
    }

    /// Rank nodes for a free-text query.
    ///
    /// An empty vector means nothing matched; that includes queries whose
    /// words were all too short to keep.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let mut words = self.tokenizer.tokens(query);
        let mut seen = HashSet::new();
        words.retain(|w| seen.insert(w.clone()));

        // (node, raw weight, matched word count), in first-seen order.
        let mut scores: Vec<(String, u64, u64)> = Vec::new();
        let mut position: HashMap<String, usize> = HashMap::new();

        for word in &words {
            let mut matched: HashSet<&str> = HashSet::new();
            for tag in self.morphology.word_tags(word) {
                let Some(nodes) = self.postings.get(&tag) else {
                    continue;
                };
                for (node, weight) in nodes {
                    let slot = *position.entry(node.clone()).or_insert_with(|| {
                        scores.push((node.clone(), 0, 0));
                        scores.len() - 1
                    });
                    scores[slot].1 += weight;
                    if matched.insert(node.as_str()) {
                        scores[slot].2 += 1;
                    }
                }
            }
        }

        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .map(|(node, raw, count)| SearchHit {
                node,
                score: raw * count,
            })
            .collect();
        hits.sort_by(|a, b| b.score.cmp(&a.score));

        debug!(
            query,
            words = words.len(),
            hits = hits.len(),
            top = ?hits.first().map(|h| (&h.node, h.score)),
            "Search resolved"
        );
        hits
    }
}

#[cfg(test)]
mod tests {
    use signpost_graph::{ConversationDocument, LinkList, LinkSpec, NodeSpec, UrlLink};

    use super::*;

    fn node(name: &str, text: &str) -> NodeSpec {
        NodeSpec {
            name: name.to_string(),
            answers: vec![Answer::Text(text.to_string())],
            ..Default::default()
        }
    }

    fn root_linking(names: &[&str]) -> NodeSpec {
        NodeSpec {
            name: "/start".to_string(),
            answers: vec![Answer::Text("Welcome, masks and vaccines".to_string())],
            links: names.iter().map(|n| LinkSpec::Name(n.to_string())).collect(),
            ..Default::default()
        }
    }

    fn index_of(nodes: Vec<NodeSpec>) -> SearchIndex {
        let names: Vec<String> = nodes.iter().map(|n| n.name.clone()).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut all = vec![root_linking(&names)];
        all.extend(nodes);
        let graph = GraphModel::build(&ConversationDocument { nodes: all }, "/start").unwrap();
        let morphology = Arc::new(Morphology::for_languages(&["en", "ru"]).unwrap());
        SearchIndex::build(&graph, morphology, IndexOptions::default())
    }

    fn ranked(index: &SearchIndex, query: &str) -> Vec<String> {
        index.search(query).into_iter().map(|h| h.node).collect()
    }

    #[test]
    fn test_more_distinct_words_outrank_single_word() {
        let index = index_of(vec![
            node("Masks", "masks required"),
            node("Vaccination", "vaccine required"),
        ]);
        let hits = index.search("masks required");
        assert_eq!(hits[0].node, "Masks");
        assert_eq!(hits[1].node, "Vaccination");
        assert!(hits[0].score > hits[1].score);
    }

    #[test]
    fn test_score_is_raw_weight_times_distinct_matches() {
        let index = index_of(vec![
            node("Testing", "swab swab swab"),
            node("Clinic", "swab queue"),
        ]);
        let hits = index.search("swab queue");
        // Each English word carries a noun and a verb tag.
        // Clinic: (2 + 2) * 2 words; Testing: (3 + 3) * 1 word.
        assert_eq!(
            hits,
            vec![
                SearchHit {
                    node: "Clinic".to_string(),
                    score: 8,
                },
                SearchHit {
                    node: "Testing".to_string(),
                    score: 6,
                },
            ]
        );
    }

    #[test]
    fn test_identity_fields_dominate() {
        let mut masks = node("Masks", "Covering your face.");
        masks.alt_names = vec!["Face coverings".to_string()];
        let index = index_of(vec![
            masks,
            node("Shops", "Face coverings are required in shops, face coverings everywhere."),
        ]);
        assert_eq!(ranked(&index, "face coverings")[0], "Masks");
        assert_eq!(ranked(&index, "masks")[0], "Masks");
    }

    #[test]
    fn test_inflected_query_finds_lemma() {
        let index = index_of(vec![
            node("Маски", "Маска обязательна в транспорте"),
            node("Vaccination", "A vaccine is required"),
        ]);
        assert_eq!(ranked(&index, "масками"), vec!["Маски"]);
        assert_eq!(ranked(&index, "МАСКУ"), vec!["Маски"]);
        assert_eq!(ranked(&index, "vaccines"), vec!["Vaccination"]);
        assert_eq!(ranked(&index, "requiring"), vec!["Vaccination"]);
    }

    #[test]
    fn test_empty_and_short_queries_match_nothing() {
        let index = index_of(vec![node("Masks", "masks required")]);
        assert!(index.search("").is_empty());
        assert!(index.search("   ").is_empty());
        assert!(index.search("a is to").is_empty());
        assert!(index.search("zebra").is_empty());
    }

    #[test]
    fn test_root_is_not_indexed() {
        let index = index_of(vec![node("Masks", "Wear one on public transport")]);
        assert!(ranked(&index, "welcome").is_empty());
        assert_eq!(ranked(&index, "masks"), vec!["Masks"]);
    }

    #[test]
    fn test_link_list_and_keywords_are_indexed() {
        let mut links = node("Resources", "See below.");
        links.answers.push(Answer::LinkList(LinkList {
            heading: "Official guidance".to_string(),
            links: vec![UrlLink {
                label: "Hotline numbers".to_string(),
                url: "https://example.org/hotline".to_string(),
            }],
        }));
        links.keywords = vec!["helpline".to_string()];
        let index = index_of(vec![links]);

        assert_eq!(ranked(&index, "guidance"), vec!["Resources"]);
        assert_eq!(ranked(&index, "hotline"), vec!["Resources"]);
        assert_eq!(ranked(&index, "helpline"), vec!["Resources"]);
        assert!(ranked(&index, "example").is_empty());
    }

    #[test]
    fn test_equal_scores_keep_first_seen_order() {
        let index = index_of(vec![node("Beta", "parking"), node("Alpha", "parking")]);
        let hits = index.search("parking");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].score, hits[1].score);
        // Postings iterate by name, so the first-seen node is "Alpha".
        assert_eq!(hits[0].node, "Alpha");
    }

    #[test]
    fn test_repeated_query_words_count_once() {
        let index = index_of(vec![node("Masks", "masks")]);
        assert_eq!(index.search("masks masks"), index.search("masks"));
    }

    #[test]
    fn test_unreachable_nodes_are_not_indexed() {
        let doc = ConversationDocument {
            nodes: vec![root_linking(&[]), node("Orphan", "parking")],
        };
        let graph = GraphModel::build(&doc, "/start").unwrap();
        let morphology = Arc::new(Morphology::for_languages(&["en"]).unwrap());
        let index = SearchIndex::build(&graph, morphology, IndexOptions::default());
        assert!(index.search("parking").is_empty());
    }

    #[test]
    fn test_options_from_config() {
        let config = SearchConfig {
            identity_weight: 500,
            min_token_length: 4,
            ..Default::default()
        };
        let options = IndexOptions::from(&config);
        assert_eq!(options.identity_weight, 500);
        assert_eq!(options.min_token_length, 4);
        assert_eq!(options.content_weight, 1);
    }
}
