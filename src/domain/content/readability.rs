//! Reader-mode extraction.
//!
//! Markup is parsed into a small arena ([`DocumentTree`]) with the
//! structurally irrelevant subtrees already dropped. Every element gets its
//! own score from tag, class/id and text-density rules; that score is added
//! in full to the parent and at half weight to the grandparent. The node with
//! the highest aggregated score wins, its weak direct children are pruned,
//! and what remains is flattened to plain text.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};

/// Subtrees removed before scoring
const STRIPPED_TAGS: [&str; 8] = [
    "script", "style", "nav", "header", "footer", "aside", "form", "noscript",
];

static LIKELY_CANDIDATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)article|body|content|entry|hentry|main|page|pagination|post|text|blog|story")
        .expect("valid likely-candidates pattern")
});

static UNLIKELY_CANDIDATES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)combx|comment|community|disqus|extra|foot|header|menu|remark|rss|shoutbox|sidebar|sponsor|ad-break|agegate|pagination|pager|popup|tweet|twitter",
    )
    .expect("valid unlikely-candidates pattern")
});

/// Scoring constants. Defaults reproduce the classic reader-mode heuristic.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadabilityWeights {
    pub article: f64,
    pub block: f64,
    pub preformatted: f64,
    pub list: f64,
    pub heading: f64,
    /// Added for each of class and id matching the likely vocabulary
    pub likely_bonus: f64,
    /// Subtracted for each of class and id matching the unlikely vocabulary
    pub unlikely_penalty: f64,
    pub chars_per_point: usize,
    pub max_length_bonus: usize,
    pub grandparent_share: f64,
    /// Direct children of the winner scoring below this fraction of the
    /// winning score are dropped
    pub prune_ratio: f64,
}

impl Default for ReadabilityWeights {
    fn default() -> Self {
        Self {
            article: 10.0,
            block: 5.0,
            preformatted: 3.0,
            list: -3.0,
            heading: -5.0,
            likely_bonus: 25.0,
            unlikely_penalty: 25.0,
            chars_per_point: 100,
            max_length_bonus: 3,
            grandparent_share: 0.5,
            prune_ratio: 0.2,
        }
    }
}

impl ReadabilityWeights {
    fn tag_score(&self, tag: &str) -> f64 {
        match tag {
            "article" => self.article,
            "div" => self.block,
            "pre" | "td" | "blockquote" => self.preformatted,
            "address" | "ol" | "ul" | "dl" | "dd" | "dt" | "li" => self.list,
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "th" => self.heading,
            _ => 0.0,
        }
    }

    fn attribute_score(&self, value: &str) -> f64 {
        let mut score = 0.0;
        if LIKELY_CANDIDATES.is_match(value) {
            score += self.likely_bonus;
        }
        if UNLIKELY_CANDIDATES.is_match(value) {
            score -= self.unlikely_penalty;
        }
        score
    }

    fn text_score(&self, text: &TextStats) -> f64 {
        let segments = text.commas + 1;
        let length_bonus = (text.chars / self.chars_per_point.max(1)).min(self.max_length_bonus);
        (segments + length_bonus) as f64
    }
}

pub type NodeId = usize;

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element {
        tag: String,
        class: String,
        id: String,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct TreeNode {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena of the scored part of a document, in document order
#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<TreeNode>,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![TreeNode {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn push_element(&mut self, parent: NodeId, tag: &str, class: &str, id: &str) -> NodeId {
        self.push(
            parent,
            NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
                class: class.to_string(),
                id: id.to_string(),
            },
        )
    }

    pub fn push_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent].children.push(id);
        id
    }

    /// Parse permissively, dropping comments and stripped subtrees
    pub fn parse(markup: &str) -> Self {
        let html = Html::parse_document(markup);
        let mut tree = Self::new();
        let root = tree.root();

        let mut stack = vec![(html.tree.root(), root)];
        while let Some((node, parent)) = stack.pop() {
            let attach_to = match node.value() {
                Node::Element(element) => {
                    let tag = element.name();
                    if STRIPPED_TAGS.contains(&tag) {
                        continue;
                    }
                    let class = element.attr("class").unwrap_or_default();
                    let id = element.id().unwrap_or_default();
                    tree.push_element(parent, tag, class, id)
                }
                Node::Text(text) => {
                    tree.push_text(parent, &**text);
                    continue;
                }
                Node::Document | Node::Fragment => parent,
                _ => continue,
            };

            for child in node.children().rev() {
                stack.push((child, attach_to));
            }
        }

        tree
    }

    fn is_element(&self, id: NodeId) -> bool {
        matches!(self.nodes[id].kind, NodeKind::Element { .. })
    }

    /// Parent element, if the parent is not the document itself
    fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent.filter(|p| self.is_element(*p))
    }

    /// Stripped text of every text node under `id`, in document order,
    /// skipping the subtrees in `skip`
    fn text_pieces(&self, id: NodeId, skip: &[NodeId]) -> Vec<&str> {
        let mut pieces = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if skip.contains(&current) {
                continue;
            }
            match &self.nodes[current].kind {
                NodeKind::Text(text) => {
                    let trimmed = text.trim();
                    if !trimmed.is_empty() {
                        pieces.push(trimmed);
                    }
                }
                _ => stack.extend(self.nodes[current].children.iter().rev()),
            }
        }
        pieces
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct TextStats {
    chars: usize,
    commas: usize,
}

/// Per-node scores for one document
#[derive(Debug)]
struct Scores {
    own: Vec<Option<f64>>,
    aggregated: Vec<f64>,
    /// Nodes in the order they first received an aggregated score
    candidates: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
pub struct Readability {
    weights: ReadabilityWeights,
}

impl Readability {
    pub fn new(weights: ReadabilityWeights) -> Self {
        Self { weights }
    }

    pub fn extract(&self, markup: &str) -> String {
        self.extract_tree(&DocumentTree::parse(markup))
    }

    pub fn extract_tree(&self, tree: &DocumentTree) -> String {
        let scores = self.score(tree);
        let Some((winner, top)) = Self::select(&scores) else {
            return String::new();
        };

        let threshold = top * self.weights.prune_ratio;
        let pruned: Vec<NodeId> = tree.nodes[winner]
            .children
            .iter()
            .copied()
            .filter(|child| matches!(scores.own[*child], Some(score) if score < threshold))
            .collect();

        tree.text_pieces(winner, &pruned)
            .join(" ")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The winning node and its aggregated score
    pub fn top_candidate(&self, tree: &DocumentTree) -> Option<(NodeId, f64)> {
        Self::select(&self.score(tree))
    }

    fn select(scores: &Scores) -> Option<(NodeId, f64)> {
        let mut best = None;
        let mut max = -1.0;
        for &id in &scores.candidates {
            let score = scores.aggregated[id];
            if score > max {
                max = score;
                best = Some((id, score));
            }
        }
        best
    }

    fn score(&self, tree: &DocumentTree) -> Scores {
        let count = tree.nodes.len();

        // Children always follow their parent in the arena
        let mut stats = vec![TextStats::default(); count];
        for id in (0..count).rev() {
            if let NodeKind::Text(text) = &tree.nodes[id].kind {
                let trimmed = text.trim();
                stats[id].chars += trimmed.chars().count();
                stats[id].commas += trimmed.matches(',').count();
            }
            if let Some(parent) = tree.nodes[id].parent {
                stats[parent].chars += stats[id].chars;
                stats[parent].commas += stats[id].commas;
            }
        }

        let mut scores = Scores {
            own: vec![None; count],
            aggregated: vec![0.0; count],
            candidates: Vec::new(),
        };
        let mut touched = vec![false; count];
        let mut credit = |scores: &mut Scores, id: NodeId, amount: f64| {
            scores.aggregated[id] += amount;
            if !touched[id] {
                touched[id] = true;
                scores.candidates.push(id);
            }
        };

        for id in 0..count {
            let NodeKind::Element { tag, class, id: dom_id } = &tree.nodes[id].kind else {
                continue;
            };
            let own = self.weights.tag_score(tag)
                + self.weights.attribute_score(class)
                + self.weights.attribute_score(dom_id)
                + self.weights.text_score(&stats[id]);
            scores.own[id] = Some(own);

            if let Some(parent) = tree.parent_element(id) {
                credit(&mut scores, parent, own);
                if let Some(grandparent) = tree.parent_element(parent) {
                    credit(&mut scores, grandparent, own * self.weights.grandparent_share);
                }
            }
        }

        scores
    }
}

/// Main readable text of an HTML document, or `""` when nothing qualifies
pub fn extract_main_text(markup: &str) -> String {
    Readability::default().extract(markup)
}
