//! Canonical printer for termpose trees.
//!
//! The printer picks exactly one rendering for every tree, so that parsing
//! its output gives back a structurally equal tree. A form goes on one line
//! when all of its children are inline (atoms or `tag:value` chains) and the
//! line fits the configured width; otherwise each child gets its own line.

use std::ops::Range;

use crate::term::Term;

/// Configuration for the printer.
#[derive(Debug, Clone)]
pub struct PrintConfig {
    /// Indentation string for one nesting level (default: one tab).
    pub indent: String,
    /// Maximum line width before a form is split over several lines
    /// (default: 80).
    pub max_width: usize,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            max_width: 80,
        }
    }
}

impl PrintConfig {
    /// Indent with `width` spaces per level instead of a tab.
    #[must_use]
    pub fn with_spaces(mut self, width: usize) -> Self {
        self.indent = " ".repeat(width);
        self
    }

    /// Override the maximum line width.
    #[must_use]
    pub const fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = max_width;
        self
    }
}

/// Format a term to a string.
///
/// A term with an empty head and at least one child is treated as a document
/// root: its children are printed as top-level items. Any other term is
/// printed as a single top-level item.
#[must_use]
pub fn format(term: &Term, config: &PrintConfig) -> String {
    let layout = Layout::new(term);
    let mut printer = Printer::new(config.clone());
    if term.head().is_empty() && !term.is_atom() {
        printer.items(&layout, layout.nodes[0].children.clone());
    } else {
        printer.items(&layout, 0..1);
    }
    printer.output
}

/// Render text as a single inline token, quoting when needed.
#[must_use]
pub fn escape(text: &str) -> String {
    if text.is_empty() {
        return "\"\"".to_string();
    }
    if text.chars().all(is_bare_char) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_bare_char(c: char) -> bool {
    !matches!(c, ' ' | '\t' | '\n' | '\r' | ':' | '"' | '\\') && !c.is_control()
}

fn is_indent_char(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Whether multi-line text survives a trip through a block quote unchanged.
fn is_block_text(text: &str) -> bool {
    if !text.contains('\n') || text.contains('\r') || text.ends_with('\n') {
        return false;
    }
    let mut anchored = false;
    for line in text.split('\n') {
        if line.is_empty() {
            continue;
        }
        if line.chars().all(is_indent_char) {
            return false;
        }
        anchored |= !line.starts_with(is_indent_char);
    }
    anchored
}

/// One node of a [`Layout`], with what the printer needs to know about its
/// subtree.
struct Shape<'t> {
    term: &'t Term,
    /// The head as an inline token.
    head: String,
    children: Range<usize>,
    /// Width of the subtree as a single inline token, if it has one.
    inline_width: Option<usize>,
    /// Width of the subtree as a token that opens a block quote.
    tail_width: Option<usize>,
}

impl<'t> Shape<'t> {
    fn new(term: &'t Term) -> Self {
        Self {
            term,
            head: escape(term.head()),
            children: 0..0,
            inline_width: None,
            tail_width: None,
        }
    }

    fn is_atom(&self) -> bool {
        self.children.is_empty()
    }
}

/// Every node of a tree in breadth-first order, so the children of a node
/// sit in one contiguous run after it.
struct Layout<'t> {
    nodes: Vec<Shape<'t>>,
}

impl<'t> Layout<'t> {
    fn new(root: &'t Term) -> Self {
        let mut nodes = vec![Shape::new(root)];
        let mut next = 0;
        while next < nodes.len() {
            let term = nodes[next].term;
            let start = nodes.len();
            nodes.extend(term.children().iter().map(Shape::new));
            nodes[next].children = start..nodes.len();
            next += 1;
        }

        // Children come after their parent, so a reverse sweep sees them first.
        for index in (0..nodes.len()).rev() {
            let node = &nodes[index];
            let head = node.head.chars().count();
            let (inline_width, tail_width) = match node.children.len() {
                0 if is_block_text(node.term.head()) => (None, Some(1)),
                0 => (Some(head), None),
                1 => {
                    let child = &nodes[node.children.start];
                    let tail = if child.is_atom() {
                        child.tail_width.map(|_| head + 1)
                    } else {
                        child.tail_width.map(|w| head + 1 + w)
                    };
                    (child.inline_width.map(|w| head + 1 + w), tail)
                }
                _ => (None, None),
            };
            nodes[index].inline_width = inline_width;
            nodes[index].tail_width = tail_width;
        }

        Self { nodes }
    }

    /// Append the inline token of a node that has one.
    fn write_inline(&self, mut index: usize, out: &mut String) {
        loop {
            let node = &self.nodes[index];
            out.push_str(&node.head);
            if node.is_atom() {
                return;
            }
            out.push(':');
            index = node.children.start;
        }
    }

    /// Append the block-opening token of a node that has one, returning the
    /// block content.
    fn write_tail(&self, mut index: usize, out: &mut String) -> &'t str {
        loop {
            let node = &self.nodes[index];
            if node.is_atom() {
                out.push('"');
                return node.term.head();
            }
            out.push_str(&node.head);
            let child = node.children.start;
            if !self.nodes[child].is_atom() {
                out.push(':');
            }
            index = child;
        }
    }

    /// Width of the whole form on one line, and whether that line ends by
    /// opening a block quote.
    fn one_line(&self, index: usize) -> Option<(usize, bool)> {
        let node = &self.nodes[index];
        if node.is_atom() {
            return None;
        }
        let last = node.children.end - 1;
        let mut width = node.head.chars().count();
        for child in node.children.start..last {
            width += 1 + self.nodes[child].inline_width?;
        }
        let tail = &self.nodes[last];
        match (tail.inline_width, tail.tail_width) {
            (Some(w), _) => Some((width + 1 + w, false)),
            (None, Some(w)) => Some((width + 1 + w, true)),
            (None, None) => None,
        }
    }
}

/// The internal printer state.
struct Printer {
    config: PrintConfig,
    output: String,
}

impl Printer {
    const fn new(config: PrintConfig) -> Self {
        Self {
            config,
            output: String::new(),
        }
    }

    fn writeln(&mut self, depth: usize, s: &str) {
        for _ in 0..depth {
            self.output.push_str(&self.config.indent);
        }
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn width_at(&self, depth: usize) -> usize {
        depth * self.config.indent.chars().count()
    }

    /// Print the given nodes as items at depth zero.
    fn items(&mut self, layout: &Layout<'_>, items: Range<usize>) {
        let mut pending: Vec<(usize, usize)> = items.rev().map(|index| (index, 0)).collect();
        while let Some((index, depth)) = pending.pop() {
            let node = &layout.nodes[index];
            if node.is_atom() {
                if node.tail_width.is_some() {
                    self.writeln(depth, "\"");
                    self.block(node.term.head(), depth + 1);
                } else {
                    self.writeln(depth, &node.head);
                }
                continue;
            }

            let fits = layout
                .one_line(index)
                .filter(|&(width, _)| self.width_at(depth) + width <= self.config.max_width);
            if let Some((_, opens_block)) = fits {
                let mut line = node.head.clone();
                let last = node.children.end - 1;
                for child in node.children.start..last {
                    line.push(' ');
                    layout.write_inline(child, &mut line);
                }
                line.push(' ');
                if opens_block {
                    let text = layout.write_tail(last, &mut line);
                    self.writeln(depth, &line);
                    self.block(text, depth + 1);
                } else {
                    layout.write_inline(last, &mut line);
                    self.writeln(depth, &line);
                }
                continue;
            }

            self.writeln(depth, &node.head);
            pending.extend(node.children.clone().rev().map(|child| (child, depth + 1)));
        }
    }

    fn block(&mut self, text: &str, depth: usize) {
        for line in text.split('\n') {
            if line.is_empty() {
                self.output.push('\n');
            } else {
                self.writeln(depth, line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, parse_single};

    const PRODUCTS: &str = "products\n\thammer cost:5 description\"\n\t\tpremium hammer. great for smashing\n\t\"bee's knee\" cost:9.50 description\"\n\t\tsupposedly really good thing\n\ttwine cost:0 description\"\n\t\tmake a text adventure\n";

    #[test]
    fn single_line_blocks_print_inline() {
        let root = parse(PRODUCTS).unwrap();
        let printed = root.pretty_print();
        assert_eq!(
            printed,
            "products\n\thammer cost:5 description:\"premium hammer. great for smashing\"\n\t\"bee's knee\" cost:9.50 description:\"supposedly really good thing\"\n\ttwine cost:0 description:\"make a text adventure\"\n"
        );
        assert_eq!(parse(&printed).unwrap(), root);
    }

    #[test]
    fn escape_rules() {
        assert_eq!(escape("hammer"), "hammer");
        assert_eq!(escape(""), "\"\"");
        assert_eq!(escape("bee's knee"), "\"bee's knee\"");
        assert_eq!(escape("a:b"), "\"a:b\"");
        assert_eq!(escape("say \"hi\"\\"), "\"say \\\"hi\\\"\\\\\"");
        assert_eq!(escape("two\nlines"), "\"two\\nlines\"");
    }

    #[test]
    fn apostrophe_survives_round_trip() {
        let t = Term::form("item", vec![Term::atom("bee's knee")]);
        let printed = t.pretty_print();
        assert_eq!(printed, "item \"bee's knee\"\n");
        assert_eq!(parse_single(&printed).unwrap(), t);
    }

    #[test]
    fn block_text_detection() {
        assert!(is_block_text("one\ntwo"));
        assert!(is_block_text("one\n  indented\n\nthree"));
        assert!(!is_block_text("single line"));
        assert!(!is_block_text("trailing\n"));
        assert!(!is_block_text("  all\n  indented"));
        assert!(!is_block_text("blank\n   \nline"));
        assert!(!is_block_text("cr\r\nlf"));
    }

    #[test]
    fn unsafe_multiline_text_is_quoted() {
        let t = Term::form("x", vec![Term::atom("  lead\n  ing")]);
        let printed = t.pretty_print();
        assert_eq!(printed, "x \"  lead\\n  ing\"\n");
        assert_eq!(parse_single(&printed).unwrap(), t);
    }

    #[test]
    fn block_in_the_middle_forces_one_child_per_line() {
        let t = Term::form(
            "doc",
            vec![Term::atom("first\nsecond"), Term::atom("after")],
        );
        let printed = t.pretty_print();
        assert_eq!(printed, "doc\n\t\"\n\t\tfirst\n\t\tsecond\n\tafter\n");
        assert_eq!(parse_single(&printed).unwrap(), t);
    }

    #[test]
    fn empty_heads_are_quoted() {
        let t = Term::form(
            "outer",
            vec![Term::form("", vec![Term::atom("a"), Term::atom("b")])],
        );
        let printed = t.pretty_print();
        assert_eq!(printed, "outer\n\t\"\" a b\n");
        assert_eq!(parse_single(&printed).unwrap(), t);
    }

    #[test]
    fn nested_block_chain() {
        let t = Term::form(
            "a",
            vec![Term::form("b", vec![Term::form("c", vec![Term::atom("x\ny")])])],
        );
        let printed = t.pretty_print();
        assert_eq!(printed, "a b:c\"\n\tx\n\ty\n");
        assert_eq!(parse_single(&printed).unwrap(), t);
    }

    #[test]
    fn narrow_width_splits_children() {
        let t = parse_single("record alpha beta gamma:delta").unwrap();
        let config = PrintConfig::default().with_spaces(2).with_max_width(16);
        insta::assert_snapshot!(format(&t, &config), @r"
        record
          alpha
          beta
          gamma delta
        ");
    }

    #[test]
    fn nested_forms_snapshot() {
        let t = parse_single("config\n  server host:localhost port:8080\n  users\n    alice admin\n    bob\n").unwrap();
        let config = PrintConfig::default().with_spaces(2);
        insta::assert_snapshot!(format(&t, &config), @r"
        config
          server host:localhost port:8080
          users alice:admin bob
        ");
    }

    #[test]
    fn deep_tag_chain_prints() {
        let source = format!("{}b", "a:".repeat(5_000));
        let t = parse_single(&source).unwrap();

        let wide = PrintConfig::default().with_max_width(usize::MAX);
        assert_eq!(format(&t, &wide), format!("a {}b\n", "a:".repeat(4_999)));

        let printed = t.pretty_print();
        assert!(printed.lines().count() > 1);
        let reparsed = parse_single(&printed).unwrap();
        assert_eq!(reparsed, t);
        assert_eq!(reparsed.pretty_print(), printed);
    }

    #[test]
    fn deep_nesting_prints_one_level_per_line() {
        let mut t = Term::atom("bottom");
        for _ in 0..3_000 {
            t = Term::form("n", vec![Term::atom("leaf"), t]);
        }
        let config = PrintConfig::default().with_spaces(1);
        let printed = format(&t, &config);
        assert!(printed.starts_with("n\n leaf\n n\n  leaf\n"));
        assert_eq!(printed.lines().count(), 2 * 3_000 + 1);
        assert_eq!(parse_single(&printed).unwrap(), t);
    }

    #[test]
    fn format_is_idempotent_on_messy_input() {
        let messy = "a   b:c   \"d e\"\n   f\n\n   g:h:i\n";
        let once = parse(messy).unwrap().pretty_print();
        let twice = parse(&once).unwrap().pretty_print();
        assert_eq!(once, twice);
        assert_eq!(once, "a b:c \"d e\" f g:h:i\n");
    }
}
