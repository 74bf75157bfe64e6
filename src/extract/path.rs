//! Path expressions: namespace qualification, column naming, compilation and
//! evaluation against a [`Fragment`].
//!
//! The supported syntax is the subset of XPath understood by ElementTree's
//! `findall`, plus a trailing `@attr` step that selects attribute values.

use crate::error::{Error, Result};
use crate::extract::element::{Attribute, Fragment, Node, NodeId, QualifiedName};
use crate::spec::FieldSpec;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

static NAME_TEST_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:\{(?P<ns>[^}]*)\})?(?:(?P<prefix>[^\s:{}\[\]/@]+):)?(?P<local>[^\s:{}\[\]/@=]+)$")
        .unwrap()
});

static STEP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<test>(?:\{[^}]*\})?[^\[\]{}]+)(?P<predicates>\[.*\])?$").unwrap()
});

static PREDICATE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"^(?:(?P<position>\d+)|(?P<last>last\(\))|(?P<attr>@)?(?P<target>\.|[^\s='"]+)(?:\s*=\s*(?:'(?P<sq>[^']*)'|"(?P<dq>[^"]*)"))?)$"#,
    )
    .unwrap()
});

/// True for a non-empty segment made only of alphanumeric characters
pub fn is_alphanumeric(segment: &str) -> bool {
    !segment.is_empty() && segment.chars().all(char::is_alphanumeric)
}

/// Qualify the bare segments of `relative_path` with `namespace`.
///
/// Segments that are not purely alphanumeric (wildcards, `.`/`..`, attribute
/// steps, predicates, prefixed names) are passed through unchanged. Returns
/// `None` for an empty path.
pub fn resolve(namespace: Option<&str>, relative_path: &str) -> Option<String> {
    if relative_path.is_empty() {
        return None;
    }
    let segments: Vec<String> = relative_path
        .split('/')
        .map(|segment| match namespace {
            Some(ns) if is_alphanumeric(segment) => format!("{{{}}}{}", ns, segment),
            _ => segment.to_string(),
        })
        .collect();
    Some(segments.join("/"))
}

/// Column name for a field: `name`, else `tag_name`, else the last
/// alphanumeric segment of its `xpath`.
pub fn derive_name(field: &FieldSpec) -> Option<String> {
    let declared = [field.name.as_deref(), field.tag_name.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty());
    if let Some(name) = declared {
        return Some(name.to_string());
    }

    field
        .xpath
        .split('/')
        .rev()
        .map(str::trim)
        .find(|segment| is_alphanumeric(segment))
        .map(str::to_string)
}

#[derive(Debug, Clone, PartialEq)]
enum NamespaceTest {
    /// `{*}name`
    Any,
    /// bare `name` or `{}name`
    Unqualified,
    Uri(String),
    /// `prefix:name`, compared against the prefix written in the document
    Prefix(String),
}

/// Matches element or attribute names
#[derive(Debug, Clone, PartialEq)]
pub struct NameTest {
    namespace: NamespaceTest,
    /// None for the `*` wildcard
    local: Option<String>,
}

impl NameTest {
    fn parse(text: &str) -> Result<Self> {
        if text == "*" {
            return Ok(NameTest {
                namespace: NamespaceTest::Any,
                local: None,
            });
        }
        let caps = NAME_TEST_REGEX
            .captures(text)
            .ok_or_else(|| Error::config(format!("invalid name test {:?}", text)))?;

        let namespace = match (caps.name("ns"), caps.name("prefix")) {
            (Some(_), Some(_)) => {
                return Err(Error::config(format!(
                    "name test {:?} mixes a namespace URI and a prefix",
                    text
                )))
            }
            (Some(ns), None) if ns.as_str() == "*" => NamespaceTest::Any,
            (Some(ns), None) if ns.as_str().is_empty() => NamespaceTest::Unqualified,
            (Some(ns), None) => NamespaceTest::Uri(ns.as_str().to_string()),
            (None, Some(prefix)) => NamespaceTest::Prefix(prefix.as_str().to_string()),
            (None, None) => NamespaceTest::Unqualified,
        };
        let local = match &caps["local"] {
            "*" => None,
            local => Some(local.to_string()),
        };
        Ok(NameTest { namespace, local })
    }

    pub fn matches(&self, name: &QualifiedName) -> bool {
        if let Some(local) = &self.local {
            if *local != name.local {
                return false;
            }
        }
        match &self.namespace {
            NamespaceTest::Any => true,
            NamespaceTest::Unqualified => name.namespace.is_none(),
            NamespaceTest::Uri(uri) => name.namespace.as_deref() == Some(uri.as_str()),
            NamespaceTest::Prefix(prefix) => name.prefix.as_deref() == Some(prefix.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    HasAttribute(NameTest),
    AttributeEquals(NameTest, String),
    HasChild(NameTest),
    ChildTextEquals(NameTest, String),
    TextEquals(String),
    /// 1-based position among siblings selected by the same step
    Position(usize),
    Last,
}

impl Predicate {
    fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let caps = PREDICATE_REGEX
            .captures(text)
            .ok_or_else(|| Error::config(format!("unsupported predicate [{}]", text)))?;

        if let Some(position) = caps.name("position") {
            let position: usize = position
                .as_str()
                .parse()
                .map_err(|_| Error::config(format!("invalid position [{}]", text)))?;
            if position == 0 {
                return Err(Error::config("positions in predicates start at 1"));
            }
            return Ok(Predicate::Position(position));
        }
        if caps.name("last").is_some() {
            return Ok(Predicate::Last);
        }

        let target = &caps["target"];
        let value = caps
            .name("sq")
            .or_else(|| caps.name("dq"))
            .map(|m| m.as_str().to_string());
        let is_attribute = caps.name("attr").is_some();

        match (is_attribute, target, value) {
            (true, ".", _) => Err(Error::config(format!("unsupported predicate [{}]", text))),
            (true, name, None) => Ok(Predicate::HasAttribute(NameTest::parse(name)?)),
            (true, name, Some(value)) => Ok(Predicate::AttributeEquals(NameTest::parse(name)?, value)),
            (false, ".", Some(value)) => Ok(Predicate::TextEquals(value)),
            (false, ".", None) => Err(Error::config(format!("unsupported predicate [{}]", text))),
            (false, name, None) => Ok(Predicate::HasChild(NameTest::parse(name)?)),
            (false, name, Some(value)) => Ok(Predicate::ChildTextEquals(NameTest::parse(name)?, value)),
        }
    }

    fn is_positional(&self) -> bool {
        matches!(self, Predicate::Position(_) | Predicate::Last)
    }

    fn is_attribute_only(&self) -> bool {
        matches!(self, Predicate::HasAttribute(_) | Predicate::AttributeEquals(..))
    }

    /// Evaluate a non-positional predicate on one node
    fn accepts(&self, fragment: &Fragment, node: &Node) -> bool {
        match self {
            Predicate::HasAttribute(test) => attributes_matching(&node.attributes, test).next().is_some(),
            Predicate::AttributeEquals(test, value) => {
                attributes_matching(&node.attributes, test).any(|a| a.value == *value)
            }
            Predicate::HasChild(test) => node
                .children
                .iter()
                .any(|&c| test.matches(&fragment.node(c).name)),
            Predicate::ChildTextEquals(test, value) => node.children.iter().any(|&c| {
                let child = fragment.node(c);
                test.matches(&child.name) && child.text == *value
            }),
            Predicate::TextEquals(value) => node.text == *value,
            Predicate::Position(_) | Predicate::Last => true,
        }
    }

    fn accepts_attributes(&self, attributes: &[Attribute]) -> bool {
        match self {
            Predicate::HasAttribute(test) => attributes_matching(attributes, test).next().is_some(),
            Predicate::AttributeEquals(test, value) => {
                attributes_matching(attributes, test).any(|a| a.value == *value)
            }
            _ => true,
        }
    }
}

fn attributes_matching<'a>(
    attributes: &'a [Attribute],
    test: &'a NameTest,
) -> impl Iterator<Item = &'a Attribute> + 'a {
    attributes.iter().filter(move |a| test.matches(&a.name))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq)]
enum Step {
    SelfNode { axis: Axis },
    Parent,
    Element {
        axis: Axis,
        test: NameTest,
        predicates: Vec<Predicate>,
    },
    Attribute { axis: Axis, test: NameTest },
}

/// Split on `/` outside of `{...}`, `[...]` and quotes
fn split_steps(expr: &str) -> Result<Vec<&str>> {
    let mut parts = Vec::new();
    let mut depth_brace = 0usize;
    let mut depth_bracket = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in expr.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') if depth_bracket > 0 => quote = Some(ch),
            (None, '{') => depth_brace += 1,
            (None, '}') => depth_brace = depth_brace.saturating_sub(1),
            (None, '[') => depth_bracket += 1,
            (None, ']') => depth_bracket = depth_bracket.saturating_sub(1),
            (None, '/') if depth_brace == 0 && depth_bracket == 0 => {
                parts.push(&expr[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() || depth_brace > 0 || depth_bracket > 0 {
        return Err(Error::config(format!("unbalanced path expression {:?}", expr)));
    }
    parts.push(&expr[start..]);
    Ok(parts)
}

/// Split `a[...][...]` predicate text into the individual predicate bodies
fn split_predicates(text: &str) -> Result<Vec<&str>> {
    let mut bodies = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, ch) in text.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(ch),
            (None, '[') => {
                if depth == 0 {
                    start = i + 1;
                }
                depth += 1;
            }
            (None, ']') => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    bodies.push(&text[start..i]);
                }
            }
            (None, _) if depth == 0 => {
                return Err(Error::config(format!("unexpected text in predicates {:?}", text)))
            }
            _ => {}
        }
    }
    Ok(bodies)
}

/// Parse steps; `descendant_first` applies the descendant axis to the first step
fn parse_steps(segments: &[&str], descendant_first: bool, expr: &str) -> Result<Vec<Step>> {
    let mut steps = Vec::new();
    let mut axis = if descendant_first { Axis::Descendant } else { Axis::Child };
    let last = segments.len().saturating_sub(1);

    for (idx, segment) in segments.iter().enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            if idx == last {
                // trailing slash
                break;
            }
            axis = Axis::Descendant;
            continue;
        }

        let step = if segment == "." {
            Step::SelfNode { axis }
        } else if segment == ".." {
            Step::Parent
        } else if let Some(name) = segment.strip_prefix('@') {
            if idx != last {
                return Err(Error::config(format!(
                    "attribute step must be last in {:?}",
                    expr
                )));
            }
            Step::Attribute {
                axis,
                test: NameTest::parse(name)?,
            }
        } else {
            let caps = STEP_REGEX
                .captures(segment)
                .ok_or_else(|| Error::config(format!("invalid step {:?} in {:?}", segment, expr)))?;
            let predicates = match caps.name("predicates") {
                Some(text) => split_predicates(text.as_str())?
                    .into_iter()
                    .map(Predicate::parse)
                    .collect::<Result<Vec<_>>>()?,
                None => Vec::new(),
            };
            Step::Element {
                axis,
                test: NameTest::parse(caps["test"].trim())?,
                predicates,
            }
        };
        steps.push(step);
        axis = Axis::Child;
    }

    if steps.is_empty() {
        return Err(Error::config(format!("empty path expression {:?}", expr)));
    }
    Ok(steps)
}

/// A node selected by a [`LocationPath`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selected<'a> {
    Element(NodeId),
    Attribute(&'a str),
}

/// A compiled relative path, evaluated from the root of a fragment
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    steps: Vec<Step>,
}

impl LocationPath {
    pub fn compile(expr: &str) -> Result<Self> {
        let segments = split_steps(expr.trim())?;
        let (segments, descendant_first) = match segments.as_slice() {
            ["", "", rest @ ..] => (rest, true),
            ["", rest @ ..] if !rest.is_empty() => {
                return Err(Error::config(format!(
                    "absolute path {:?} cannot be used relative to an element",
                    expr
                )))
            }
            all => (all, false),
        };
        Ok(LocationPath {
            steps: parse_steps(segments, descendant_first, expr)?,
        })
    }

    /// All matches under the fragment root, in document order
    pub fn select<'f>(&self, fragment: &'f Fragment) -> Vec<Selected<'f>> {
        let mut context: Vec<NodeId> = vec![Fragment::ROOT];

        for step in &self.steps {
            match step {
                Step::SelfNode { axis } => {
                    if *axis == Axis::Descendant {
                        context = expand_descendants_or_self(fragment, &context);
                    }
                }
                Step::Parent => {
                    context = context
                        .iter()
                        .filter_map(|&id| fragment.node(id).parent)
                        .collect();
                    context.sort_unstable();
                    context.dedup();
                }
                Step::Element {
                    axis,
                    test,
                    predicates,
                } => {
                    context = select_elements(fragment, &context, *axis, test, predicates);
                }
                Step::Attribute { axis, test } => {
                    let owners = match axis {
                        Axis::Child => context,
                        Axis::Descendant => expand_descendants_or_self(fragment, &context),
                    };
                    let mut values = Vec::new();
                    for id in owners {
                        for attribute in &fragment.node(id).attributes {
                            if test.matches(&attribute.name) {
                                values.push(Selected::Attribute(attribute.value.as_str()));
                            }
                        }
                    }
                    return values;
                }
            }
            if context.is_empty() {
                break;
            }
        }

        context.into_iter().map(Selected::Element).collect()
    }
}

fn expand_descendants_or_self(fragment: &Fragment, context: &[NodeId]) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = context
        .iter()
        .flat_map(|&id| std::iter::once(id).chain(fragment.descendants(id)))
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn select_elements(
    fragment: &Fragment,
    context: &[NodeId],
    axis: Axis,
    test: &NameTest,
    predicates: &[Predicate],
) -> Vec<NodeId> {
    let matches_test = |id: &NodeId| test.matches(&fragment.node(*id).name);
    let mut candidates: Vec<NodeId> = Vec::new();
    for &id in context {
        match axis {
            Axis::Child => candidates.extend(
                fragment.node(id).children.iter().copied().filter(matches_test),
            ),
            Axis::Descendant => candidates.extend(fragment.descendants(id).filter(matches_test)),
        }
    }
    candidates.sort_unstable();
    candidates.dedup();

    for predicate in predicates {
        if predicate.is_positional() {
            candidates = apply_position(fragment, &candidates, predicate);
        } else {
            candidates.retain(|&id| predicate.accepts(fragment, fragment.node(id)));
        }
    }
    candidates
}

/// Keep candidates at the requested position among candidates sharing their parent
fn apply_position(fragment: &Fragment, candidates: &[NodeId], predicate: &Predicate) -> Vec<NodeId> {
    let mut siblings: HashMap<Option<NodeId>, Vec<NodeId>> = HashMap::new();
    for &id in candidates {
        siblings.entry(fragment.node(id).parent).or_default().push(id);
    }

    let mut kept: Vec<NodeId> = siblings
        .into_values()
        .filter_map(|group| match predicate {
            Predicate::Position(n) => group.get(n - 1).copied(),
            Predicate::Last => group.last().copied(),
            _ => None,
        })
        .collect();
    kept.sort_unstable();
    kept
}

#[derive(Debug, Clone, PartialEq)]
struct PatternStep {
    /// Relation to the previous step (or to the document, for the first step)
    axis: Axis,
    test: NameTest,
    predicates: Vec<Predicate>,
}

/// Decides which streamed elements are parent-record boundaries
///
/// `item` matches every `item` element; `catalog/item` only those whose parent
/// is `catalog`; `/catalog/item` additionally requires `catalog` to be the
/// document element. Only the last step may carry (attribute) predicates.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentPattern {
    steps: Vec<PatternStep>,
}

impl ParentPattern {
    pub fn compile(expr: &str) -> Result<Self> {
        let segments = split_steps(expr)?;
        let (segments, first_axis) = match segments.as_slice() {
            ["", "", rest @ ..] => (rest, Axis::Descendant),
            ["", rest @ ..] if !rest.is_empty() => (rest, Axis::Child),
            all => (all, Axis::Descendant),
        };

        let steps = parse_steps(segments, first_axis == Axis::Descendant, expr)?;
        let last = steps.len() - 1;
        let steps = steps
            .into_iter()
            .enumerate()
            .map(|(idx, step)| match step {
                Step::Element {
                    axis,
                    test,
                    predicates,
                } => {
                    let allowed = if idx == last {
                        predicates.iter().all(Predicate::is_attribute_only)
                    } else {
                        predicates.is_empty()
                    };
                    if !allowed {
                        return Err(Error::config(format!(
                            "parent expression {:?} may only use attribute predicates on its last step",
                            expr
                        )));
                    }
                    Ok(PatternStep {
                        axis,
                        test,
                        predicates,
                    })
                }
                _ => Err(Error::config(format!(
                    "parent expression {:?} may only contain element names",
                    expr
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ParentPattern { steps })
    }

    /// Matches only the document element
    pub fn document_element() -> Self {
        ParentPattern {
            steps: vec![PatternStep {
                axis: Axis::Child,
                test: NameTest {
                    namespace: NamespaceTest::Any,
                    local: None,
                },
                predicates: Vec::new(),
            }],
        }
    }

    /// Whether the last step could match an element with this name; lets the
    /// stream skip attribute decoding for most elements
    pub fn could_match(&self, name: &QualifiedName) -> bool {
        self.steps
            .last()
            .is_some_and(|step| step.test.matches(name))
    }

    /// Whether the innermost element of `open` (the path from the document
    /// element down) with `attributes` is a match
    pub fn matches(&self, open: &[QualifiedName], attributes: &[Attribute]) -> bool {
        let Some(last_step) = self.steps.last() else {
            return false;
        };
        if open.is_empty()
            || !last_step
                .predicates
                .iter()
                .all(|p| p.accepts_attributes(attributes))
        {
            return false;
        }
        self.matches_at(self.steps.len() - 1, open, open.len() - 1)
    }

    fn matches_at(&self, step: usize, open: &[QualifiedName], depth: usize) -> bool {
        let current = &self.steps[step];
        if !current.test.matches(&open[depth]) {
            return false;
        }
        if step == 0 {
            return current.axis == Axis::Descendant || depth == 0;
        }
        match current.axis {
            Axis::Child => depth > 0 && self.matches_at(step - 1, open, depth - 1),
            Axis::Descendant => (0..depth).rev().any(|d| self.matches_at(step - 1, open, d)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(path: &str, xml: &str) -> Vec<String> {
        let fragment = Fragment::parse(xml).unwrap();
        LocationPath::compile(path)
            .unwrap()
            .select(&fragment)
            .into_iter()
            .map(|s| match s {
                Selected::Element(id) => {
                    let node = fragment.node(id);
                    format!("{}:{}", node.name.local, node.text)
                }
                Selected::Attribute(value) => format!("@{}", value),
            })
            .collect()
    }

    fn names(open: &[&str]) -> Vec<QualifiedName> {
        open.iter().map(|n| QualifiedName::local(*n)).collect()
    }

    #[test]
    fn test_resolve_without_namespace() {
        assert_eq!(resolve(None, "a/b"), Some("a/b".to_string()));
        assert_eq!(resolve(None, ""), None);
    }

    #[test]
    fn test_resolve_qualifies_alphanumeric_segments() {
        assert_eq!(
            resolve(Some("urn:x"), "order/line2/*/@id/a_b"),
            Some("{urn:x}order/{urn:x}line2/*/@id/a_b".to_string())
        );
        assert_eq!(
            resolve(Some("urn:x"), ".//price"),
            Some(".//{urn:x}price".to_string())
        );
    }

    #[test]
    fn test_derive_name_precedence() {
        let field = FieldSpec::new("a/b").with_name("  Price ");
        assert_eq!(derive_name(&field).as_deref(), Some("Price"));

        let mut field = FieldSpec::new("a/b").with_name("   ");
        field.tag_name = Some("tag".to_string());
        assert_eq!(derive_name(&field).as_deref(), Some("tag"));

        let field = FieldSpec::new("details/price/@currency");
        assert_eq!(derive_name(&field).as_deref(), Some("price"));

        let field = FieldSpec::new("*/..");
        assert_eq!(derive_name(&field), None);
    }

    #[test]
    fn test_child_and_grandchild_steps() {
        let xml = "<item><price>10</price><price>11</price><d><price>12</price></d></item>";
        assert_eq!(texts("price", xml), vec!["price:10", "price:11"]);
        assert_eq!(texts("d/price", xml), vec!["price:12"]);
        assert_eq!(texts(".//price", xml), vec!["price:10", "price:11", "price:12"]);
        assert_eq!(texts("//price", xml).len(), 3);
        assert_eq!(texts("*/price", xml), vec!["price:12"]);
        assert!(texts("missing", xml).is_empty());
    }

    #[test]
    fn test_predicates() {
        let xml = r#"<item><p type="a">1</p><p type="b">2</p><p>3</p><q><k>v</k></q></item>"#;
        assert_eq!(texts("p[@type]", xml), vec!["p:1", "p:2"]);
        assert_eq!(texts("p[@type='b']", xml), vec!["p:2"]);
        assert_eq!(texts("p[2]", xml), vec!["p:2"]);
        assert_eq!(texts("p[last()]", xml), vec!["p:3"]);
        assert_eq!(texts("p[.='3']", xml), vec!["p:3"]);
        assert_eq!(texts("q[k='v']/k", xml), vec!["k:v"]);
        assert_eq!(texts("q[k]", xml).len(), 1);
        assert_eq!(texts("p[@type][1]", xml), vec!["p:1"]);
    }

    #[test]
    fn test_positions_count_per_parent() {
        let xml = "<r><a><v>1</v><v>2</v><v>3</v></a><b><v>4</v><v>5</v></b><c><v>6</v></c></r>";
        assert_eq!(texts("*/v[2]", xml), vec!["v:2", "v:5"]);
        assert_eq!(texts("*/v[last()]", xml), vec!["v:3", "v:5", "v:6"]);
        assert_eq!(texts(".//v[1]", xml), vec!["v:1", "v:4", "v:6"]);
        assert!(texts("*/v[4]", xml).is_empty());
    }

    #[test]
    fn test_attribute_and_parent_steps() {
        let xml = r#"<item id="7"><p code="x"/><p code="y"/></item>"#;
        assert_eq!(texts("p/@code", xml), vec!["@x", "@y"]);
        assert_eq!(texts("@id", xml), vec!["@7"]);
        assert_eq!(texts("p/..", xml), vec!["item:"]);
        assert!(texts("..", xml).is_empty());
    }

    #[test]
    fn test_namespaced_steps() {
        let xml = r#"<item xmlns="urn:x" xmlns:o="urn:o"><price>1</price><o:price>2</o:price></item>"#;
        assert!(texts("price", xml).is_empty());
        assert_eq!(texts("{urn:x}price", xml), vec!["price:1"]);
        assert_eq!(texts("{*}price", xml), vec!["price:1", "price:2"]);
        assert_eq!(texts("o:price", xml), vec!["price:2"]);
        assert_eq!(texts("*", xml).len(), 2);
    }

    #[test]
    fn test_compile_errors() {
        for expr in ["a[", "/a", "@a/b", "a[@]", "{urn:x"] {
            let err = LocationPath::compile(expr).unwrap_err();
            assert!(err.is_configuration(), "{}", expr);
        }
    }

    #[test]
    fn test_parent_pattern_single_step_matches_any_depth() {
        let pattern = ParentPattern::compile("item").unwrap();
        assert!(pattern.matches(&names(&["catalog", "item"]), &[]));
        assert!(pattern.matches(&names(&["a", "b", "item"]), &[]));
        assert!(!pattern.matches(&names(&["item", "price"]), &[]));
    }

    #[test]
    fn test_parent_pattern_paths() {
        let relative = ParentPattern::compile("catalog/item").unwrap();
        assert!(relative.matches(&names(&["root", "catalog", "item"]), &[]));
        assert!(!relative.matches(&names(&["catalog", "x", "item"]), &[]));

        let anchored = ParentPattern::compile("/catalog/item").unwrap();
        assert!(anchored.matches(&names(&["catalog", "item"]), &[]));
        assert!(!anchored.matches(&names(&["root", "catalog", "item"]), &[]));

        let gap = ParentPattern::compile("catalog//item").unwrap();
        assert!(gap.matches(&names(&["catalog", "x", "y", "item"]), &[]));
    }

    #[test]
    fn test_parent_pattern_attribute_predicate() {
        let pattern = ParentPattern::compile("item[@kind='book']").unwrap();
        let book = vec![Attribute {
            name: QualifiedName::local("kind"),
            value: "book".to_string(),
        }];
        assert!(pattern.matches(&names(&["item"]), &book));
        assert!(!pattern.matches(&names(&["item"]), &[]));

        assert!(ParentPattern::compile("item[1]").is_err());
        assert!(ParentPattern::compile("a[@x]/item").is_err());
        assert!(ParentPattern::compile("item/@id").is_err());
    }

    #[test]
    fn test_parent_pattern_namespace() {
        let pattern = ParentPattern::compile("{urn:x}item").unwrap();
        let open = vec![QualifiedName::namespaced("urn:x", "item")];
        assert!(pattern.matches(&open, &[]));
        assert!(!pattern.matches(&names(&["item"]), &[]));
    }
}
