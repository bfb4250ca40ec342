//! Style sheets
//!
//! A compiled style sheet is a selector tree plus its index. Sheets can be
//! merged, with the merged-in rules ordered after the existing ones.

use crate::element::SelectorElement;
use crate::index::StyleSheetIndex;
use crate::node::StyleSheetTree;
use crate::parser::{compile_declarations, parse_declaration_block, parse_rules, parse_selector, Declaration};
use crate::properties::{PropertyDictionary, PropertySource};
use crate::CssError;
use std::rc::Rc;

/// Compiled style sheet
#[derive(Debug, Clone)]
pub struct StyleSheet {
    tree: StyleSheetTree,
    index: StyleSheetIndex,
    /// Added to the specificity of rules merged in after this sheet's own
    specificity_offset: i32,
    source_url: String,
}

impl Default for StyleSheet {
    fn default() -> Self {
        StyleSheetBuilder::new("").build()
    }
}

impl StyleSheet {
    /// Parse and compile CSS text
    ///
    /// Rules with an unsupported selector are skipped with a warning, the
    /// same way a browser drops a rule it cannot parse.
    pub fn parse(css: &str, source_url: &str) -> Result<Self, CssError> {
        let rules = parse_rules(css)?;
        let mut builder = StyleSheetBuilder::new(source_url);
        for rule in &rules {
            if let Err(err) = builder.add_rule(&rule.selectors, &rule.declarations, rule.line) {
                tracing::warn!(source = %format!("{source_url}:{}", rule.line), "{err}");
            }
        }
        let sheet = builder.build();
        tracing::debug!(
            url = source_url,
            rules = sheet.specificity_offset,
            nodes = sheet.tree.len(),
            "Compiled style sheet"
        );
        Ok(sheet)
    }

    pub fn tree(&self) -> &StyleSheetTree {
        &self.tree
    }

    pub fn index(&self) -> &StyleSheetIndex {
        &self.index
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn specificity_offset(&self) -> i32 {
        self.specificity_offset
    }

    /// Splice `other` into this sheet; its rules win ties against ours
    pub fn merge(&mut self, other: &StyleSheet) {
        let root = self.tree.root();
        self.tree.merge_hierarchy(root, &other.tree, other.tree.root(), self.specificity_offset);
        self.specificity_offset += other.specificity_offset;
        self.finalize();
    }

    /// New sheet with `other` merged in, leaving `self` untouched
    pub fn combined_with(&self, other: &StyleSheet) -> StyleSheet {
        let mut combined = StyleSheet {
            tree: self.tree.deep_copy(),
            index: StyleSheetIndex::default(),
            specificity_offset: self.specificity_offset,
            source_url: self.source_url.clone(),
        };
        combined.merge(other);
        combined
    }

    /// Merged properties of every rule that applies to `element`
    pub fn element_definition<E: SelectorElement>(&self, element: E) -> PropertyDictionary {
        let mut definition = PropertyDictionary::new();
        for handle in self.index.candidates(element) {
            if self.tree.is_applicable(handle, element) {
                definition.merge(self.tree[handle].properties(), 0);
            }
        }
        definition
    }

    /// Whether any rule uses a structural selector
    pub fn is_structurally_volatile(&self) -> bool {
        self.tree.is_structurally_volatile(self.tree.root())
    }

    fn finalize(&mut self) {
        let root = self.tree.root();
        self.tree.set_structurally_volatile_recursive(root, false);
        self.index = StyleSheetIndex::build(&self.tree);
    }
}

/// Compiles rules into a [`StyleSheet`]
///
/// ```ignore
/// let sheet = StyleSheetBuilder::new("mem://ui")
///     .rule("div .panel", "filter: blur(4px)")?
///     .build();
/// ```
#[derive(Debug)]
pub struct StyleSheetBuilder {
    tree: StyleSheetTree,
    rule_count: i32,
    source_url: String,
}

impl StyleSheetBuilder {
    pub fn new(source_url: &str) -> Self {
        Self { tree: StyleSheetTree::new(), rule_count: 0, source_url: source_url.to_string() }
    }

    /// Add a rule from selector text and a `name: value; ...` block
    pub fn rule(mut self, selectors: &str, declarations: &str) -> Result<Self, CssError> {
        let line = self.rule_count as u32 + 1;
        self.add_rule(selectors, &parse_declaration_block(declarations), line)?;
        Ok(self)
    }

    /// Add a rule; every selector in the list must be valid
    pub fn add_rule(&mut self, selectors: &str, declarations: &[Declaration], line: u32) -> Result<(), CssError> {
        let chains = selectors.split(',').map(parse_selector).collect::<Result<Vec<_>, _>>()?;

        self.rule_count += 1;
        let source = Rc::new(PropertySource::new(&self.source_url, line, selectors.trim()));
        let properties = compile_declarations(declarations, Some(&source));

        for chain in chains {
            let mut node = self.tree.root();
            for fragment in chain {
                node = self.tree.get_or_create_child(node, fragment);
            }
            self.tree.import_properties(node, &properties, self.rule_count);
        }
        Ok(())
    }

    pub fn build(self) -> StyleSheet {
        let mut sheet = StyleSheet {
            tree: self.tree,
            index: StyleSheetIndex::default(),
            specificity_offset: self.rule_count,
            source_url: self.source_url,
        };
        sheet.finalize();
        sheet
    }
}
