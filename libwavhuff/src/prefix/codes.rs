use super::tree::{build_tree, PrefixNode};
use crate::core::{FrequencyTable, Sample};
use std::collections::{BTreeMap, HashMap};

/// Symbol -> bit-string table and its inverse
///
/// Codes are strings over {'0', '1'}. A fresh table is produced per call;
/// nothing is cached between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeTable {
    codes: BTreeMap<Sample, String>,
    symbols: HashMap<String, Sample>,
}

impl CodeTable {
    fn insert(&mut self, symbol: Sample, code: String) {
        self.symbols.insert(code.clone(), symbol);
        self.codes.insert(symbol, code);
    }

    /// Code assigned to `symbol`
    pub fn code(&self, symbol: Sample) -> Option<&str> {
        self.codes.get(&symbol).map(String::as_str)
    }

    /// Symbol assigned to `code`
    pub fn symbol(&self, code: &str) -> Option<Sample> {
        self.symbols.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// (symbol, code) pairs in ascending symbol order
    pub fn iter(&self) -> impl Iterator<Item = (Sample, &str)> + '_ {
        self.codes.iter().map(|(&s, c)| (s, c.as_str()))
    }

    pub fn symbols(&self) -> impl Iterator<Item = Sample> + '_ {
        self.codes.keys().copied()
    }

    /// Longest code length in bits
    pub fn max_code_length(&self) -> usize {
        self.codes.values().map(String::len).max().unwrap_or(0)
    }

    /// Check that no code is a prefix of another
    pub fn is_prefix_free(&self) -> bool {
        let mut sorted: Vec<&str> = self.codes.values().map(String::as_str).collect();
        sorted.sort_unstable();
        // a prefix always sorts directly before some code it prefixes
        sorted.windows(2).all(|w| !w[1].starts_with(w[0]))
    }

    /// Average bits per symbol weighted by `table`
    pub fn average_code_length(&self, table: &FrequencyTable) -> f64 {
        if table.total() == 0 {
            return 0.0;
        }
        let bits: usize = table
            .iter()
            .map(|(symbol, count)| self.code(symbol).map_or(0, str::len) * count)
            .sum();
        bits as f64 / table.total() as f64
    }
}

/// Derive codes from a tree: left appends '0', right appends '1'
///
/// A root that is itself a leaf gets the code "0".
pub fn derive_codes(root: &PrefixNode) -> CodeTable {
    let mut table = CodeTable::default();

    if let PrefixNode::Leaf { symbol, .. } = root {
        table.insert(*symbol, "0".to_string());
        return table;
    }

    let mut stack: Vec<(&PrefixNode, String)> = vec![(root, String::new())];
    while let Some((node, path)) = stack.pop() {
        match node {
            PrefixNode::Leaf { symbol, .. } => table.insert(*symbol, path),
            PrefixNode::Internal { left, right, .. } => {
                let mut right_path = path.clone();
                right_path.push('1');
                let mut left_path = path;
                left_path.push('0');
                stack.push((right, right_path));
                stack.push((left, left_path));
            }
        }
    }

    table
}

/// Build the tree for `table` and derive its codes in one go
pub fn build_code_table(table: &FrequencyTable) -> CodeTable {
    build_tree(table)
        .map(|root| derive_codes(&root))
        .unwrap_or_default()
}
