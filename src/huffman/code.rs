use std::collections::HashMap;

use crate::error::HuffError;

use super::tree::{HuffmanTree, Node};

/// Bidirectional byte <-> code mapping. A code is a sequence of 0/1 bit
/// values; the set of codes is prefix-free, so greedy matching during decode
/// is unambiguous.
pub struct CodeTable {
    forward: HashMap<u8, Vec<u8>>,
    reverse: HashMap<Vec<u8>, u8>,
    max_code_len: usize,
}

impl CodeTable {
    pub fn from_tree(tree: &HuffmanTree) -> Self {
        let mut table = Self::empty();

        match tree.node(tree.root()) {
            // A one-symbol input collapses the tree to a bare leaf. That
            // symbol still needs a real one-bit code: an empty code string
            // can never be matched back.
            Node::Leaf(byte) => table.insert(byte, vec![0]),
            Node::Internal { .. } => table.walk(tree, tree.root(), &mut Vec::new()),
        }

        table
    }

    /// Rebuilds the table straight from serialized (byte, code) records. The
    /// decode path only ever sees these records, never the tree.
    pub fn from_records(records: Vec<(u8, Vec<u8>)>) -> Result<Self, HuffError> {
        let mut table = Self::empty();

        for (byte, code) in records {
            if code.is_empty() {
                return Err(HuffError::Corrupt(format!(
                    "empty code for byte 0x{byte:02X}"
                )));
            }
            if table.forward.contains_key(&byte) {
                return Err(HuffError::Corrupt(format!(
                    "byte 0x{byte:02X} listed twice"
                )));
            }
            if table.reverse.contains_key(&code) {
                return Err(HuffError::Corrupt("duplicate code".into()));
            }
            table.insert(byte, code);
        }

        // A code that prefixes another would make greedy matching ambiguous.
        for code in table.reverse.keys() {
            for len in 1..code.len() {
                if table.reverse.contains_key(&code[..len]) {
                    return Err(HuffError::Corrupt("code table is not prefix-free".into()));
                }
            }
        }

        Ok(table)
    }

    fn empty() -> Self {
        Self {
            forward: HashMap::new(),
            reverse: HashMap::new(),
            max_code_len: 0,
        }
    }

    fn walk(&mut self, tree: &HuffmanTree, index: usize, prefix: &mut Vec<u8>) {
        match tree.node(index) {
            Node::Leaf(byte) => self.insert(byte, prefix.clone()),
            Node::Internal { left, right } => {
                prefix.push(0);
                self.walk(tree, left, prefix);
                prefix.pop();

                prefix.push(1);
                self.walk(tree, right, prefix);
                prefix.pop();
            }
        }
    }

    fn insert(&mut self, byte: u8, code: Vec<u8>) {
        self.max_code_len = self.max_code_len.max(code.len());
        self.reverse.insert(code.clone(), byte);
        self.forward.insert(byte, code);
    }

    pub fn code_for(&self, byte: u8) -> Option<&[u8]> {
        self.forward.get(&byte).map(Vec::as_slice)
    }

    pub fn byte_for(&self, code: &[u8]) -> Option<u8> {
        self.reverse.get(code).copied()
    }

    pub fn max_code_len(&self) -> usize {
        self.max_code_len
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// (byte, code) pairs in ascending byte order, ready for serialization.
    pub fn records(&self) -> Vec<(u8, Vec<u8>)> {
        let mut records: Vec<_> = self
            .forward
            .iter()
            .map(|(&byte, code)| (byte, code.clone()))
            .collect();
        records.sort_by_key(|&(byte, _)| byte);
        records
    }
}
