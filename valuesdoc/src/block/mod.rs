use indexmap::IndexMap;

/// A document region anchored at a top-level key.
///
/// A block runs from `start_line` up to the line before the next zero-indent
/// key (or the end of the document). Blocks carrying a `chart_ref` are the
/// only ones that can produce completions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// The zero-indent key that anchors the block.
    pub top_key: String,
    /// Chart reference from an `# @<ref>` annotation, if any.
    pub chart_ref: Option<String>,
    /// 1-based line where the block opens: the annotation line when annotated,
    /// otherwise the key line.
    pub start_line: usize,
    /// 1-based line of the top key itself.
    pub key_line: usize,
    /// Commit sequence number within one scan.
    pub ordinal: usize,
}

impl Block {
    pub fn is_annotated(&self) -> bool {
        self.chart_ref.is_some()
    }
}

/// Scanned blocks keyed by top key, in first-commit order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blocks {
    by_key: IndexMap<String, Block>,
}

impl Blocks {
    pub fn new() -> Self {
        Blocks::default()
    }

    /// Commit a block. A block with the same top key is replaced (last wins).
    pub fn commit(&mut self, block: Block) -> Option<Block> {
        self.by_key.insert(block.top_key.clone(), block)
    }

    pub fn get(&self, top_key: &str) -> Option<&Block> {
        self.by_key.get(top_key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Block> {
        self.by_key.values()
    }

    pub fn annotated(&self) -> impl Iterator<Item = &Block> {
        self.iter().filter(|block| block.is_annotated())
    }
}

impl<'a> IntoIterator for &'a Blocks {
    type Item = &'a Block;
    type IntoIter = indexmap::map::Values<'a, String, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.by_key.values()
    }
}

/// Find the block enclosing `line`: the one with the greatest `start_line`
/// that is still `<= line`. Equal start lines resolve to the later commit.
pub fn locate(blocks: &Blocks, line: usize) -> Option<&Block> {
    blocks
        .iter()
        .filter(|block| block.start_line <= line)
        .max_by_key(|block| (block.start_line, block.ordinal))
}
