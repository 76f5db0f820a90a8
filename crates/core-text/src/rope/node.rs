//! The balanced tree of leaf groups. Internal nodes are rebuilt bottom-up on
//! every edit and rebalanced with the standard AVL join: descend into the
//! taller side, rebuild the spine, rotate if the result is still unbalanced
//! by more than one level (spec §4.1, invariant (c)).

use super::leaf::LeafData;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Node {
    Leaf(LeafData),
    Internal(Box<Internal>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Internal {
    pub(crate) left: Node,
    pub(crate) right: Node,
    pub(crate) height: u32,
    pub(crate) byte_len: u64,
    pub(crate) char_len: u64,
    pub(crate) line_breaks: u64,
}

impl Node {
    pub(crate) fn empty() -> Self {
        Node::Leaf(LeafData::empty())
    }

    pub(crate) fn byte_len(&self) -> u64 {
        match self {
            Node::Leaf(l) => l.byte_len(),
            Node::Internal(i) => i.byte_len,
        }
    }

    pub(crate) fn char_len(&self) -> u64 {
        match self {
            Node::Leaf(l) => l.char_len as u64,
            Node::Internal(i) => i.char_len,
        }
    }

    pub(crate) fn line_breaks(&self) -> u64 {
        match self {
            Node::Leaf(l) => l.line_breaks as u64,
            Node::Internal(i) => i.line_breaks,
        }
    }

    pub(crate) fn height(&self) -> u32 {
        match self {
            Node::Leaf(_) => 0,
            Node::Internal(i) => i.height,
        }
    }

    pub(crate) fn byte_at(&self, idx: u64) -> u8 {
        match self {
            Node::Leaf(l) => l.bytes.as_bytes()[idx as usize],
            Node::Internal(i) => {
                let lb = i.left.byte_len();
                if idx < lb {
                    i.left.byte_at(idx)
                } else {
                    i.right.byte_at(idx - lb)
                }
            }
        }
    }

    /// Build a balanced tree from already-chunked leaves (used by
    /// `from_reader` and, analogously, by the parser's bulk join).
    pub(crate) fn from_leaves(leaves: Vec<LeafData>) -> Node {
        if leaves.is_empty() {
            return Node::empty();
        }
        let nodes: Vec<Node> = leaves.into_iter().map(Node::Leaf).collect();
        Self::build_balanced(&nodes)
    }

    fn build_balanced(nodes: &[Node]) -> Node {
        if nodes.len() == 1 {
            return nodes[0].clone();
        }
        let mid = nodes.len() / 2;
        let left = Self::build_balanced(&nodes[..mid]);
        let right = Self::build_balanced(&nodes[mid..]);
        build_internal(left, right)
    }
}

fn build_internal(left: Node, right: Node) -> Node {
    let byte_len = left.byte_len() + right.byte_len();
    let char_len = left.char_len() + right.char_len();
    let line_breaks = left.line_breaks() + right.line_breaks();
    let height = 1 + left.height().max(right.height());
    Node::Internal(Box::new(Internal {
        left,
        right,
        height,
        byte_len,
        char_len,
        line_breaks,
    }))
}

/// Join two subtrees, rotating if their heights differ by more than one
/// (spec §4.1 AVL balance invariant).
pub(crate) fn make_internal(left: Node, right: Node) -> Node {
    let hl = left.height();
    let hr = right.height();
    if hl > hr + 1 {
        rotate_right_heavy(left, right)
    } else if hr > hl + 1 {
        rotate_left_heavy(left, right)
    } else {
        build_internal(left, right)
    }
}

fn into_internal(node: Node) -> Internal {
    match node {
        Node::Internal(b) => *b,
        Node::Leaf(_) => unreachable!("AVL height invariant guarantees an internal node here"),
    }
}

/// `left` is taller than `right` by more than one level.
fn rotate_right_heavy(left: Node, right: Node) -> Node {
    let li = into_internal(left);
    if li.left.height() >= li.right.height() {
        let new_right = make_internal(li.right, right);
        make_internal(li.left, new_right)
    } else {
        let lri = into_internal(li.right);
        let new_left = make_internal(li.left, lri.left);
        let new_right = make_internal(lri.right, right);
        make_internal(new_left, new_right)
    }
}

/// `right` is taller than `left` by more than one level.
fn rotate_left_heavy(left: Node, right: Node) -> Node {
    let ri = into_internal(right);
    if ri.right.height() >= ri.left.height() {
        let new_left = make_internal(left, ri.left);
        make_internal(new_left, ri.right)
    } else {
        let rli = into_internal(ri.left);
        let new_left = make_internal(left, rli.left);
        let new_right = make_internal(rli.right, ri.right);
        make_internal(new_left, new_right)
    }
}

pub(crate) fn insert(node: Node, char_idx: u64, ch: char, leaf_budget: usize) -> Node {
    match node {
        Node::Leaf(mut leaf) => {
            let byte_off = leaf.char_to_byte(char_idx);
            let mut buf = [0u8; 4];
            let w = ch.encode_utf8(&mut buf).len();
            leaf.bytes
                .insert_str(byte_off, std::str::from_utf8(&buf[..w]).unwrap());
            leaf.char_len += 1;
            if ch == '\n' {
                leaf.line_breaks += 1;
            }
            if leaf.bytes.len() > leaf_budget {
                let (l, r) = leaf.split();
                build_internal(Node::Leaf(l), Node::Leaf(r))
            } else {
                Node::Leaf(leaf)
            }
        }
        Node::Internal(internal) => {
            let Internal { left, right, .. } = *internal;
            let left_chars = left.char_len();
            if char_idx < left_chars {
                let new_left = insert(left, char_idx, ch, leaf_budget);
                make_internal(new_left, right)
            } else {
                let new_right = insert(right, char_idx - left_chars, ch, leaf_budget);
                make_internal(left, new_right)
            }
        }
    }
}

fn collapse(left: Node, right: Node) -> Node {
    let left_empty = matches!(&left, Node::Leaf(l) if l.is_empty());
    let right_empty = matches!(&right, Node::Leaf(r) if r.is_empty());
    if left_empty {
        right
    } else if right_empty {
        left
    } else {
        make_internal(left, right)
    }
}

pub(crate) fn delete(node: Node, char_idx: u64) -> (Node, Option<char>) {
    match node {
        Node::Leaf(leaf) => {
            if char_idx >= leaf.char_len as u64 {
                (Node::Leaf(leaf), None)
            } else {
                let (byte_off, ch, w) = leaf.char_at(char_idx);
                let mut bytes = leaf.bytes;
                bytes.replace_range(byte_off..byte_off + w, "");
                let char_len = leaf.char_len - 1;
                let line_breaks = leaf.line_breaks - u32::from(ch == '\n');
                (
                    Node::Leaf(LeafData {
                        bytes,
                        char_len,
                        line_breaks,
                    }),
                    Some(ch),
                )
            }
        }
        Node::Internal(internal) => {
            let Internal { left, right, .. } = *internal;
            let left_chars = left.char_len();
            if char_idx < left_chars {
                let (new_left, removed) = delete(left, char_idx);
                (collapse(new_left, right), removed)
            } else {
                let (new_right, removed) = delete(right, char_idx - left_chars);
                (collapse(left, new_right), removed)
            }
        }
    }
}

/// Absolute char index of the `n`-th (0-indexed) `\n` in the subtree rooted
/// at `node`, whose first char is at `base`. Used to resolve line positions
/// in O(log N) via the per-node line-break aggregate.
pub(crate) fn nth_newline_abs(node: &Node, n: u64, base: u64) -> Option<u64> {
    match node {
        Node::Leaf(l) => {
            let mut seen = 0u64;
            for (i, c) in l.bytes.chars().enumerate() {
                if c == '\n' {
                    if seen == n {
                        return Some(base + i as u64);
                    }
                    seen += 1;
                }
            }
            None
        }
        Node::Internal(i) => {
            let left_breaks = i.left.line_breaks();
            if n < left_breaks {
                nth_newline_abs(&i.left, n, base)
            } else {
                nth_newline_abs(&i.right, n - left_breaks, base + i.left.char_len())
            }
        }
    }
}

/// Byte offset of the `char_idx`-th character (clamped to `byte_len()` when
/// `char_idx` is past the end). Used to seed a byte-granularity [`super::Cursor`]
/// from a char position.
pub(crate) fn char_to_byte(node: &Node, char_idx: u64) -> u64 {
    match node {
        Node::Leaf(l) => l.char_to_byte(char_idx) as u64,
        Node::Internal(i) => {
            let left_chars = i.left.char_len();
            if char_idx < left_chars {
                char_to_byte(&i.left, char_idx)
            } else {
                i.left.byte_len() + char_to_byte(&i.right, char_idx - left_chars)
            }
        }
    }
}

/// Count of `\n` characters in `[0, char_pos)`.
pub(crate) fn newlines_before(node: &Node, char_pos: u64) -> u64 {
    match node {
        Node::Leaf(l) => l
            .bytes
            .chars()
            .take(char_pos as usize)
            .filter(|&c| c == '\n')
            .count() as u64,
        Node::Internal(i) => {
            let left_chars = i.left.char_len();
            if char_pos <= left_chars {
                newlines_before(&i.left, char_pos)
            } else {
                i.left.line_breaks() + newlines_before(&i.right, char_pos - left_chars)
            }
        }
    }
}

pub(crate) fn assert_invariants(node: &Node) -> (u64, u64, u64, u32) {
    match node {
        Node::Leaf(l) => (l.byte_len(), l.char_len as u64, l.line_breaks as u64, 0),
        Node::Internal(i) => {
            let (lb, lc, ll, lh) = assert_invariants(&i.left);
            let (rb, rc, rl, rh) = assert_invariants(&i.right);
            assert_eq!(lb + rb, i.byte_len, "byte_len aggregate mismatch");
            assert_eq!(lc + rc, i.char_len, "char_len aggregate mismatch");
            assert_eq!(ll + rl, i.line_breaks, "line_breaks aggregate mismatch");
            let height = 1 + lh.max(rh);
            assert_eq!(height, i.height, "height aggregate mismatch");
            let diff = lh as i64 - rh as i64;
            assert!(diff.abs() <= 1, "AVL balance violated: {lh} vs {rh}");
            (i.byte_len, i.char_len, i.line_breaks, height)
        }
    }
}
