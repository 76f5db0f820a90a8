//! The computation tree (spec §4.3): a persistent, AVL-balanced tree of
//! parse-function invocations. Mirrors `core_text`'s rope join exactly —
//! same rotation shape, same "rebuild the spine, allocate fresh nodes"
//! discipline — but nodes are `Rc`-shared rather than uniquely owned, since
//! an incremental reparse keeps large swaths of the previous tree alive
//! alongside the new one (spec §5).

use crate::token::ComputedToken;
use core_events::Token;
use std::rc::Rc;

enum Node<S> {
    Leaf(LeafData<S>),
    Inner(InnerData<S>),
}

struct LeafData<S> {
    consumed_len: u64,
    read_len: u64,
    start_state: S,
    end_state: S,
    tokens: Vec<ComputedToken>,
}

struct InnerData<S> {
    left: Computation<S>,
    right: Computation<S>,
    height: u32,
    consumed_len: u64,
    read_len: u64,
    start_state: S,
    end_state: S,
}

/// A reference-counted handle onto a (sub)tree. Cloning is O(1) and is how
/// unedited subtrees get reused across a reparse.
pub struct Computation<S> {
    node: Rc<Node<S>>,
}

impl<S> Clone for Computation<S> {
    fn clone(&self) -> Self {
        Computation { node: Rc::clone(&self.node) }
    }
}

impl<S: Clone> Computation<S> {
    pub fn leaf(consumed_len: u64, read_len: u64, start_state: S, end_state: S, tokens: Vec<ComputedToken>) -> Self {
        Computation {
            node: Rc::new(Node::Leaf(LeafData {
                consumed_len,
                read_len: read_len.max(consumed_len),
                start_state,
                end_state,
                tokens,
            })),
        }
    }

    pub fn consumed_len(&self) -> u64 {
        match &*self.node {
            Node::Leaf(l) => l.consumed_len,
            Node::Inner(i) => i.consumed_len,
        }
    }

    pub fn read_len(&self) -> u64 {
        match &*self.node {
            Node::Leaf(l) => l.read_len,
            Node::Inner(i) => i.read_len,
        }
    }

    pub fn tree_height(&self) -> u32 {
        match &*self.node {
            Node::Leaf(_) => 0,
            Node::Inner(i) => i.height,
        }
    }

    pub fn start_state(&self) -> &S {
        match &*self.node {
            Node::Leaf(l) => &l.start_state,
            Node::Inner(i) => &i.start_state,
        }
    }

    pub fn end_state(&self) -> &S {
        match &*self.node {
            Node::Leaf(l) => &l.end_state,
            Node::Inner(i) => &i.end_state,
        }
    }

    pub fn left(&self) -> Option<&Computation<S>> {
        match &*self.node {
            Node::Inner(i) => Some(&i.left),
            Node::Leaf(_) => None,
        }
    }

    pub fn right(&self) -> Option<&Computation<S>> {
        match &*self.node {
            Node::Inner(i) => Some(&i.right),
            Node::Leaf(_) => None,
        }
    }
}

fn build_inner<S: Clone>(left: Computation<S>, right: Computation<S>) -> Computation<S> {
    let consumed_len = left.consumed_len() + right.consumed_len();
    let read_len = left.read_len().max(left.consumed_len() + right.read_len());
    let height = 1 + left.tree_height().max(right.tree_height());
    let start_state = left.start_state().clone();
    let end_state = right.end_state().clone();
    Computation {
        node: Rc::new(Node::Inner(InnerData {
            left,
            right,
            height,
            consumed_len,
            read_len,
            start_state,
            end_state,
        })),
    }
}

/// Join two subtrees, rotating if their heights differ by more than one.
pub fn join<S: Clone>(left: Computation<S>, right: Computation<S>) -> Computation<S> {
    let hl = left.tree_height();
    let hr = right.tree_height();
    if hl > hr + 1 {
        rotate_right_heavy(left, right)
    } else if hr > hl + 1 {
        rotate_left_heavy(left, right)
    } else {
        build_inner(left, right)
    }
}

fn clone_inner<S: Clone>(c: &Computation<S>) -> InnerData<S> {
    match &*c.node {
        Node::Inner(i) => InnerData {
            left: i.left.clone(),
            right: i.right.clone(),
            height: i.height,
            consumed_len: i.consumed_len,
            read_len: i.read_len,
            start_state: i.start_state.clone(),
            end_state: i.end_state.clone(),
        },
        Node::Leaf(_) => unreachable!("AVL height invariant guarantees an internal node here"),
    }
}

fn rotate_right_heavy<S: Clone>(left: Computation<S>, right: Computation<S>) -> Computation<S> {
    let li = clone_inner(&left);
    if li.left.tree_height() >= li.right.tree_height() {
        let new_right = join(li.right, right);
        join(li.left, new_right)
    } else {
        let lri = clone_inner(&li.right);
        let new_left = join(li.left, lri.left);
        let new_right = join(lri.right, right);
        join(new_left, new_right)
    }
}

fn rotate_left_heavy<S: Clone>(left: Computation<S>, right: Computation<S>) -> Computation<S> {
    let ri = clone_inner(&right);
    if ri.right.tree_height() >= ri.left.tree_height() {
        let new_left = join(left, ri.left);
        join(new_left, ri.right)
    } else {
        let rli = clone_inner(&ri.left);
        let new_left = join(left, rli.left);
        let new_right = join(rli.right, ri.right);
        join(new_left, new_right)
    }
}

/// Bulk-join already-ordered leaves layer by layer — cheaper than folding
/// sequential `join` calls because the result is balanced by construction
/// (used by `parse_all`, mirroring the rope's `from_reader` chunking).
pub fn build_balanced<S: Clone>(leaves: &[Computation<S>]) -> Option<Computation<S>> {
    if leaves.is_empty() {
        return None;
    }
    Some(build_balanced_slice(leaves))
}

fn build_balanced_slice<S: Clone>(nodes: &[Computation<S>]) -> Computation<S> {
    if nodes.len() == 1 {
        return nodes[0].clone();
    }
    let mid = nodes.len() / 2;
    let left = build_balanced_slice(&nodes[..mid]);
    let right = build_balanced_slice(&nodes[mid..]);
    build_inner(left, right)
}

/// Pruned in-order traversal: descend into a child only if its
/// consumed-range overlaps `[lo, hi)`. Returns tokens in ascending order.
pub fn tokens_intersecting_range<S>(root: &Computation<S>, lo: u64, hi: u64) -> Vec<Token> {
    let mut out = Vec::new();
    collect_tokens(root, 0, lo, hi, &mut out);
    out
}

/// Adapts a computation tree to the [`core_events::SyntaxTokenQuery`] seam
/// bracket-match locators read through (spec §6).
pub struct ComputationTokenQuery<'a, S> {
    root: &'a Computation<S>,
}

impl<'a, S> ComputationTokenQuery<'a, S> {
    pub fn new(root: &'a Computation<S>) -> Self {
        Self { root }
    }
}

impl<S> core_events::SyntaxTokenQuery for ComputationTokenQuery<'_, S> {
    fn token_at_position(&self, pos: u64) -> Token {
        tokens_intersecting_range(self.root, pos, pos + 1)
            .into_iter()
            .next()
            .unwrap_or_else(Token::none)
    }
}

fn collect_tokens<S>(node: &Computation<S>, base: u64, lo: u64, hi: u64, out: &mut Vec<Token>) {
    if base >= hi || base + node.consumed_len() <= lo {
        return;
    }
    match &*node.node {
        Node::Leaf(l) => {
            for t in &l.tokens {
                let start = base + t.offset;
                let end = start + t.length;
                if start < hi && end > lo {
                    out.push(Token {
                        start_char: start,
                        end_char: end,
                        role: t.role,
                    });
                }
            }
        }
        Node::Inner(i) => {
            collect_tokens(&i.left, base, lo, hi, out);
            collect_tokens(&i.right, base + i.left.consumed_len(), lo, hi, out);
        }
    }
}

/// Largest sub-computation starting exactly at `target` (in the tree's own
/// coordinate space) whose start-state matches and whose read-range stays
/// within `safe_until` — used by incremental reparse to find reusable
/// subtrees (spec §4.3 step 2).
pub fn find_reusable<S: Clone + PartialEq>(
    node: &Computation<S>,
    node_base: u64,
    target: u64,
    state: &S,
    safe_until: u64,
) -> Option<Computation<S>> {
    if node_base < target {
        let left = node.left()?;
        let right = node.right()?;
        let right_base = node_base + left.consumed_len();
        return if target < right_base {
            find_reusable(left, node_base, target, state, safe_until)
        } else {
            find_reusable(right, right_base, target, state, safe_until)
        };
    }
    if node_base > target {
        return None;
    }
    if node.start_state() == state && node_base + node.read_len() <= safe_until {
        return Some(node.clone());
    }
    find_reusable(node.left()?, node_base, target, state, safe_until)
}
