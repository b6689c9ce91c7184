// Price-ordered AVL index
// Every node holds one distinct price and a bucket with all entries sharing it

use std::cmp::Ordering;

type Link<T> = Option<Box<PriceNode<T>>>;

#[derive(Debug)]
struct PriceNode<T> {
    price: f64,
    bucket: Vec<T>,
    left: Link<T>,
    right: Link<T>,
    height: i32,
}

impl<T> PriceNode<T> {
    fn leaf(price: f64, entry: T) -> Box<Self> {
        Box::new(Self {
            price,
            bucket: vec![entry],
            left: None,
            right: None,
            height: 1,
        })
    }

    fn update_height(&mut self) {
        self.height = 1 + height(&self.left).max(height(&self.right));
    }

    fn balance_factor(&self) -> i32 {
        height(&self.left) - height(&self.right)
    }
}

fn height<T>(link: &Link<T>) -> i32 {
    link.as_ref().map_or(0, |node| node.height)
}

fn balance_of<T>(link: &Link<T>) -> i32 {
    link.as_ref().map_or(0, |node| node.balance_factor())
}

// -0.0 and 0.0 must land in the same bucket
fn normalize(price: f64) -> f64 {
    if price == 0.0 {
        0.0
    } else {
        price
    }
}

fn rotate_right<T>(mut node: Box<PriceNode<T>>) -> Box<PriceNode<T>> {
    let Some(mut pivot) = node.left.take() else {
        return node;
    };
    node.left = pivot.right.take();
    node.update_height();
    pivot.right = Some(node);
    pivot.update_height();
    pivot
}

fn rotate_left<T>(mut node: Box<PriceNode<T>>) -> Box<PriceNode<T>> {
    let Some(mut pivot) = node.right.take() else {
        return node;
    };
    node.right = pivot.left.take();
    node.update_height();
    pivot.left = Some(node);
    pivot.update_height();
    pivot
}

fn rebalance<T>(mut node: Box<PriceNode<T>>) -> Box<PriceNode<T>> {
    node.update_height();
    let balance = node.balance_factor();

    if balance > 1 {
        // left-right case: straighten the left child first
        if balance_of(&node.left) < 0 {
            node.left = node.left.take().map(rotate_left);
        }
        return rotate_right(node);
    }

    if balance < -1 {
        // right-left case
        if balance_of(&node.right) > 0 {
            node.right = node.right.take().map(rotate_right);
        }
        return rotate_left(node);
    }

    node
}

fn insert_at<T>(link: Link<T>, price: f64, entry: T, created: &mut bool) -> Box<PriceNode<T>> {
    let Some(mut node) = link else {
        *created = true;
        return PriceNode::leaf(price, entry);
    };

    match price.total_cmp(&node.price) {
        Ordering::Less => node.left = Some(insert_at(node.left.take(), price, entry, created)),
        Ordering::Greater => {
            node.right = Some(insert_at(node.right.take(), price, entry, created))
        }
        Ordering::Equal => {
            node.bucket.push(entry);
            return node;
        }
    }

    rebalance(node)
}

// Visits only the nodes whose subtree can still hold a price inside [min, max]
fn walk_pruned<'a, T>(
    link: &'a Link<T>,
    min: f64,
    max: f64,
    visit: &mut dyn FnMut(&'a PriceNode<T>),
) {
    let Some(node) = link.as_deref() else {
        return;
    };

    visit(node);

    if min.total_cmp(&node.price) == Ordering::Less {
        walk_pruned(&node.left, min, max, visit);
    }
    if max.total_cmp(&node.price) == Ordering::Greater {
        walk_pruned(&node.right, min, max, visit);
    }
}

// Height-balanced search tree keyed by price.
// Equal prices share a node; `len` counts entries while `node_count` counts
// distinct prices.
#[derive(Debug)]
pub struct PriceIndex<T> {
    root: Link<T>,
    len: usize,
    node_count: usize,
}

impl<T> Default for PriceIndex<T> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
            node_count: 0,
        }
    }
}

impl<T> PriceIndex<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, price: f64, entry: T) {
        let mut created = false;
        self.root = Some(insert_at(
            self.root.take(),
            normalize(price),
            entry,
            &mut created,
        ));
        self.len += 1;
        if created {
            self.node_count += 1;
        }
    }

    // All entries priced within `[min, max]`, in no particular order.
    // An inverted or NaN range yields nothing.
    pub fn range(&self, min: f64, max: f64) -> Vec<&T> {
        let mut results = Vec::new();
        if min.is_nan() || max.is_nan() || min > max {
            return results;
        }

        let (min, max) = (normalize(min), normalize(max));
        walk_pruned(&self.root, min, max, &mut |node| {
            if node.price.total_cmp(&min) != Ordering::Less
                && node.price.total_cmp(&max) != Ordering::Greater
            {
                results.extend(node.bucket.iter());
            }
        });
        results
    }

    // Exact-price bucket lookup.
    pub fn get(&self, price: f64) -> Option<&[T]> {
        let price = normalize(price);
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match price.total_cmp(&node.price) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.bucket),
            };
        }
        None
    }

    pub fn min_price(&self) -> Option<f64> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(node.price)
    }

    pub fn max_price(&self) -> Option<f64> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(node.price)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn height(&self) -> usize {
        height(&self.root) as usize
    }

    // In-order traversal yielding each distinct price with its bucket.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }
}

pub struct Iter<'a, T> {
    stack: Vec<&'a PriceNode<T>>,
}

impl<'a, T> Iter<'a, T> {
    fn push_left(&mut self, mut node: Option<&'a PriceNode<T>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (f64, &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some((node.price, node.bucket.as_slice()))
    }
}
