//! Highlight precedence for teaching-mode frames.
//!
//! A `STEP_UPDATE` lists several index sets (`compare`, `swap`, `heap`,
//! `pivot`, `sorted`).  One index may appear in more than one set, but each
//! element is drawn in exactly one colour.  The winner is fixed:
//!
//! ```text
//! swap > compare > heap > pivot > sorted > normal
//! ```

use crate::protocol::messages::HighlightSets;

/// Display class of one element in a frame.
///
/// The derived `Ord` follows declaration order, so the variant with the
/// highest precedence compares greatest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HighlightClass {
    Normal,
    Sorted,
    Pivot,
    Heap,
    Compare,
    Swap,
}

impl HighlightClass {
    /// Short lowercase label, used by text renderers.
    pub fn label(self) -> &'static str {
        match self {
            HighlightClass::Normal => "normal",
            HighlightClass::Sorted => "sorted",
            HighlightClass::Pivot => "pivot",
            HighlightClass::Heap => "heap",
            HighlightClass::Compare => "compare",
            HighlightClass::Swap => "swap",
        }
    }
}

/// Assigns exactly one class to each of `len` elements.
///
/// Indices outside `0..len` are ignored.
///
/// # Examples
///
/// ```rust
/// use sortviz_core::{classify, HighlightClass, HighlightSets};
///
/// let sets = HighlightSets { swap: vec![2], compare: vec![2, 5], sorted: vec![0, 1], ..Default::default() };
/// let classes = classify(6, &sets);
/// assert_eq!(classes[2], HighlightClass::Swap);
/// assert_eq!(classes[5], HighlightClass::Compare);
/// assert_eq!(classes[0], HighlightClass::Sorted);
/// assert_eq!(classes[3], HighlightClass::Normal);
/// ```
pub fn classify(len: usize, sets: &HighlightSets) -> Vec<HighlightClass> {
    let mut classes = vec![HighlightClass::Normal; len];

    let layers = [
        (&sets.sorted, HighlightClass::Sorted),
        (&sets.pivot, HighlightClass::Pivot),
        (&sets.heap, HighlightClass::Heap),
        (&sets.compare, HighlightClass::Compare),
        (&sets.swap, HighlightClass::Swap),
    ];

    for (indices, class) in layers {
        for &i in indices {
            if let Some(slot) = classes.get_mut(i) {
                *slot = (*slot).max(class);
            }
        }
    }

    classes
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use HighlightClass::*;

    #[test]
    fn test_precedence_example_from_a_quick_sort_frame() {
        // Arrange
        let sets = HighlightSets {
            swap: vec![2],
            compare: vec![2, 5],
            sorted: vec![0, 1],
            ..Default::default()
        };

        // Act
        let classes = classify(6, &sets);

        // Assert
        assert_eq!(classes, vec![Sorted, Sorted, Swap, Normal, Normal, Compare]);
    }

    fn mark(sets: &mut HighlightSets, class: HighlightClass, index: usize) {
        match class {
            Sorted => sets.sorted.push(index),
            Pivot => sets.pivot.push(index),
            Heap => sets.heap.push(index),
            Compare => sets.compare.push(index),
            Swap => sets.swap.push(index),
            Normal => {}
        }
    }

    #[test]
    fn test_every_pairwise_overlap_resolves_to_higher_class() {
        let order = [Sorted, Pivot, Heap, Compare, Swap];
        for (pos, &lo) in order.iter().enumerate() {
            for &hi in &order[pos + 1..] {
                let mut sets = HighlightSets::default();
                mark(&mut sets, lo, 0);
                mark(&mut sets, hi, 0);
                assert_eq!(classify(1, &sets), vec![hi], "{hi:?} must beat {lo:?}");
            }
        }
    }

    #[test]
    fn test_out_of_range_indices_are_ignored() {
        let sets = HighlightSets {
            swap: vec![10],
            compare: vec![1],
            ..Default::default()
        };
        assert_eq!(classify(2, &sets), vec![Normal, Compare]);
    }

    #[test]
    fn test_empty_frame_yields_no_classes() {
        let sets = HighlightSets {
            sorted: vec![0],
            ..Default::default()
        };
        assert!(classify(0, &sets).is_empty());
    }

    #[test]
    fn test_label_is_lowercase_name() {
        assert_eq!(Swap.label(), "swap");
        assert_eq!(Normal.label(), "normal");
    }
}
