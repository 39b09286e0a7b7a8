//! Error surface for the tree core.
//!
//! Mirrors the teacher's `tree::errors` module: a single `error_chain!`
//! invocation producing an `Error`/`ErrorKind` pair, with `ensure!`/`bail!`
//! used at validation boundaries rather than ad-hoc `panic!`s.

error_chain::error_chain! {
    errors {
        /// A set operation was attempted on trees with different comparators.
        ComparatorMismatch {
            description("trees do not share a comparator")
            display("set operation requires both trees to share a comparator")
        }
        /// A structural-reuse set operation (union/intersect/subtract) was
        /// attempted on trees with different `maxNodeSize`.
        BranchingFactorMismatch(a: usize, b: usize) {
            description("trees do not share a branching factor")
            display("set operation requires matching maxNodeSize, got {} and {}", a, b)
        }
        /// A key produced a non-total comparison (e.g. an un-normalized NaN)
        /// where a total order is required.
        IllegalKey {
            description("key does not admit a total order under this comparator")
            display("key does not admit a total order under this comparator")
        }
        /// Bulk-load input was not strictly ascending.
        BulkLoadOrder {
            description("bulk load input is not strictly ascending")
            display("bulk load input is not strictly ascending")
        }
        /// A mutation was detected inside an edit-range callback.
        IllegalEdit {
            description("tree was mutated from within an edit callback")
            display("tree was mutated from within an edit callback")
        }
        /// A mutator was invoked on a frozen tree.
        FrozenMutation {
            description("mutation attempted on a frozen tree")
            display("mutation attempted on a frozen tree")
        }
        /// `checkValid` found a broken invariant, or an assertion that should
        /// be impossible fired. Indicates a bug in this crate.
        InternalInvariant(detail: String) {
            description("internal invariant violated")
            display("internal invariant violated: {}", detail)
        }
    }
}
