use ndarray::{ArrayBase, Data, Dimension, IntoDimension, Ix};

/// Asserts that two word vectors (or containers of floats) are approximately equal.
///
/// The containers are compared element by element in logical order, any mismatch in shape or
/// value panics with the index of the mismatch.
///
/// ```
/// use ndarray::arr1;
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(f32, 0.1 + 0.2, 0.3);
/// assert_approx_eq!(f32, &[0.5, 1.25], arr1(&[0.5, 1.25]));
/// assert_approx_eq!(f32, vec![[1., 2.]], &[[1., 2.001]], epsilon = 1e-2);
/// ```
///
/// The number of `ulps` defaults to `2` and the `epsilon` to `0`. Two NaN values are considered
/// equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($t:ty, $left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, ulps = $ulps:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = $ulps)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = $epsilon, ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr, ulps = $ulps:expr $(,)?) => {{
        let (epsilon, ulps) = ($epsilon, $ulps);
        let (left, right) = ($left, $right);
        let mut left = $crate::ApproxEqIter::flat_iter(&left, Vec::new());
        let mut right = $crate::ApproxEqIter::flat_iter(&right, Vec::new());
        loop {
            match (left.next(), right.next()) {
                (Some((lidx, lv)), Some((ridx, rv))) => {
                    std::assert_eq!(lidx, ridx, "shape mismatch");
                    if !(lv.is_nan() && rv.is_nan()) {
                        std::assert!(
                            $crate::approx_eq!($t, lv, rv, ulps = ulps, epsilon = epsilon),
                            "approximate equality failed at index {:?}: {:?} != {:?}",
                            lidx,
                            lv,
                            rv,
                        );
                    }
                }
                (Some((idx, _)), None) => std::panic!("left is longer from index {:?}", idx),
                (None, Some((idx, _))) => std::panic!("right is longer from index {:?}", idx),
                (None, None) => break,
            }
        }
    }};
}

/// Flattens floats and containers of floats for the [`assert_approx_eq!`] macro.
///
/// Implemented on references, yields every leaf value together with its index.
pub trait ApproxEqIter<'a>: Copy {
    /// The leaf value.
    type Leaf;

    /// Iterates over the leaf values in logical order, their indices are prefixed by `prefix`.
    fn flat_iter(self, prefix: Vec<Ix>) -> Box<dyn Iterator<Item = (Vec<Ix>, Self::Leaf)> + 'a>;
}

impl<'a> ApproxEqIter<'a> for &'a f32 {
    type Leaf = f32;

    fn flat_iter(self, prefix: Vec<Ix>) -> Box<dyn Iterator<Item = (Vec<Ix>, f32)> + 'a> {
        Box::new(std::iter::once((prefix, *self)))
    }
}

impl<'a, T> ApproxEqIter<'a> for &'a &'a T
where
    &'a T: ApproxEqIter<'a>,
    T: 'a + ?Sized,
{
    type Leaf = <&'a T as ApproxEqIter<'a>>::Leaf;

    fn flat_iter(self, prefix: Vec<Ix>) -> Box<dyn Iterator<Item = (Vec<Ix>, Self::Leaf)> + 'a> {
        (*self).flat_iter(prefix)
    }
}

impl<'a, T: 'a> ApproxEqIter<'a> for &'a [T]
where
    &'a T: ApproxEqIter<'a>,
{
    type Leaf = <&'a T as ApproxEqIter<'a>>::Leaf;

    fn flat_iter(self, prefix: Vec<Ix>) -> Box<dyn Iterator<Item = (Vec<Ix>, Self::Leaf)> + 'a> {
        Box::new(self.iter().enumerate().flat_map(move |(idx, leaf)| {
            let mut prefix = prefix.clone();
            prefix.push(idx);
            leaf.flat_iter(prefix)
        }))
    }
}

impl<'a, T: 'a, const N: usize> ApproxEqIter<'a> for &'a [T; N]
where
    &'a T: ApproxEqIter<'a>,
{
    type Leaf = <&'a T as ApproxEqIter<'a>>::Leaf;

    fn flat_iter(self, prefix: Vec<Ix>) -> Box<dyn Iterator<Item = (Vec<Ix>, Self::Leaf)> + 'a> {
        self.as_ref().flat_iter(prefix)
    }
}

impl<'a, T: 'a> ApproxEqIter<'a> for &'a Vec<T>
where
    &'a T: ApproxEqIter<'a>,
{
    type Leaf = <&'a T as ApproxEqIter<'a>>::Leaf;

    fn flat_iter(self, prefix: Vec<Ix>) -> Box<dyn Iterator<Item = (Vec<Ix>, Self::Leaf)> + 'a> {
        self.as_slice().flat_iter(prefix)
    }
}

impl<'a, S, D> ApproxEqIter<'a> for &'a ArrayBase<S, D>
where
    S: Data,
    S::Elem: Copy,
    &'a S::Elem: ApproxEqIter<'a>,
    D: Dimension,
{
    type Leaf = S::Elem;

    fn flat_iter(self, prefix: Vec<Ix>) -> Box<dyn Iterator<Item = (Vec<Ix>, S::Elem)> + 'a> {
        Box::new(self.indexed_iter().map(move |(idx, leaf)| {
            let mut prefix = prefix.clone();
            prefix.extend(idx.into_dimension().as_array_view().iter());
            (prefix, *leaf)
        }))
    }
}
