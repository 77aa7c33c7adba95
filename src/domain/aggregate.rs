//! Single-pass `max`/`min` reducers tolerant of missing values.
//!
//! A value is *valid* when it is present and comparable with itself, which
//! rules out `None`, [`Datum::Null`] and NaN. The first valid value seeds the
//! candidate; the rest of the slice is scanned with strict `>` (max) or `<`
//! (min), ignoring invalid values. No valid value yields `None`.

use std::cmp::Ordering;

use crate::domain::Datum;

/// Values that may be missing and may not be totally ordered.
pub trait Comparable {
    type Key: PartialOrd;

    /// The comparable key, or `None` for a missing value.
    fn key(&self) -> Option<Self::Key>;
}

macro_rules! comparable_copy {
    ($($t:ty),*) => {
        $(impl Comparable for $t {
            type Key = $t;

            fn key(&self) -> Option<$t> {
                Some(*self)
            }
        })*
    };
}

comparable_copy!(f64, f32, i8, i16, i32, i64, u8, u16, u32, u64, usize, isize);

impl Comparable for String {
    type Key = String;

    fn key(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl<'a> Comparable for &'a str {
    type Key = &'a str;

    fn key(&self) -> Option<&'a str> {
        Some(*self)
    }
}

impl<T: Comparable> Comparable for Option<T> {
    type Key = T::Key;

    fn key(&self) -> Option<T::Key> {
        self.as_ref().and_then(Comparable::key)
    }
}

impl Comparable for Datum {
    type Key = Datum;

    fn key(&self) -> Option<Datum> {
        if self.is_null() {
            None
        } else {
            Some(self.clone())
        }
    }
}

fn is_valid<K: PartialOrd>(key: &K) -> bool {
    key.partial_cmp(key).is_some()
}

/// Core scan: keeps the first valid key and replaces it whenever a later
/// valid key compares as `wanted` against it.
fn reduce<T, K, F>(values: &[T], mut accessor: F, wanted: Ordering) -> Option<(usize, K)>
where
    K: PartialOrd,
    F: FnMut(&T, usize, &[T]) -> Option<K>,
{
    let mut best: Option<(usize, K)> = None;
    for (i, value) in values.iter().enumerate() {
        let Some(key) = accessor(value, i, values) else {
            continue;
        };
        if !is_valid(&key) {
            continue;
        }
        match &best {
            None => best = Some((i, key)),
            Some((_, current)) if key.partial_cmp(current) == Some(wanted) => {
                best = Some((i, key));
            }
            Some(_) => {}
        }
    }
    best
}

/// Largest valid value.
///
/// ```rust
/// use rsviz::domain::max;
///
/// assert_eq!(max(&[Some(3.0), None, Some(7.0), Some(f64::NAN), Some(1.0)]), Some(7.0));
/// assert_eq!(max::<f64>(&[]), None);
/// ```
pub fn max<T: Comparable>(values: &[T]) -> Option<T::Key> {
    reduce(values, |v, _, _| v.key(), Ordering::Greater).map(|(_, k)| k)
}

/// Smallest valid value.
pub fn min<T: Comparable>(values: &[T]) -> Option<T::Key> {
    reduce(values, |v, _, _| v.key(), Ordering::Less).map(|(_, k)| k)
}

/// Largest valid accessor result; the accessor receives value, index and
/// the whole slice and returns `None` for a missing value.
pub fn max_with<T, K, F>(values: &[T], accessor: F) -> Option<K>
where
    K: PartialOrd,
    F: FnMut(&T, usize, &[T]) -> Option<K>,
{
    reduce(values, accessor, Ordering::Greater).map(|(_, k)| k)
}

/// Smallest valid accessor result.
pub fn min_with<T, K, F>(values: &[T], accessor: F) -> Option<K>
where
    K: PartialOrd,
    F: FnMut(&T, usize, &[T]) -> Option<K>,
{
    reduce(values, accessor, Ordering::Less).map(|(_, k)| k)
}

/// Element whose accessor result is largest.
pub fn max_element_with<T, K, F>(values: &[T], accessor: F) -> Option<&T>
where
    K: PartialOrd,
    F: FnMut(&T, usize, &[T]) -> Option<K>,
{
    reduce(values, accessor, Ordering::Greater).map(|(i, _)| &values[i])
}

/// Element whose accessor result is smallest.
pub fn min_element_with<T, K, F>(values: &[T], accessor: F) -> Option<&T>
where
    K: PartialOrd,
    F: FnMut(&T, usize, &[T]) -> Option<K>,
{
    reduce(values, accessor, Ordering::Less).map(|(i, _)| &values[i])
}

/// `(min, max)` of the valid values.
pub fn extent<T: Comparable>(values: &[T]) -> Option<(T::Key, T::Key)> {
    Some((min(values)?, max(values)?))
}
