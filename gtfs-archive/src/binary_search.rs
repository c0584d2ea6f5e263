//! Search in a sequence sorted by a key, where a key can span a run of consecutive elements

use std::cmp::Ordering;

/// Position of the first element whose key equals `target`, `None` if no element has that key.
///
/// `records` must be sorted by `key_of`. Halves the range until any element of the run is found,
/// then walks back to the start of the run.
pub fn find_first_occurrence<T, K, F>(records: &[T], key_of: F, target: &K) -> Option<usize>
where
    K: Ord + ?Sized,
    F: Fn(&T) -> &K,
{
    let mut lo = 0;
    let mut hi = records.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        match key_of(&records[mid]).cmp(target) {
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
            Ordering::Equal => {
                let mut first = mid;
                while first > 0 && key_of(&records[first - 1]) == target {
                    first -= 1;
                }
                return Some(first);
            }
        }
    }
    None
}
