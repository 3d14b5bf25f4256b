#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Maps `items` in order, on the rayon pool when `parallel` is set and the
/// `rayon` feature is enabled.
pub(crate) fn map_ordered<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    #[cfg(feature = "rayon")]
    if parallel {
        return items.par_iter().map(f).collect();
    }

    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    items.iter().map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_preserved_either_way() {
        let items: Vec<u32> = (0..100).collect();
        let seq = map_ordered(&items, false, |x| x * 2);
        let par = map_ordered(&items, true, |x| x * 2);
        assert_eq!(seq, par);
        assert_eq!(seq[7], 14);
    }
}
