/// Move the element at `source` to `dest` in the resulting sequence, keeping
/// the relative order of everything else. `dest` is clamped to the last slot.
///
/// Returns `false` without touching `items` when the drop was cancelled
/// (`dest == None`) or `source` is out of range.
pub fn move_item<T>(items: &mut Vec<T>, source: usize, dest: Option<usize>) -> bool {
    let Some(dest) = dest else {
        return false;
    };
    if source >= items.len() {
        return false;
    }
    let dest = dest.min(items.len() - 1);
    if dest == source {
        return true;
    }
    let moved = items.remove(source);
    items.insert(dest, moved);
    true
}

/// Where an index ends up after `move_item(_, source, Some(dest))` on a list of `len`.
pub fn remap_index(index: usize, source: usize, dest: usize, len: usize) -> usize {
    if len == 0 {
        return index;
    }
    let dest = dest.min(len - 1);
    if index == source {
        dest
    } else if source < index && index <= dest {
        index - 1
    } else if dest <= index && index < source {
        index + 1
    } else {
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strs(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn moves_down_and_up() {
        let mut v = strs(&["a", "b", "c", "d"]);
        assert!(move_item(&mut v, 0, Some(2)));
        assert_eq!(v, strs(&["b", "c", "a", "d"]));
        assert!(move_item(&mut v, 3, Some(0)));
        assert_eq!(v, strs(&["d", "b", "c", "a"]));
    }

    #[test]
    fn cancelled_drop_leaves_list_untouched() {
        let mut v = strs(&["a", "b", "c"]);
        let before = v.clone();
        assert!(!move_item(&mut v, 1, None));
        assert_eq!(v, before);
    }

    #[test]
    fn destination_is_clamped() {
        let mut v = strs(&["a", "b", "c"]);
        assert!(move_item(&mut v, 0, Some(99)));
        assert_eq!(v, strs(&["b", "c", "a"]));
    }

    #[test]
    fn out_of_range_source_is_ignored() {
        let mut v = strs(&["a", "b"]);
        assert!(!move_item(&mut v, 5, Some(0)));
        assert_eq!(v, strs(&["a", "b"]));
    }

    #[test]
    fn every_move_preserves_entries_and_order_of_the_rest() {
        let base = strs(&["a", "b", "c", "d", "e"]);
        for src in 0..base.len() {
            for dst in 0..base.len() {
                let mut v = base.clone();
                move_item(&mut v, src, Some(dst));
                assert_eq!(v[dst], base[src]);
                let mut sorted = v.clone();
                sorted.sort();
                assert_eq!(sorted, base);
                let rest_before: Vec<_> = base.iter().filter(|s| **s != base[src]).collect();
                let rest_after: Vec<_> = v.iter().filter(|s| **s != base[src]).collect();
                assert_eq!(rest_before, rest_after);
                for i in 0..base.len() {
                    assert_eq!(v[remap_index(i, src, dst, base.len())], base[i]);
                }
            }
        }
    }
}
