// Index/id based reordering of keyed lists.
//
// Order only matters for display and export. Every function returns
// `None` for an unknown id and `Some(moved)` otherwise; all boundary moves
// (first up, last down, onto itself) are `Some(false)`.

use shared::models::{BlendProduct, Concept};
use uuid::Uuid;

pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for Concept {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for BlendProduct {
    fn key(&self) -> Uuid {
        self.id
    }
}

pub fn position<T: Keyed>(items: &[T], id: Uuid) -> Option<usize> {
    items.iter().position(|item| item.key() == id)
}

/// Removes the item and reinserts it at `target_index` (clamped to the last slot).
pub fn move_to_index<T: Keyed>(items: &mut Vec<T>, id: Uuid, target_index: usize) -> Option<bool> {
    let from = position(items, id)?;
    let target = target_index.min(items.len() - 1);
    if from == target {
        return Some(false);
    }
    let item = items.remove(from);
    items.insert(target, item);
    Some(true)
}

pub fn move_up<T: Keyed>(items: &mut [T], id: Uuid) -> Option<bool> {
    let index = position(items, id)?;
    if index == 0 {
        return Some(false);
    }
    items.swap(index - 1, index);
    Some(true)
}

pub fn move_down<T: Keyed>(items: &mut [T], id: Uuid) -> Option<bool> {
    let index = position(items, id)?;
    if index + 1 >= items.len() {
        return Some(false);
    }
    items.swap(index, index + 1);
    Some(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(names: &[&str]) -> Vec<Concept> {
        names.iter().map(|name| Concept::new(*name)).collect()
    }

    fn names(items: &[Concept]) -> Vec<&str> {
        items.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_move_to_index_forward_and_back() {
        let mut items = named(&["a", "b", "c", "d"]);
        let a = items[0].id;
        assert_eq!(move_to_index(&mut items, a, 2), Some(true));
        assert_eq!(names(&items), vec!["b", "c", "a", "d"]);
        assert_eq!(move_to_index(&mut items, a, 0), Some(true));
        assert_eq!(names(&items), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_move_to_index_clamps_past_end() {
        let mut items = named(&["a", "b", "c"]);
        let a = items[0].id;
        assert_eq!(move_to_index(&mut items, a, 99), Some(true));
        assert_eq!(names(&items), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_drop_onto_self_is_noop() {
        let mut items = named(&["a", "b", "c"]);
        let b = items[1].id;
        assert_eq!(move_to_index(&mut items, b, 1), Some(false));
        assert_eq!(names(&items), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_drop_onto_other_takes_its_index() {
        let mut items = named(&["a", "b", "c", "d"]);
        let d = items[3].id;
        let target = position(&items, items[1].id).unwrap();
        assert_eq!(move_to_index(&mut items, d, target), Some(true));
        assert_eq!(names(&items), vec!["a", "d", "b", "c"]);
    }

    #[test]
    fn test_boundary_moves_are_noops() {
        let mut items = named(&["a", "b", "c"]);
        let (first, last) = (items[0].id, items[2].id);
        assert_eq!(move_up(&mut items, first), Some(false));
        assert_eq!(move_down(&mut items, last), Some(false));
        assert_eq!(names(&items), vec!["a", "b", "c"]);

        assert_eq!(move_down(&mut items, first), Some(true));
        assert_eq!(move_up(&mut items, last), Some(true));
        assert_eq!(names(&items), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_unknown_id_is_reported() {
        let mut items = named(&["a", "b"]);
        let stranger = Uuid::new_v4();
        assert_eq!(move_up(&mut items, stranger), None);
        assert_eq!(move_to_index(&mut items, stranger, 0), None);
        assert_eq!(position(&items, stranger), None);
        assert_eq!(names(&items), vec!["a", "b"]);
    }
}
