use std::collections::HashSet;

/// Assigns a position to every field that lacks one.
///
/// Explicit orders are reserved up front and kept as-is. Remaining fields, in
/// list order, take the lowest value not yet reserved; each assignment is
/// reserved immediately so no two fields ever share a position.
pub fn assign_orders(orders: &[Option<usize>]) -> Vec<usize> {
    let mut reserved: HashSet<usize> = orders.iter().flatten().copied().collect();
    let mut cursor = 0;

    orders
        .iter()
        .map(|order| match order {
            Some(explicit) => *explicit,
            None => {
                while reserved.contains(&cursor) {
                    cursor += 1;
                }
                reserved.insert(cursor);
                cursor
            }
        })
        .collect()
}
