use std::collections::HashMap;
use std::hash::Hash;

/// Groups a flat joined row stream by primary key.
///
/// The first row seen for a key creates its group (in key-encounter order);
/// every row, including the first, appends one related record to its group,
/// so related order follows row order.
pub fn group_rows<Row, Key, Group>(
    rows: Vec<Row>,
    key_of: impl Fn(&Row) -> Key,
    new_group: impl Fn(&Row) -> Group,
    push_related: impl Fn(&mut Group, Row),
) -> Vec<Group>
where
    Key: Eq + Hash,
{
    let mut slots: HashMap<Key, usize> = HashMap::new();
    let mut groups: Vec<Group> = Vec::new();

    for row in rows {
        let slot = *slots.entry(key_of(&row)).or_insert_with(|| {
            groups.push(new_group(&row));
            groups.len() - 1
        });
        push_related(&mut groups[slot], row);
    }

    groups
}
