use hashbrown::HashMap;
use types::Cell;

/// A mapping from binding name to the cell bound to it. Keys absent from
/// a row are semantically unset, not null — [`Cell`] never carries a null
/// variant (§3 of the data model).
pub type Row = HashMap<String, Cell>;
